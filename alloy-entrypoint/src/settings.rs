use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_SCRAPE_INTERVAL: &str = "60s";
pub const DEFAULT_SCRAPE_TIMEOUT: &str = "60s";
pub const DEFAULT_DISCOVER_ROLE: &str = "pod";

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RemoteConfig {
    /// Credentials are only usable as a pair. A username without a password
    /// (or the reverse) renders the same as no credentials at all.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum ScrapeTarget {
    Static(StaticTarget),
    Discover(DiscoverTarget),
}

/// A fixed host/port to scrape on a schedule.
#[derive(Clone, Debug)]
pub struct StaticTarget {
    pub host: String,
    pub port: u16,
    pub interval: String,
    pub timeout: String,
    pub path: Option<String>,
}

/// Delegates target selection to the agent's Kubernetes discovery.
#[derive(Clone, Debug)]
pub struct DiscoverTarget {
    pub role: String,
    pub jobs: Vec<String>,
}

// The JSON shape is a flat object for both target kinds, discriminated by an
// optional "type" key. Field presence is validated after deserializing so the
// diagnostics can name the offending entry.
#[derive(Debug, Deserialize)]
struct RawTarget {
    #[serde(rename = "type")]
    kind: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    interval: Option<String>,
    timeout: Option<String>,
    path: Option<String>,
    role: Option<String>,
    #[serde(default)]
    jobs: Vec<String>,
}

impl RawTarget {
    fn into_target(self, index: usize) -> Result<ScrapeTarget, Error> {
        match self.kind.as_deref().unwrap_or("target") {
            "target" => Ok(ScrapeTarget::Static(StaticTarget {
                host: self.host.ok_or(Error::MissingField(index, "host"))?,
                port: self.port.ok_or(Error::MissingField(index, "port"))?,
                interval: self
                    .interval
                    .unwrap_or_else(|| DEFAULT_SCRAPE_INTERVAL.to_string()),
                timeout: self
                    .timeout
                    .unwrap_or_else(|| DEFAULT_SCRAPE_TIMEOUT.to_string()),
                path: self.path,
            })),
            "discover" => Ok(ScrapeTarget::Discover(DiscoverTarget {
                role: self
                    .role
                    .unwrap_or_else(|| DEFAULT_DISCOVER_ROLE.to_string()),
                jobs: self.jobs,
            })),
            other => Err(Error::UnknownTargetType(index, other.to_string())),
        }
    }
}

/// Parses the `ALLOY_SCRAPE_TARGETS` JSON array, preserving element order.
pub fn parse_targets(raw: &str) -> Result<Vec<ScrapeTarget>, Error> {
    let entries: Vec<RawTarget> = serde_json::from_str(raw)?;
    if entries.is_empty() {
        return Err(Error::NoTargets);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_target(index))
        .collect()
}
