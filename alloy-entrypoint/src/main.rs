use std::fs;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process;

use clap::{crate_description, crate_name, crate_version, Arg, Command};

use log::info;

use alloy_entrypoint::error::Error;
use alloy_entrypoint::settings::RemoteConfig;
use alloy_entrypoint::{logging, render, settings};

const DEFAULT_BINARY_PATH: &str = "/workspace/alloy";
const DEFAULT_CONFIG_PATH: &str = "/tmp/config.alloy";

// Flags the agent is always started with: no clustering, no usage
// reporting, an HTTP listener for health checks, and scratch storage only.
const AGENT_LISTEN_ADDR: &str = "0.0.0.0:8118";
const AGENT_STORAGE_PATH: &str = "/tmp/data";

fn main() {
    logging::init();
    if let Err(e) = run() {
        logging::log_error(&e);
        let code = match e {
            Error::MissingBinary(_) => 2,
            _ => 1,
        };
        process::exit(code);
    }
}

fn run() -> Result<(), Error> {
    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(
            Arg::new("url")
                .help("Remote write endpoint the agent pushes to")
                .short('u')
                .long("url")
                .num_args(1)
                .value_name("URL")
                .env("ALLOY_REMOTE_URL"),
        )
        .arg(
            Arg::new("username")
                .help("Basic auth username for the remote endpoint")
                .long("username")
                .num_args(1)
                .value_name("USERNAME")
                .env("ALLOY_REMOTE_USERNAME"),
        )
        .arg(
            Arg::new("password")
                .help("Basic auth password for the remote endpoint")
                .long("password")
                .num_args(1)
                .value_name("PASSWORD")
                .env("ALLOY_REMOTE_PASSWORD"),
        )
        .arg(
            Arg::new("targets")
                .help("Scrape targets as a JSON array")
                .short('t')
                .long("targets")
                .num_args(1)
                .value_name("TARGETS")
                .env("ALLOY_SCRAPE_TARGETS"),
        )
        .arg(
            Arg::new("binary")
                .help("Path to the agent binary")
                .short('b')
                .long("binary")
                .num_args(1)
                .value_name("BINARY")
                .value_parser(clap::value_parser!(PathBuf))
                .env("ALLOY_BINARY_PATH")
                .default_value(DEFAULT_BINARY_PATH),
        )
        .arg(
            Arg::new("config")
                .help("Path the rendered configuration is written to")
                .short('c')
                .long("config")
                .num_args(1)
                .value_name("CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .env("ALLOY_CONFIG_PATH")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .get_matches();

    let url = matches
        .get_one::<String>("url")
        .ok_or(Error::MissingVal("ALLOY_REMOTE_URL"))?;
    let raw_targets = matches
        .get_one::<String>("targets")
        .ok_or(Error::MissingVal("ALLOY_SCRAPE_TARGETS"))?;

    let remote = RemoteConfig {
        url: url.clone(),
        username: matches.get_one::<String>("username").cloned(),
        password: matches.get_one::<String>("password").cloned(),
    };

    // Everything is validated before the config file is touched, so a bad
    // environment never leaves a partial config behind.
    let targets = settings::parse_targets(raw_targets)?;

    let config_path = matches
        .get_one::<PathBuf>("config")
        .ok_or(Error::MissingVal("ALLOY_CONFIG_PATH"))?;
    let binary_path = matches
        .get_one::<PathBuf>("binary")
        .ok_or(Error::MissingVal("ALLOY_BINARY_PATH"))?;

    if !binary_path.is_file() {
        return Err(Error::MissingBinary(binary_path.display().to_string()));
    }

    let config = render::render_config(&targets, &remote);
    fs::write(config_path, config)?;
    info!(
        "Rendered configuration for {} target(s) to {}",
        targets.len(),
        config_path.display()
    );

    exec_agent(binary_path, config_path)
}

// Replaces this process with the agent so it inherits our PID and standard
// streams. Returns only if the exec itself failed.
fn exec_agent(binary: &Path, config: &Path) -> Result<(), Error> {
    info!("Handing over to {}", binary.display());

    let err = process::Command::new(binary)
        .arg("run")
        .arg("--cluster.enabled=false")
        .arg("--disable-reporting=true")
        .arg(format!("--server.http.listen-addr={}", AGENT_LISTEN_ADDR))
        .arg(format!("--storage.path={}", AGENT_STORAGE_PATH))
        .arg(config)
        .exec();

    Err(Error::Io(err))
}
