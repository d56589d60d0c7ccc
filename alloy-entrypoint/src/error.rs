use std::io;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Missing value {0}")]
    MissingVal(&'static str),
    #[error("Failed to parse scrape targets")]
    Targets(
        #[from]
        #[source]
        serde_json::Error,
    ),
    #[error("Scrape target {0} is missing required field {1:?}")]
    MissingField(usize, &'static str),
    #[error("Scrape target {0} has unknown type {1:?}")]
    UnknownTargetType(usize, String),
    #[error("No scrape targets configured")]
    NoTargets,
    #[error("An IO error occurred.")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    #[error("Agent binary not found at {0}")]
    MissingBinary(String),
}
