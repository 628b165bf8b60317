use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while starting up or driving the terminal.
///
/// The simulation itself never fails; everything here comes from
/// configuration, argument parsing or terminal I/O.
#[derive(Error, Debug)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read config {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid hex color: {0} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
