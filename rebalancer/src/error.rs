//! Error types for the rebalancer.

use std::path::PathBuf;

/// All errors that can occur during rebalancer operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read request file {path}: {source}")]
    RequestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse request JSON: {0}")]
    RequestParse(#[from] serde_json::Error),

    #[error("{}: {}", .0.kind(), .0)]
    Engine(#[from] allocbook::Error),

    #[error("value prompt failed: {0}")]
    Prompt(String),

    #[error("failed to render output: {0}")]
    Output(String),
}

impl Error {
    /// Engine error kind, if this is an engine failure.
    pub fn engine_kind(&self) -> Option<allocbook::ErrorKind> {
        match self {
            Error::Engine(e) => Some(e.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
