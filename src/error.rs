//! Error types, one enum per layer.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the settings file. Raised at load time, before the first
/// sample is accepted.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum RecorderError {
    /// The output file could not be opened or written. The in-memory
    /// record and the counter still include the sample.
    #[error("failed to write output file {path}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize output record: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// A sample arrived after the quota was already reached.
    #[error("recorder is terminal: quota of {quota} samples already reached")]
    Terminal { quota: u64 },
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("malformed joint-state message: expected at least 2 positions, got {positions}")]
    MalformedMessage { positions: usize },

    #[error(transparent)]
    Recorder(#[from] RecorderError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("failed to encode joint-state message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("ingestion channel closed")]
    ChannelClosed,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
