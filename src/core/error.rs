//! Error types for the telemetry pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Connection operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOp {
    Open,
    Send,
    Close,
}

impl fmt::Display for ConnectionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Send => "send",
            Self::Close => "close",
        };
        f.write_str(name)
    }
}

/// Pipeline error type
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Connection {operation} failed: {source}")]
    Connection {
        operation: ConnectionOp,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Compression failed: {0}")]
    Compression(#[source] std::io::Error),

    #[error("Failed to store frame at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed frame: {0}")]
    Frame(String),

    #[error("Simulation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// Expected termination of a run after a stop request
    #[error("Simulation cancelled")]
    Cancelled,
}

impl TelemetryError {
    pub fn connection(operation: ConnectionOp, source: anyhow::Error) -> Self {
        Self::Connection {
            operation,
            source: source.into(),
        }
    }

    /// True for the stop path, which callers must not report as a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
