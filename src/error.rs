//! Error types

use std::error::Error as StdError;
use thiserror::Error;

/// Result alias for fallible operations owned by this crate
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors raised by this crate's own surface (configuration and wiring).
///
/// Errors from the wrapped driver never pass through this type; they are
/// returned to the caller unchanged.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A configuration value was rejected
    #[error("Configuration error for {parameter}: {message}")]
    Configuration {
        /// What is wrong with the value
        message: String,
        /// Name of the offending setting
        parameter: String,
    },
}

/// Failure submitting metric records to a [`MetricsSink`](crate::metrics::MetricsSink).
#[derive(Debug, Error)]
pub enum SinkError {
    /// The backend could not be reached
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered with an error
    #[error("service rejected request ({code}): {message}")]
    Service {
        /// Error code returned by the service
        code: String,
        /// Human readable explanation from the service
        message: String,
    },

    /// Records could not be encoded
    #[error("failed to serialize metric data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing encoded records failed
    #[error("failed to write metric data: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Low-cardinality name of this failure, used when logging it
    pub fn kind(&self) -> &'static str {
        match self {
            SinkError::Transport(_) => "Transport",
            SinkError::Service { .. } => "Service",
            SinkError::Serialization(_) => "Serialization",
            SinkError::Io(_) => "Io",
        }
    }
}

/// Error category signalled by a wrapped queue driver.
///
/// `kind` becomes the value of the `ErrorKind` dimension on `DriverError`
/// metrics, so it must be low-cardinality: a type or variant name, never the
/// rendered message.
pub trait DriverError: StdError + Send + Sync + 'static {
    /// Identifying name of this error's kind
    fn kind(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
