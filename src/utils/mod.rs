//! Logging setup and the error-reporting seam

mod logging;

pub use logging::{interpolate, setup_logging, LogConfig, Logger, NullLogger, TracingLogger};
