//! Queue Metrics - metrics-emitting decorator for message queue drivers
//!
//! [`MetricsDriver`] wraps any [`Driver`] and reports operation counts,
//! per-message latency and driver errors to a [`MetricsSink`], without
//! changing what the wrapped driver returns.
//!
//! ```no_run
//! # async fn run<D: queue_metrics::Driver>(queue: D) {
//! use std::sync::Arc;
//! use queue_metrics::{Driver, MetricsDriver, TracingSink};
//!
//! let driver = MetricsDriver::builder(queue, Arc::new(TracingSink))
//!     .namespace("Billing/Workers")
//!     .build()
//!     .unwrap();
//!
//! if let Ok(Some(envelope)) = driver.dequeue("invoices").await {
//!     let _ = driver.ack("invoices", &envelope).await;
//! }
//! # }
//! ```

#![warn(missing_docs)]

// Public modules
pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod utils;

#[cfg(test)]
mod testing;

/// Crate version from `Cargo.toml`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for public API
pub use config::{DimensionStrategy, MetricsConfig, DEFAULT_NAMESPACE};
pub use driver::{Driver, Envelope, Message, MetricsDriver, MetricsDriverBuilder, TrackedEnvelope};
pub use error::{DriverError, MetricsError, Result, SinkError};
pub use metrics::{EmfSink, MemorySink, Metric, MetricDatum, MetricsSink, TracingSink, Unit};
pub use utils::{Logger, NullLogger, TracingLogger};
