use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dimension name to dimension value, keys unique and ordered
pub type Dimensions = BTreeMap<String, String>;

/// Longest dimension value the backend accepts. Values are cut to this many
/// characters when a metric is rendered.
pub const MAX_DIMENSION_VALUE_LENGTH: usize = 1024;

/// Unit a metric value is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Number of occurrences
    Count,
    /// Elapsed time
    Milliseconds,
}

impl Unit {
    /// Unit name as the backend spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Count => "Count",
            Unit::Milliseconds => "Milliseconds",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named, typed, dimensioned measurement.
///
/// Metrics are built fresh for every queue event and rendered into
/// [`MetricDatum`] records for submission. Construction never truncates;
/// dimension limits are applied by [`Metric::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    name: String,
    value: f64,
    unit: Unit,
    dimensions: Dimensions,
}

impl Metric {
    /// Metric with an explicit unit and starting dimensions
    pub fn new(name: impl Into<String>, value: f64, unit: Unit, dimensions: Dimensions) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
            dimensions,
        }
    }

    /// A counter metric with no dimensions of its own
    pub fn count(name: impl Into<String>, value: u64) -> Self {
        Self::new(name, value as f64, Unit::Count, Dimensions::new())
    }

    /// A duration metric in milliseconds with no dimensions of its own
    pub fn millis(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, Unit::Milliseconds, Dimensions::new())
    }

    /// Attach a metric-specific dimension. These win over ambient dimensions
    /// with the same name at render time.
    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }

    /// Metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Measured value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Unit of the value
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The metric's own dimensions, before any ambient ones are merged
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Render into a backend record, merging `ambient` under this metric's
    /// own dimensions.
    pub fn render(&self, ambient: &Dimensions) -> MetricDatum {
        let mut merged = ambient.clone();
        merged.extend(
            self.dimensions
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        MetricDatum {
            metric_name: self.name.clone(),
            value: self.value,
            unit: self.unit,
            dimensions: merged
                .into_iter()
                .map(|(name, value)| Dimension {
                    name,
                    value: limit_length(value),
                })
                .collect(),
        }
    }

    /// Render into a backend record carrying no dimensions at all, not even
    /// the metric's own.
    pub fn render_undimensioned(&self) -> MetricDatum {
        MetricDatum {
            metric_name: self.name.clone(),
            value: self.value,
            unit: self.unit,
            dimensions: Vec::new(),
        }
    }
}

/// A single record in the backend's submission shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDatum {
    /// Metric name
    pub metric_name: String,
    /// Measured value
    pub value: f64,
    /// Unit of the value
    pub unit: Unit,
    /// Dimensions in name order. Omitted from the wire form when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,
}

impl MetricDatum {
    /// Value of the named dimension, if present
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

/// A name/value pair on a [`MetricDatum`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    /// Dimension name
    pub name: String,
    /// Dimension value, at most [`MAX_DIMENSION_VALUE_LENGTH`] characters
    pub value: String,
}

fn limit_length(mut value: String) -> String {
    if let Some((cut, _)) = value.char_indices().nth(MAX_DIMENSION_VALUE_LENGTH) {
        value.truncate(cut);
    }
    value
}

/// How an in-flight message attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    /// Acknowledged
    Success,
    /// Put back for another attempt
    Retry,
    /// Given up on
    Failure,
    /// Returned to the queue without counting as an attempt
    Release,
}

impl MessageStatus {
    /// Value of the `MessageStatus` dimension
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Success => "Success",
            MessageStatus::Retry => "Retry",
            MessageStatus::Failure => "Failure",
            MessageStatus::Release => "Release",
        }
    }

    /// Name of the counter emitted when an attempt ends this way
    pub fn metric_name(&self) -> &'static str {
        match self {
            MessageStatus::Success => names::MESSAGE_SUCCESS,
            MessageStatus::Retry => names::MESSAGE_RETRY,
            MessageStatus::Failure => names::MESSAGE_FAILURE,
            MessageStatus::Release => names::MESSAGE_RELEASE,
        }
    }
}

/// Metric and dimension names emitted by the decorator
pub mod names {
    /// Counter for a successful enqueue
    pub const MESSAGE_ENQUEUE: &str = "MessageEnqueue";
    /// Counter for a dequeue that returned a message
    pub const MESSAGE_DEQUEUE: &str = "MessageDequeue";
    /// Counter for an acknowledged message
    pub const MESSAGE_SUCCESS: &str = "MessageSuccess";
    /// Counter for a retried message
    pub const MESSAGE_RETRY: &str = "MessageRetry";
    /// Counter for a failed message
    pub const MESSAGE_FAILURE: &str = "MessageFailure";
    /// Counter for a released message
    pub const MESSAGE_RELEASE: &str = "MessageRelease";
    /// Milliseconds from dequeue to finish
    pub const MESSAGE_TIME: &str = "MessageTime";
    /// Counter for an error returned by the wrapped driver
    pub const DRIVER_ERROR: &str = "DriverError";

    /// Dimension: queue the operation ran against
    pub const QUEUE_NAME: &str = "QueueName";
    /// Dimension: name of the message involved
    pub const MESSAGE_NAME: &str = "MessageName";
    /// Dimension on `MessageTime`: how the attempt ended
    pub const MESSAGE_STATUS: &str = "MessageStatus";
    /// Dimension on `DriverError`: what kind of error it was
    pub const ERROR_KIND: &str = "ErrorKind";

    /// Message name reported when a message has none
    pub const NO_MESSAGE_NAME: &str = "__none__";
}
