use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use super::metric::MetricDatum;
use crate::error::SinkError;

/// Backend accepting metric records.
///
/// One call carries every record produced by a single queue event. A failed
/// call drops the whole batch; callers never retry individual records.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Submit `records` under `namespace`
    async fn submit(&self, namespace: &str, records: Vec<MetricDatum>) -> Result<(), SinkError>;
}

/// One `submit` call as seen by a [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Namespace the records were submitted under
    pub namespace: String,
    /// Records in the order they were submitted
    pub records: Vec<MetricDatum>,
}

impl Submission {
    /// Names of the submitted records, in order
    pub fn metric_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.metric_name.as_str()).collect()
    }
}

/// Keeps every submission in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    submissions: Mutex<Vec<Submission>>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submission so far, oldest first
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }

    /// All records across every submission, flattened
    pub fn records(&self) -> Vec<MetricDatum> {
        self.submissions
            .lock()
            .iter()
            .flat_map(|s| s.records.iter().cloned())
            .collect()
    }

    /// Number of `submit` calls so far
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }

    /// Forget everything submitted so far
    pub fn clear(&self) {
        self.submissions.lock().clear();
    }
}

#[async_trait]
impl MetricsSink for MemorySink {
    async fn submit(&self, namespace: &str, records: Vec<MetricDatum>) -> Result<(), SinkError> {
        self.submissions.lock().push(Submission {
            namespace: namespace.to_string(),
            records,
        });
        Ok(())
    }
}

/// Emits each record as a `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl MetricsSink for TracingSink {
    async fn submit(&self, namespace: &str, records: Vec<MetricDatum>) -> Result<(), SinkError> {
        for record in records {
            let dimensions = record
                .dimensions
                .iter()
                .map(|d| format!("{}={}", d.name, d.value))
                .collect::<Vec<_>>()
                .join(",");

            info!(
                target: "queue_metrics::sink",
                namespace,
                metric = %record.metric_name,
                value = record.value,
                unit = %record.unit,
                dimensions = %dimensions,
                "metric"
            );
        }
        Ok(())
    }
}
