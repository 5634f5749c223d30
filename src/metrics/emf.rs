//! CloudWatch Embedded Metric Format output.
//!
//! Each record becomes one JSON document on its own line. The CloudWatch
//! agent (or Lambda's log pipeline) turns those lines into metrics without an
//! API call.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::metric::MetricDatum;
use super::sink::MetricsSink;
use crate::error::SinkError;

/// Writes records as EMF documents to any writer
pub struct EmfSink<W> {
    writer: Mutex<W>,
}

impl EmfSink<std::io::Stdout> {
    /// Sink writing to standard output, where the CloudWatch agent picks it up
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> EmfSink<W> {
    /// Sink writing to `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

fn timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn document(namespace: &str, record: &MetricDatum, timestamp: u64) -> Value {
    let dimension_names: Vec<&str> = record.dimensions.iter().map(|d| d.name.as_str()).collect();

    let mut doc = Map::new();
    doc.insert(
        "_aws".to_string(),
        json!({
            "Timestamp": timestamp,
            "CloudWatchMetrics": [{
                "Namespace": namespace,
                "Dimensions": [dimension_names],
                "Metrics": [{
                    "Name": record.metric_name,
                    "Unit": record.unit,
                }],
            }],
        }),
    );
    for dimension in &record.dimensions {
        doc.insert(dimension.name.clone(), Value::String(dimension.value.clone()));
    }
    doc.insert(record.metric_name.clone(), json!(record.value));

    Value::Object(doc)
}

#[async_trait]
impl<W: Write + Send> MetricsSink for EmfSink<W> {
    async fn submit(&self, namespace: &str, records: Vec<MetricDatum>) -> Result<(), SinkError> {
        let timestamp = timestamp_millis();
        let mut buf = Vec::new();
        for record in &records {
            serde_json::to_writer(&mut buf, &document(namespace, record, timestamp))?;
            buf.push(b'\n');
        }

        // Written in one go so a failed batch leaves no partial lines behind
        let mut writer = self.writer.lock();
        writer.write_all(&buf)?;
        writer.flush()?;
        Ok(())
    }
}
