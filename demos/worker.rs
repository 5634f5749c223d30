//! A worker loop over an in-memory queue, reporting metrics through the
//! tracing sink.
//!
//! Run with `RUST_LOG=queue_metrics=debug cargo run --example worker`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use queue_metrics::{
    utils::{setup_logging, LogConfig},
    Driver, DriverError, Envelope, Message, MetricsDriver, TracingSink,
};
use tracing::info;

#[derive(Debug, Clone)]
struct Job {
    name: String,
    payload: u32,
}

impl Message for Job {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
struct JobEnvelope {
    job: Job,
    attempts: u32,
}

impl Envelope for JobEnvelope {
    type Message = Job;

    fn message(&self) -> &Job {
        &self.job
    }
}

#[derive(Debug, thiserror::Error)]
#[error("queue {0} is closed")]
struct QueueClosed(String);

impl DriverError for QueueClosed {
    fn kind(&self) -> &str {
        "QueueClosed"
    }
}

#[derive(Default)]
struct MemoryQueue {
    queues: Mutex<HashMap<String, VecDeque<JobEnvelope>>>,
}

impl MemoryQueue {
    fn push(&self, queue: &str, envelope: JobEnvelope) {
        self.queues
            .lock()
            .entry(queue.to_string())
            .or_default()
            .push_back(envelope);
    }
}

#[async_trait]
impl Driver for MemoryQueue {
    type Message = Job;
    type Envelope = JobEnvelope;
    type Error = QueueClosed;

    async fn enqueue(&self, queue: &str, job: Job) -> Result<JobEnvelope, QueueClosed> {
        if queue == "closed" {
            return Err(QueueClosed(queue.to_string()));
        }
        let envelope = JobEnvelope { job, attempts: 0 };
        self.push(queue, envelope.clone());
        Ok(envelope)
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<JobEnvelope>, QueueClosed> {
        Ok(self.queues.lock().get_mut(queue).and_then(VecDeque::pop_front))
    }

    async fn ack(&self, _queue: &str, _envelope: &JobEnvelope) -> Result<(), QueueClosed> {
        Ok(())
    }

    async fn retry(&self, queue: &str, envelope: &JobEnvelope) -> Result<JobEnvelope, QueueClosed> {
        let retried = JobEnvelope {
            job: envelope.job.clone(),
            attempts: envelope.attempts + 1,
        };
        self.push(queue, retried.clone());
        Ok(retried)
    }

    async fn fail(&self, _queue: &str, _envelope: &JobEnvelope) -> Result<(), QueueClosed> {
        Ok(())
    }

    async fn release(&self, queue: &str, envelope: &JobEnvelope) -> Result<(), QueueClosed> {
        self.push(queue, envelope.clone());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging(LogConfig {
        level: tracing::Level::INFO,
        ..Default::default()
    })
    .map_err(anyhow::Error::msg)?;

    let driver = MetricsDriver::builder(MemoryQueue::default(), Arc::new(TracingSink))
        .namespace("Demo/Queue")
        .build()?;

    for payload in 0..5 {
        driver
            .enqueue("jobs", Job { name: "Resize".to_string(), payload })
            .await?;
    }

    // Shows up as a DriverError metric with ErrorKind=QueueClosed
    if let Err(e) = driver
        .enqueue("closed", Job { name: "Resize".to_string(), payload: 0 })
        .await
    {
        info!(error = %e, "enqueue rejected");
    }

    while let Some(envelope) = driver.dequeue("jobs").await? {
        tokio::time::sleep(Duration::from_millis(20)).await;

        let job = envelope.message();
        match job.payload % 3 {
            0 => driver.ack("jobs", &envelope).await?,
            1 if envelope.attempts < 2 => {
                driver.retry("jobs", &envelope).await?;
            }
            _ => driver.fail("jobs", &envelope).await?,
        }
    }

    info!(in_flight = driver.in_flight(), "queue drained");
    Ok(())
}
