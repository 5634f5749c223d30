//! Test doubles shared by the unit tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::driver::{Driver, Envelope, Message};
use crate::error::{DriverError, SinkError};
use crate::metrics::{MetricDatum, MetricsSink};
use crate::utils::{interpolate, Logger};

#[derive(Debug, Clone, PartialEq)]
pub struct TestMessage {
    name: String,
}

impl TestMessage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Message for TestMessage {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct TestEnvelope {
    id: u64,
    attempts: u32,
    message: TestMessage,
}

impl TestEnvelope {
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Envelope for TestEnvelope {
    type Message = TestMessage;

    fn message(&self) -> &TestMessage {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scripted failure in {operation}")]
pub struct TestDriverError {
    operation: String,
}

impl TestDriverError {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl DriverError for TestDriverError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Enqueue,
    Dequeue,
    Ack,
    Retry,
    Fail,
    Release,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Enqueue => "enqueue",
            Operation::Dequeue => "dequeue",
            Operation::Ack => "ack",
            Operation::Retry => "retry",
            Operation::Fail => "fail",
            Operation::Release => "release",
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    queues: HashMap<String, VecDeque<TestEnvelope>>,
    acked: Vec<String>,
    failed: Vec<String>,
}

/// FIFO queues in memory, with failures that can be scripted per operation
#[derive(Debug, Default)]
pub struct InMemoryDriver {
    next_id: AtomicU64,
    state: Mutex<QueueState>,
    failures: Mutex<HashSet<Operation>>,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a message on a queue without going through `enqueue`
    pub fn push(&self, queue: &str, message: TestMessage) {
        let envelope = self.envelope(message, 0);
        self.state
            .lock()
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(envelope);
    }

    /// Make the next call to `operation` fail
    pub fn fail_next(&self, operation: Operation) {
        self.failures.lock().insert(operation);
    }

    pub fn len(&self, queue: &str) -> usize {
        self.state.lock().queues.get(queue).map_or(0, VecDeque::len)
    }

    /// Names of acknowledged messages
    pub fn acked(&self) -> Vec<String> {
        self.state.lock().acked.clone()
    }

    pub fn failed(&self) -> Vec<String> {
        self.state.lock().failed.clone()
    }

    fn envelope(&self, message: TestMessage, attempts: u32) -> TestEnvelope {
        TestEnvelope {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            attempts,
            message,
        }
    }

    fn check(&self, operation: Operation) -> Result<(), TestDriverError> {
        if self.failures.lock().remove(&operation) {
            return Err(TestDriverError::new(operation.as_str()));
        }
        Ok(())
    }

    fn requeue(&self, queue: &str, envelope: TestEnvelope) {
        self.state
            .lock()
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(envelope);
    }
}

#[async_trait]
impl Driver for InMemoryDriver {
    type Message = TestMessage;
    type Envelope = TestEnvelope;
    type Error = TestDriverError;

    async fn enqueue(&self, queue: &str, message: TestMessage) -> Result<TestEnvelope, TestDriverError> {
        self.check(Operation::Enqueue)?;
        let envelope = self.envelope(message, 0);
        self.requeue(queue, envelope.clone());
        Ok(envelope)
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<TestEnvelope>, TestDriverError> {
        self.check(Operation::Dequeue)?;
        Ok(self
            .state
            .lock()
            .queues
            .get_mut(queue)
            .and_then(VecDeque::pop_front))
    }

    async fn ack(&self, _queue: &str, envelope: &TestEnvelope) -> Result<(), TestDriverError> {
        self.check(Operation::Ack)?;
        self.state.lock().acked.push(envelope.message.name.clone());
        Ok(())
    }

    async fn retry(&self, queue: &str, envelope: &TestEnvelope) -> Result<TestEnvelope, TestDriverError> {
        self.check(Operation::Retry)?;
        let retried = TestEnvelope {
            id: envelope.id,
            attempts: envelope.attempts + 1,
            message: envelope.message.clone(),
        };
        self.requeue(queue, retried.clone());
        Ok(retried)
    }

    async fn fail(&self, _queue: &str, envelope: &TestEnvelope) -> Result<(), TestDriverError> {
        self.check(Operation::Fail)?;
        self.state.lock().failed.push(envelope.message.name.clone());
        Ok(())
    }

    async fn release(&self, queue: &str, envelope: &TestEnvelope) -> Result<(), TestDriverError> {
        self.check(Operation::Release)?;
        self.requeue(queue, envelope.clone());
        Ok(())
    }
}

/// Keeps every logged error as `[error] <rendered template>`
#[derive(Debug, Default)]
pub struct CollectingLogger {
    messages: Mutex<Vec<String>>,
}

impl CollectingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }
}

impl Logger for CollectingLogger {
    fn error(&self, template: &str, context: &[(&str, &str)]) {
        self.messages
            .lock()
            .push(format!("[error] {}", interpolate(template, context)));
    }
}

/// Rejects every submission
#[derive(Debug)]
pub struct FailingSink {
    failure: Failure,
}

#[derive(Debug)]
enum Failure {
    Transport(String),
    Service(String),
}

impl FailingSink {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            failure: Failure::Transport(message.into()),
        }
    }

    pub fn service(code: impl Into<String>) -> Self {
        Self {
            failure: Failure::Service(code.into()),
        }
    }
}

#[async_trait]
impl MetricsSink for FailingSink {
    async fn submit(&self, _namespace: &str, _records: Vec<MetricDatum>) -> Result<(), SinkError> {
        Err(match &self.failure {
            Failure::Transport(message) => SinkError::Transport(message.clone()),
            Failure::Service(code) => SinkError::Service {
                code: code.clone(),
                message: "Rate exceeded".to_string(),
            },
        })
    }
}

/// Writer whose every write fails
pub struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
