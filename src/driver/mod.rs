//! Queue driver contract and the metrics decorator that wraps it

mod builder;
mod envelope;
mod metrics_driver;

pub use builder::MetricsDriverBuilder;
pub use envelope::TrackedEnvelope;
pub use metrics_driver::MetricsDriver;

use std::sync::Arc;

use crate::error::DriverError;

/// A queued unit of work
pub trait Message: Send + Sync + 'static {
    /// Name identifying the kind of message, e.g. `"SendInvoice"`
    fn name(&self) -> &str;
}

/// Handle for one in-flight attempt at a message
pub trait Envelope: Send + Sync {
    /// Message type carried by the envelope
    type Message: Message;

    /// The message being attempted
    fn message(&self) -> &Self::Message;
}

/// Queue backend operations.
///
/// `dequeue` reports an empty queue as `Ok(None)`, never as an error. The
/// finishing operations (`ack`, `retry`, `fail`, `release`) take an envelope
/// previously returned by `dequeue`.
#[async_trait::async_trait]
pub trait Driver: Send + Sync {
    /// Message type the queue carries
    type Message: Message;
    /// Envelope handed out by `enqueue`, `dequeue` and `retry`
    type Envelope: Envelope<Message = Self::Message>;
    /// Error returned by every operation
    type Error: DriverError;

    /// Add a message to a queue
    async fn enqueue(&self, queue: &str, message: Self::Message) -> Result<Self::Envelope, Self::Error>;

    /// Take the next message from a queue, if one is available
    async fn dequeue(&self, queue: &str) -> Result<Option<Self::Envelope>, Self::Error>;

    /// Mark the attempt as successfully processed
    async fn ack(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error>;

    /// End this attempt and put the message back for another one
    async fn retry(&self, queue: &str, envelope: &Self::Envelope) -> Result<Self::Envelope, Self::Error>;

    /// Mark the attempt as permanently failed
    async fn fail(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error>;

    /// Give the message back to the queue without counting an attempt
    async fn release(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error>;
}

#[async_trait::async_trait]
impl<D: Driver + ?Sized> Driver for Arc<D> {
    type Message = D::Message;
    type Envelope = D::Envelope;
    type Error = D::Error;

    async fn enqueue(&self, queue: &str, message: Self::Message) -> Result<Self::Envelope, Self::Error> {
        (**self).enqueue(queue, message).await
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<Self::Envelope>, Self::Error> {
        (**self).dequeue(queue).await
    }

    async fn ack(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error> {
        (**self).ack(queue, envelope).await
    }

    async fn retry(&self, queue: &str, envelope: &Self::Envelope) -> Result<Self::Envelope, Self::Error> {
        (**self).retry(queue, envelope).await
    }

    async fn fail(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error> {
        (**self).fail(queue, envelope).await
    }

    async fn release(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error> {
        (**self).release(queue, envelope).await
    }
}
