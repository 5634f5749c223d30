// Location: src/driver/metrics_driver.rs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::builder::MetricsDriverBuilder;
use super::envelope::TrackedEnvelope;
use super::{Driver, Envelope, Message};
use crate::config::MetricsConfig;
use crate::error::DriverError;
use crate::metrics::{
    names, round_millis, Dimensions, MessageStatus, Metric, MetricsReporter, MetricsSink,
    TimingTracker,
};
use crate::utils::{Logger, TracingLogger};

/// Wraps a [`Driver`] and reports a metric for every operation on it.
///
/// Results from the wrapped driver are returned untouched, errors included.
/// Metrics are best-effort: a failing sink is logged and otherwise ignored.
///
/// | operation | metric on success | extra |
/// |-----------|-------------------|-------|
/// | enqueue   | `MessageEnqueue`  | |
/// | dequeue   | `MessageDequeue`  | nothing for an empty poll; starts timing |
/// | ack       | `MessageSuccess`  | `MessageTime` if timed |
/// | retry     | `MessageRetry`    | `MessageTime` if timed |
/// | fail      | `MessageFailure`  | `MessageTime` if timed |
/// | release   | `MessageRelease`  | `MessageTime` if timed |
///
/// Any driver error is reported as `DriverError` with an `ErrorKind`
/// dimension instead.
pub struct MetricsDriver<D> {
    wrapped: D,
    reporter: MetricsReporter,
    timings: TimingTracker,
}

impl<D: Driver> MetricsDriver<D> {
    /// Decorate `wrapped` with the default configuration
    pub fn new(wrapped: D, sink: Arc<dyn MetricsSink>) -> Self {
        Self::from_parts(wrapped, sink, Arc::new(TracingLogger), MetricsConfig::default())
    }

    /// Start a builder for a decorator around `wrapped`
    pub fn builder(wrapped: D, sink: Arc<dyn MetricsSink>) -> MetricsDriverBuilder<D> {
        MetricsDriverBuilder::new(wrapped, sink)
    }

    pub(crate) fn from_parts(
        wrapped: D,
        sink: Arc<dyn MetricsSink>,
        logger: Arc<dyn Logger>,
        config: MetricsConfig,
    ) -> Self {
        Self {
            wrapped,
            reporter: MetricsReporter::new(sink, logger, config),
            timings: TimingTracker::new(),
        }
    }

    /// The decorated driver
    pub fn wrapped(&self) -> &D {
        &self.wrapped
    }

    /// Drop the decorator and return the wrapped driver
    pub fn into_inner(self) -> D {
        self.wrapped
    }

    /// Namespace metrics are submitted under
    pub fn namespace(&self) -> &str {
        self.reporter.namespace()
    }

    /// Number of dequeued messages that haven't been finished yet
    pub fn in_flight(&self) -> usize {
        self.timings.len()
    }

    async fn track_driver_error(&self, queue: &str, error: &D::Error, message: Option<&str>) {
        trace!(queue, kind = error.kind(), "driver error");
        self.reporter
            .report(
                &[Metric::count(names::DRIVER_ERROR, 1).with_dimension(names::ERROR_KIND, error.kind())],
                &dimensions_for(queue, message),
            )
            .await;
    }

    async fn track_message_finished(
        &self,
        status: MessageStatus,
        queue: &str,
        envelope: &TrackedEnvelope<D::Envelope>,
    ) {
        let mut metrics = vec![Metric::count(status.metric_name(), 1)];

        if let Some(elapsed) = envelope.token().and_then(|token| self.timings.finish(token)) {
            metrics.push(
                Metric::millis(names::MESSAGE_TIME, round_millis(elapsed))
                    .with_dimension(names::MESSAGE_STATUS, status.as_str()),
            );
        }

        self.reporter
            .report(&metrics, &dimensions_for(queue, Some(message_name(envelope.message()))))
            .await;
    }

    /// Report the outcome of a finishing operation and pass its result through
    async fn finish<T: Send>(
        &self,
        status: MessageStatus,
        queue: &str,
        envelope: &TrackedEnvelope<D::Envelope>,
        result: Result<T, D::Error>,
    ) -> Result<T, D::Error> {
        match result {
            Ok(out) => {
                self.track_message_finished(status, queue, envelope).await;
                Ok(out)
            }
            Err(e) => {
                // The timing entry is kept so a later finish measures from
                // the original dequeue
                self.track_driver_error(queue, &e, Some(message_name(envelope.message())))
                    .await;
                Err(e)
            }
        }
    }
}

fn message_name<M: Message>(message: &M) -> &str {
    match message.name() {
        "" => names::NO_MESSAGE_NAME,
        name => name,
    }
}

fn dimensions_for(queue: &str, message: Option<&str>) -> Dimensions {
    let mut dimensions = Dimensions::new();
    dimensions.insert(names::QUEUE_NAME.to_string(), queue.to_string());
    if let Some(name) = message {
        dimensions.insert(names::MESSAGE_NAME.to_string(), name.to_string());
    }
    dimensions
}

#[async_trait]
impl<D: Driver> Driver for MetricsDriver<D> {
    type Message = D::Message;
    type Envelope = TrackedEnvelope<D::Envelope>;
    type Error = D::Error;

    async fn enqueue(&self, queue: &str, message: Self::Message) -> Result<Self::Envelope, Self::Error> {
        let name = message_name(&message).to_string();

        match self.wrapped.enqueue(queue, message).await {
            Ok(envelope) => {
                self.reporter
                    .report(
                        &[Metric::count(names::MESSAGE_ENQUEUE, 1)],
                        &dimensions_for(queue, Some(&name)),
                    )
                    .await;
                Ok(TrackedEnvelope::untracked(envelope))
            }
            Err(e) => {
                self.track_driver_error(queue, &e, Some(&name)).await;
                Err(e)
            }
        }
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<Self::Envelope>, Self::Error> {
        let envelope = match self.wrapped.dequeue(queue).await {
            Ok(Some(envelope)) => envelope,
            // Empty polls are frequent and not worth a metric
            Ok(None) => return Ok(None),
            Err(e) => {
                self.track_driver_error(queue, &e, None).await;
                return Err(e);
            }
        };

        self.reporter
            .report(
                &[Metric::count(names::MESSAGE_DEQUEUE, 1)],
                &dimensions_for(queue, Some(message_name(envelope.message()))),
            )
            .await;

        let token = self.timings.start();
        trace!(queue, %token, in_flight = self.timings.len(), "timing started");

        Ok(Some(TrackedEnvelope::tracked(envelope, token)))
    }

    async fn ack(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error> {
        let result = self.wrapped.ack(queue, envelope.inner()).await;
        self.finish(MessageStatus::Success, queue, envelope, result).await
    }

    async fn retry(&self, queue: &str, envelope: &Self::Envelope) -> Result<Self::Envelope, Self::Error> {
        let result = self.wrapped.retry(queue, envelope.inner()).await;
        self.finish(MessageStatus::Retry, queue, envelope, result)
            .await
            .map(TrackedEnvelope::untracked)
    }

    async fn fail(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error> {
        let result = self.wrapped.fail(queue, envelope.inner()).await;
        self.finish(MessageStatus::Failure, queue, envelope, result).await
    }

    async fn release(&self, queue: &str, envelope: &Self::Envelope) -> Result<(), Self::Error> {
        let result = self.wrapped.release(queue, envelope.inner()).await;
        self.finish(MessageStatus::Release, queue, envelope, result).await
    }
}
