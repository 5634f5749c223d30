use std::sync::Arc;

use tracing::debug;

use super::metric::{Dimensions, Metric, MetricDatum};
use super::sink::MetricsSink;
use crate::config::{DimensionStrategy, MetricsConfig};
use crate::utils::Logger;

const SINK_FAILURE_TEMPLATE: &str = "Caught {kind} putting metric data: {message}";

/// Turns metrics for one queue event into backend records and submits them.
///
/// Sink failures stop here: they are reported through the [`Logger`] and
/// never reach the caller.
pub struct MetricsReporter {
    sink: Arc<dyn MetricsSink>,
    logger: Arc<dyn Logger>,
    namespace: String,
    strategy: DimensionStrategy,
}

impl MetricsReporter {
    /// Reporter submitting to `sink` with the settings in `config`
    pub fn new(sink: Arc<dyn MetricsSink>, logger: Arc<dyn Logger>, config: MetricsConfig) -> Self {
        Self {
            sink,
            logger,
            namespace: config.namespace,
            strategy: config.dimension_strategy,
        }
    }

    /// Namespace records are submitted under
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// How metrics are expanded into records
    pub fn strategy(&self) -> DimensionStrategy {
        self.strategy
    }

    /// Records for `metrics` under `dimensions`, in submission order
    pub fn records(&self, metrics: &[Metric], dimensions: &Dimensions) -> Vec<MetricDatum> {
        match self.strategy {
            DimensionStrategy::Rollup => metrics
                .iter()
                .flat_map(|m| [m.render_undimensioned(), m.render(dimensions)])
                .collect(),
            DimensionStrategy::DimensionedOnly => {
                metrics.iter().map(|m| m.render(dimensions)).collect()
            }
        }
    }

    /// Submit every record for one event in a single call
    pub async fn report(&self, metrics: &[Metric], dimensions: &Dimensions) {
        let records = self.records(metrics, dimensions);
        debug!(
            namespace = %self.namespace,
            records = records.len(),
            "submitting metric data"
        );

        if let Err(e) = self.sink.submit(&self.namespace, records).await {
            let message = e.to_string();
            self.logger.error(
                SINK_FAILURE_TEMPLATE,
                &[("kind", e.kind()), ("message", message.as_str())],
            );
        }
    }
}
