use std::sync::Arc;

use super::{Driver, MetricsDriver};
use crate::config::{DimensionStrategy, MetricsConfig};
use crate::error::Result;
use crate::metrics::MetricsSink;
use crate::utils::{Logger, TracingLogger};

/// Builder for constructing a [`MetricsDriver`]
pub struct MetricsDriverBuilder<D> {
    wrapped: D,
    sink: Arc<dyn MetricsSink>,
    config: MetricsConfig,
    logger: Option<Arc<dyn Logger>>,
}

impl<D: Driver> MetricsDriverBuilder<D> {
    /// Builder with the default configuration
    pub fn new(wrapped: D, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            wrapped,
            sink,
            config: MetricsConfig::default(),
            logger: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: MetricsConfig) -> Self {
        self.config = config;
        self
    }

    /// Namespace every record is submitted under
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// How each metric is expanded into records
    pub fn dimension_strategy(mut self, strategy: DimensionStrategy) -> Self {
        self.config.dimension_strategy = strategy;
        self
    }

    /// Where swallowed sink failures are reported. Defaults to [`TracingLogger`].
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the decorator
    pub fn build(self) -> Result<MetricsDriver<D>> {
        self.config.validate()?;

        let logger = self.logger.unwrap_or_else(|| Arc::new(TracingLogger));
        Ok(MetricsDriver::from_parts(self.wrapped, self.sink, logger, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MemorySink;
    use crate::testing::InMemoryDriver;

    #[test]
    fn test_builder_default() {
        let driver = MetricsDriver::builder(InMemoryDriver::new(), Arc::new(MemorySink::new()))
            .build()
            .unwrap();
        assert_eq!(driver.namespace(), "PMG/Queue");
        assert_eq!(driver.in_flight(), 0);
    }

    #[test]
    fn test_builder_applies_config() {
        let config = MetricsConfig::with_namespace("Billing/Workers");
        let driver = MetricsDriver::builder(InMemoryDriver::new(), Arc::new(MemorySink::new()))
            .with_config(config)
            .build()
            .unwrap();
        assert_eq!(driver.namespace(), "Billing/Workers");
    }

    #[test]
    fn test_builder_validation() {
        let result = MetricsDriver::builder(InMemoryDriver::new(), Arc::new(MemorySink::new()))
            .namespace("")
            .build();
        assert!(result.is_err());
    }
}
