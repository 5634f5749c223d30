// Location: src/config.rs

//! Decorator configuration

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "PMG/Queue";

/// Longest namespace the backend accepts
pub const MAX_NAMESPACE_LENGTH: usize = 255;

/// Prefix reserved by the backend for its own namespaces
const RESERVED_NAMESPACE_PREFIX: &str = "AWS/";

/// Settings for a [`MetricsDriver`](crate::MetricsDriver)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metric group every record is submitted under
    pub namespace: String,

    /// How each metric is expanded into backend records
    pub dimension_strategy: DimensionStrategy,
}

/// Controls how many records a single metric turns into.
///
/// Backends like CloudWatch treat every distinct dimension combination as its
/// own metric stream, so a dimensioned record alone can't be aggregated
/// across queues. `Rollup` sends an undimensioned twin alongside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionStrategy {
    /// One undimensioned record followed by one fully dimensioned record
    #[default]
    Rollup,
    /// Only the fully dimensioned record
    DimensionedOnly,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            dimension_strategy: DimensionStrategy::Rollup,
        }
    }
}

impl MetricsConfig {
    /// Configuration with the given namespace and default everything else
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Check the namespace is one the backend will accept
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(MetricsError::Configuration {
                message: "Namespace cannot be empty".to_string(),
                parameter: "namespace".to_string(),
            });
        }

        if self.namespace.chars().count() > MAX_NAMESPACE_LENGTH {
            return Err(MetricsError::Configuration {
                message: format!(
                    "Namespace cannot be longer than {} characters",
                    MAX_NAMESPACE_LENGTH
                ),
                parameter: "namespace".to_string(),
            });
        }

        if self.namespace.starts_with(RESERVED_NAMESPACE_PREFIX) {
            return Err(MetricsError::Configuration {
                message: format!(
                    "Namespace cannot start with reserved prefix {}",
                    RESERVED_NAMESPACE_PREFIX
                ),
                parameter: "namespace".to_string(),
            });
        }

        Ok(())
    }
}
