//! Metric values, timing, and submission to a metrics backend

mod emf;
mod metric;
mod reporter;
mod sink;
mod timing;

pub use emf::EmfSink;
pub use metric::{
    names, Dimension, Dimensions, MessageStatus, Metric, MetricDatum, Unit,
    MAX_DIMENSION_VALUE_LENGTH,
};
pub use reporter::MetricsReporter;
pub use sink::{MemorySink, MetricsSink, Submission, TracingSink};
pub use timing::{round_millis, TimingToken, TimingTracker};
