mod metrics;

pub use metrics::{aggregate, LocalMetrics};
