mod engine;
mod rule;

pub use engine::{apply_overrides, Applied, OverrideEngine};
pub use rule::{AttributeMatch, OverrideRule};
