mod category;
mod thresholds;

pub use category::Category;
pub use thresholds::{classify, round_half_up, Thresholds, Tier};
