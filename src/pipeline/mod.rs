mod diagnostics;
mod pipeline;
mod record;

pub use diagnostics::Diagnostics;
pub use pipeline::Pipeline;
pub use record::{CategoryTotals, CellRecord, Classification};
