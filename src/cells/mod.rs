mod cell;
mod cell_id;

pub use cell::Cell;
pub use cell_id::CellId;
