pub use self::{grid::*, locked_cells::*, piece::*};

pub(crate) mod grid;
pub(crate) mod locked_cells;
pub(crate) mod piece;
