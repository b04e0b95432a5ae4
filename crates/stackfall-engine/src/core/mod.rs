pub use self::{board::*, collision::*, piece::*};

pub(crate) mod board;
pub(crate) mod collision;
pub(crate) mod piece;

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Hidden rows above the visible field where pieces spawn.
pub const BUFFER_HEIGHT: usize = 2;
/// Rows of the visible play field.
pub const VISIBLE_HEIGHT: usize = 20;
/// Total rows, buffer included.
pub const TOTAL_HEIGHT: usize = BUFFER_HEIGHT + VISIBLE_HEIGHT;
