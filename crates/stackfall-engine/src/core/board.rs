use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    BOARD_WIDTH, BUFFER_HEIGHT, TOTAL_HEIGHT, VISIBLE_HEIGHT,
    piece::{Piece, PieceKind},
};

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Locked cell of a specific piece type.
    Piece(PieceKind),
    /// Cell of an attack row received from an opponent.
    Garbage,
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn is_filled(self) -> bool {
        !self.is_empty()
    }

    /// Display color token of the cell, `None` when empty.
    #[must_use]
    pub fn color(self) -> Option<&'static str> {
        match self {
            Block::Empty => None,
            Block::Piece(kind) => Some(kind.color()),
            Block::Garbage => Some("#808080"),
        }
    }
}

type BoardRow = [Block; BOARD_WIDTH];

const EMPTY_ROW: BoardRow = [Block::Empty; BOARD_WIDTH];

/// Rows of the board that are completely filled, top to bottom.
pub type FullRows = ArrayVec<usize, VISIBLE_HEIGHT>;

/// The play field: 10 columns × 22 rows.
///
/// # Layout
///
/// - Rows `0..2` are the hidden buffer where pieces spawn
/// - Rows `2..22` are the visible field
/// - Row indices grow downward; row 21 rests on the floor
///
/// Only cell contents ever change. Piece coordinates are converted to board
/// rows by adding [`BUFFER_HEIGHT`].
///
/// # Example
///
/// ```
/// use stackfall_engine::Board;
///
/// let board = Board::from_ascii(
///     r"
///     ##########.
///     ###########
///     ",
/// );
/// assert_eq!(board.full_rows().as_slice(), &[Board::TOTAL_HEIGHT - 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [BoardRow; TOTAL_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const BUFFER_HEIGHT: usize = BUFFER_HEIGHT;
    pub const VISIBLE_HEIGHT: usize = VISIBLE_HEIGHT;
    pub const TOTAL_HEIGHT: usize = TOTAL_HEIGHT;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: [EMPTY_ROW; TOTAL_HEIGHT],
        }
    }

    /// Cell at column `x`, board row `y`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Block> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y)?.get(x).copied()
    }

    /// Whether the in-grid cell at column `x`, board row `y` is filled.
    ///
    /// Coordinates outside the grid are reported as not filled; bounds
    /// policy is left to the caller.
    #[must_use]
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(Block::is_filled)
    }

    /// Overwrites a cell. Out-of-grid coordinates are ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, block: Block) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = block;
        }
    }

    /// All rows, buffer included, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Block; BOARD_WIDTH]> {
        self.rows.iter()
    }

    /// Rows of the visible field, top to bottom.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Block; BOARD_WIDTH]> {
        self.rows[BUFFER_HEIGHT..].iter()
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y].iter().all(|block| block.is_filled())
    }

    /// Visible rows whose every cell is filled. Buffer rows never qualify.
    #[must_use]
    pub fn full_rows(&self) -> FullRows {
        (BUFFER_HEIGHT..TOTAL_HEIGHT)
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Writes the piece's cells into the board.
    ///
    /// Returns `true` if any written cell landed in the buffer rows
    /// (a lockout). The write is applied either way.
    pub fn fill_piece(&mut self, piece: &Piece) -> bool {
        let block = Block::Piece(piece.kind());
        let mut in_buffer = false;
        for (x, y) in piece.occupied_positions() {
            let board_y = y + to_i32(BUFFER_HEIGHT);
            if board_y < to_i32(BUFFER_HEIGHT) {
                in_buffer = true;
            }
            self.set_cell(x, board_y, block);
        }
        in_buffer
    }

    /// Removes the given rows, compacts the rest downward and refills the
    /// top with empty rows.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        let mut kept = Vec::with_capacity(TOTAL_HEIGHT);
        kept.extend(
            self.rows
                .iter()
                .enumerate()
                .filter(|(y, _)| !rows.contains(y))
                .map(|(_, row)| *row),
        );
        let removed = TOTAL_HEIGHT - kept.len();
        self.rows[..removed].fill(EMPTY_ROW);
        self.rows[removed..].copy_from_slice(&kept);
    }

    /// Clears every full visible row at once and returns how many were removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let rows = self.full_rows();
        self.clear_rows(&rows);
        rows.len()
    }

    /// Shifts the board up by `count` rows and appends `count` garbage rows
    /// sharing one empty `hole` column.
    ///
    /// Rows shifted past the top of the buffer are discarded.
    pub fn push_garbage(&mut self, count: usize, hole: usize) {
        let count = count.min(TOTAL_HEIGHT);
        if count == 0 {
            return;
        }
        self.rows.rotate_left(count);
        let mut garbage = [Block::Garbage; BOARD_WIDTH];
        if let Some(cell) = garbage.get_mut(hole) {
            *cell = Block::Empty;
        }
        self.rows[TOTAL_HEIGHT - count..].fill(garbage);
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// `#` is a garbage cell, a piece letter such as `T` a cell of that
    /// piece, and `.` an empty one. Each row must be 10 cells wide.
    /// Rows are listed top to bottom and aligned to the floor, so the last
    /// line describes board row 21.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::new();
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(lines.len() <= TOTAL_HEIGHT, "too many rows: {}", lines.len());
        let top = TOTAL_HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line
                .chars()
                .filter(|&c| matches!(c, '#' | '.') || PieceKind::from_char(c).is_some())
                .collect();
            assert_eq!(
                cells.len(),
                BOARD_WIDTH,
                "Each row must have exactly {BOARD_WIDTH} cells, got {} at row {i}",
                cells.len(),
            );
            for (x, &ch) in cells.iter().enumerate() {
                board.rows[top + i][x] = match ch {
                    '#' => Block::Garbage,
                    _ => PieceKind::from_char(ch).map_or(Block::Empty, Block::Piece),
                };
            }
        }
        board
    }
}

#[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const fn to_i32(n: usize) -> i32 {
    n as i32
}
