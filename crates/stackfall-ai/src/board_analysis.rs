use std::{cell::OnceCell, iter};

use stackfall_engine::{BOARD_WIDTH, Board, TOTAL_HEIGHT};

/// Minimum depth for a well to count as a separate well.
pub const COUNTED_WELL_DEPTH: u8 = 2;

/// Lazily computed surface features of a board.
///
/// Each feature is computed on first access and cached, so evaluating only
/// some of them costs nothing for the rest.
///
/// # Example
///
/// ```
/// use stackfall_ai::BoardAnalysis;
/// use stackfall_engine::Board;
///
/// let board = Board::from_ascii(
///     r"
///     #.........
///     ###.#......
///     ",
/// );
/// let analysis = BoardAnalysis::from_board(&board);
/// assert_eq!(analysis.column_heights()[..4], [2, 1, 0, 1]);
/// assert_eq!(analysis.aggregate_height(), 4);
/// assert_eq!(analysis.num_holes(), 0);
/// ```
#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    column_heights: OnceCell<[u8; BOARD_WIDTH]>,
    column_well_depths: OnceCell<[u8; BOARD_WIDTH]>,
    aggregate_height: OnceCell<u32>,
    num_holes: OnceCell<u32>,
    bumpiness: OnceCell<u32>,
    total_well_depth: OnceCell<u32>,
    well_count: OnceCell<u32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self {
            board: board.clone(),
            column_heights: OnceCell::new(),
            column_well_depths: OnceCell::new(),
            aggregate_height: OnceCell::new(),
            num_holes: OnceCell::new(),
            bumpiness: OnceCell::new(),
            total_well_depth: OnceCell::new(),
            well_count: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Distance from the topmost filled cell of each column to the floor.
    #[must_use]
    pub fn column_heights(&self) -> &[u8; BOARD_WIDTH] {
        self.column_heights.get_or_init(|| {
            let mut heights = [0; BOARD_WIDTH];
            for (x, h) in heights.iter_mut().enumerate() {
                let top = self.board.rows().position(|row| row[x].is_filled());
                if let Some(top) = top {
                    *h = u8::try_from(TOTAL_HEIGHT - top).unwrap_or(u8::MAX);
                }
            }
            heights
        })
    }

    /// Depth of the well at each column, 0 where there is none.
    ///
    /// A well is a column strictly lower than both neighbours; the side walls
    /// count as infinitely tall neighbours.
    #[must_use]
    pub fn column_well_depths(&self) -> &[u8; BOARD_WIDTH] {
        self.column_well_depths.get_or_init(|| {
            let h = self.column_heights();
            let start = &[u8::MAX, h[0], h[1]][..];
            let end = &[h[h.len() - 2], h[h.len() - 1], u8::MAX][..];
            let triples = iter::once(start).chain(h.windows(3)).chain(iter::once(end));
            let mut depths = [0; BOARD_WIDTH];
            for (w, depth) in iter::zip(triples, &mut depths) {
                if w[1] < w[0] && w[1] < w[2] {
                    *depth = u8::min(w[0], w[2]) - w[1];
                }
            }
            depths
        })
    }

    #[must_use]
    pub fn aggregate_height(&self) -> u32 {
        *self
            .aggregate_height
            .get_or_init(|| self.column_heights().iter().copied().map(u32::from).sum())
    }

    /// Empty cells with a filled cell somewhere above them in the same column.
    #[must_use]
    pub fn num_holes(&self) -> u32 {
        *self.num_holes.get_or_init(|| {
            let mut holes = 0;
            for x in 0..BOARD_WIDTH {
                let mut covered = false;
                for row in self.board.rows() {
                    if row[x].is_filled() {
                        covered = true;
                    } else if covered {
                        holes += 1;
                    }
                }
            }
            holes
        })
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> u32 {
        *self.bumpiness.get_or_init(|| {
            self.column_heights()
                .windows(2)
                .map(|w| u32::from(w[0].abs_diff(w[1])))
                .sum()
        })
    }

    /// Depth of every well, shallow ones included.
    #[must_use]
    pub fn total_well_depth(&self) -> u32 {
        *self.total_well_depth.get_or_init(|| {
            self.column_well_depths()
                .iter()
                .copied()
                .map(u32::from)
                .sum()
        })
    }

    /// Wells at least [`COUNTED_WELL_DEPTH`] deep.
    #[must_use]
    pub fn well_count(&self) -> u32 {
        *self.well_count.get_or_init(|| {
            let count = self
                .column_well_depths()
                .iter()
                .filter(|depth| **depth >= COUNTED_WELL_DEPTH)
                .count();
            u32::try_from(count).unwrap_or(u32::MAX)
        })
    }
}
