use rand::Rng as _;
use rand_pcg::Pcg32;

use crate::{
    PieceCollisionError,
    core::{
        BOARD_WIDTH, Board, FullRows, Piece, PieceKind, collides, is_corner_blocked,
    },
};

use super::piece_bag::{PieceBag, PieceSeed};

/// Offsets of the four corners of a T-piece's 3×3 bounding box.
const T_CORNERS: [(i32, i32); 4] = [(0, 0), (2, 0), (0, 2), (2, 2)];

/// Corners that must be obstructed for a T-spin.
const T_SPIN_MIN_CORNERS: usize = 3;

/// Board, current piece, piece source and garbage counter of one player.
///
/// `GameField` owns the mutation rules (movement, rotation, locking, garbage
/// materialisation) but no timing or state machine; [`GameSession`] drives it.
///
/// [`GameSession`]: super::GameSession
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    current: Option<Piece>,
    next: PieceKind,
    bag: PieceBag,
    garbage_rng: Pcg32,
    pending_garbage: u32,
    last_move_was_rotation: bool,
    spawned_pieces: u64,
}

/// What happened when the current piece was written into the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSummary {
    /// The piece that was locked.
    pub piece: Piece,
    /// Whether the lock qualified as a T-spin.
    pub t_spin: bool,
    /// Whether any cell landed in the buffer rows.
    pub lockout: bool,
    /// Visible rows that are now full.
    pub full_rows: FullRows,
}

/// The spawn position of the next piece was already occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("spawn position of the next piece is blocked")]
pub struct BlockoutError;

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    /// Creates an empty field with a random seed. No piece is spawned yet.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut bag = PieceBag::with_seed(seed);
        let next = bag.pop_next();
        Self {
            board: Board::new(),
            current: None,
            next,
            bag,
            garbage_rng: seed.garbage_rng(),
            pending_garbage: 0,
            last_move_was_rotation: false,
            spawned_pieces: 0,
        }
    }

    /// Replaces the board, for tests and puzzle setups.
    #[must_use]
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next
    }

    #[must_use]
    pub fn pending_garbage(&self) -> u32 {
        self.pending_garbage
    }

    #[must_use]
    pub fn last_move_was_rotation(&self) -> bool {
        self.last_move_was_rotation
    }

    /// Number of pieces spawned so far.
    #[must_use]
    pub fn spawned_pieces(&self) -> u64 {
        self.spawned_pieces
    }

    /// Where the current piece would land, without moving it.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.current.map(|piece| piece.dropped(&self.board))
    }

    /// Replaces the current piece if the new placement is free.
    pub fn set_current_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if collides(&self.board, Some(&piece), 0, 0) {
            return Err(PieceCollisionError);
        }
        self.current = Some(piece);
        Ok(())
    }

    /// Moves the current piece by `(dx, dy)` if the target is free.
    ///
    /// A successful move clears the rotation flag.
    pub fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.current else {
            return false;
        };
        if collides(&self.board, Some(&piece), dx, dy) {
            return false;
        }
        self.current = Some(piece.shifted(dx, dy));
        self.last_move_was_rotation = false;
        true
    }

    /// Rotates the current piece clockwise, trying wall kicks.
    pub fn try_rotate(&mut self) -> bool {
        let Some(rotated) = self.current.and_then(|piece| piece.kicked_rotation(&self.board))
        else {
            return false;
        };
        self.current = Some(rotated);
        self.last_move_was_rotation = true;
        true
    }

    /// Drops the current piece to its resting row. Returns the rows travelled.
    pub fn drop_to_bottom(&mut self) -> u32 {
        let mut rows = 0;
        while self.try_shift(0, 1) {
            rows += 1;
        }
        rows
    }

    /// Whether the current piece would be a T-spin if it locked now.
    #[must_use]
    pub fn is_t_spin(&self) -> bool {
        let Some(piece) = self.current else {
            return false;
        };
        if piece.kind() != PieceKind::T || !self.last_move_was_rotation {
            return false;
        }
        let (x, y) = (piece.position().x(), piece.position().y());
        let blocked = T_CORNERS
            .iter()
            .filter(|(dx, dy)| is_corner_blocked(&self.board, x + dx, y + dy))
            .count();
        blocked >= T_SPIN_MIN_CORNERS
    }

    /// Writes the current piece into the board and removes it.
    ///
    /// T-spin detection runs before the board changes. Returns `None` if
    /// there is no current piece.
    pub fn lock_current(&mut self) -> Option<LockSummary> {
        let t_spin = self.is_t_spin();
        let piece = self.current.take()?;
        let lockout = self.board.fill_piece(&piece);
        self.last_move_was_rotation = false;
        Some(LockSummary {
            piece,
            t_spin,
            lockout,
            full_rows: self.board.full_rows(),
        })
    }

    /// Removes cleared rows from the board.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        self.board.clear_rows(rows);
    }

    /// Materialises pending garbage, then spawns the next piece.
    ///
    /// On blockout nothing is written and no piece is current.
    pub fn spawn_next(&mut self) -> Result<(), BlockoutError> {
        self.materialize_garbage();
        let piece = Piece::new(self.next);
        self.next = self.bag.pop_next();
        self.last_move_was_rotation = false;
        if collides(&self.board, Some(&piece), 0, 0) {
            self.current = None;
            return Err(BlockoutError);
        }
        self.current = Some(piece);
        self.spawned_pieces += 1;
        Ok(())
    }

    fn materialize_garbage(&mut self) {
        if self.pending_garbage == 0 {
            return;
        }
        let count = std::mem::take(&mut self.pending_garbage);
        let hole = self.garbage_rng.random_range(0..BOARD_WIDTH);
        log::debug!("inserting {count} garbage rows (hole at column {hole})");
        self.board
            .push_garbage(usize::try_from(count).unwrap_or(usize::MAX), hole);
    }

    /// Queues attack lines received from the opponent.
    pub fn receive_garbage(&mut self, count: u32) {
        self.pending_garbage = self.pending_garbage.saturating_add(count);
    }

    /// Cancels `attack` against pending garbage and returns what is left to
    /// send.
    pub fn offset_garbage(&mut self, attack: u32) -> u32 {
        let cancelled = attack.min(self.pending_garbage);
        self.pending_garbage -= cancelled;
        attack - cancelled
    }
}
