use std::collections::VecDeque;

use arrayvec::ArrayVec;
use stackfall_engine::{BOARD_WIDTH, Board, Command, Piece, PiecePosition, collides};

use crate::{BoardAnalysis, WeightSet};

/// Columns tried for the left edge of a placement, walls included.
const SEARCH_MIN_X: i32 = -2;
#[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const SEARCH_MAX_X: i32 = BOARD_WIDTH as i32 + 2;

/// Upper bound on candidate placements: 4 rotations × 14 columns.
const MAX_CANDIDATES: usize = 4 * 14;

/// One step of a planned move sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMove {
    Rotate,
    Left,
    Right,
    Drop,
}

impl From<AiMove> for Command {
    fn from(mv: AiMove) -> Self {
        match mv {
            AiMove::Rotate => Command::Rotate,
            AiMove::Left => Command::MoveLeft,
            AiMove::Right => Command::MoveRight,
            AiMove::Drop => Command::HardDrop,
        }
    }
}

/// A resting placement found by the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Clockwise rotations applied to the spawn orientation.
    pub rotation: usize,
    /// Where the piece comes to rest.
    pub piece: Piece,
    /// Rows cleared by locking the piece there.
    pub cleared_rows: usize,
    pub score: f32,
}

impl Placement {
    /// Moves that bring a piece at column `from_x` in spawn orientation to
    /// this placement.
    #[must_use]
    pub fn moves_from(&self, from_x: i32) -> VecDeque<AiMove> {
        let dx = self.piece.position().x() - from_x;
        let shift = if dx < 0 { AiMove::Left } else { AiMove::Right };
        let steps = usize::try_from(dx.unsigned_abs()).unwrap_or(0);
        let mut moves = VecDeque::with_capacity(self.rotation + steps + 1);
        moves.extend(std::iter::repeat_n(AiMove::Rotate, self.rotation));
        moves.extend(std::iter::repeat_n(shift, steps));
        moves.push_back(AiMove::Drop);
        moves
    }
}

/// Every collision-free resting placement of `piece`, in rotation-major,
/// left-to-right order.
///
/// Rotations are applied without kicks to the spawn orientation of the
/// piece's kind; each candidate starts at the row of `piece`.
#[must_use]
pub fn candidate_placements(board: &Board, piece: &Piece) -> ArrayVec<(usize, Piece), MAX_CANDIDATES> {
    let y = piece.position().y();
    let mut shaped = Piece::new(piece.kind());
    let mut candidates = ArrayVec::new();
    for rotation in 0..piece.kind().distinct_rotations() {
        for x in SEARCH_MIN_X..SEARCH_MAX_X {
            let placed = shaped.with_position(PiecePosition::new(x, y));
            if collides(board, Some(&placed), 0, 0) {
                continue;
            }
            candidates.push((rotation, placed.dropped(board)));
        }
        shaped = shaped.rotated();
    }
    candidates
}

/// Finds the best placement of `piece` with the default weights.
///
/// The search is pure: the same board and piece always give the same
/// placement.
#[must_use]
pub fn find_best_move(board: &Board, piece: &Piece) -> Option<Placement> {
    find_best_move_with(&WeightSet::DEFAULT, board, piece)
}

/// Finds the best placement of `piece` using `weights`.
///
/// Ties keep the first placement in search order. Returns `None` when no
/// placement is free.
#[must_use]
pub fn find_best_move_with(weights: &WeightSet, board: &Board, piece: &Piece) -> Option<Placement> {
    let mut best: Option<Placement> = None;
    for (rotation, resting) in candidate_placements(board, piece) {
        let mut after = board.clone();
        after.fill_piece(&resting);
        let cleared_rows = after.clear_full_rows();
        let analysis = BoardAnalysis::from_board(&after);
        let score = weights.evaluate(&analysis, cleared_rows);
        if best.is_none_or(|best| score > best.score) {
            best = Some(Placement {
                rotation,
                piece: resting,
                cleared_rows,
                score,
            });
        }
    }
    best
}

/// Plans the move sequence for `piece`, falling back to a bare drop when no
/// placement exists.
#[must_use]
pub fn plan_moves(weights: &WeightSet, board: &Board, piece: &Piece) -> VecDeque<AiMove> {
    match find_best_move_with(weights, board, piece) {
        Some(placement) => {
            log::trace!(
                "planned {:?}: rotation {}, x {}, score {:.2}",
                piece.kind(),
                placement.rotation,
                placement.piece.position().x(),
                placement.score,
            );
            placement.moves_from(piece.position().x())
        }
        None => VecDeque::from([AiMove::Drop]),
    }
}

#[cfg(test)]
mod tests {
    use stackfall_engine::{Block, PieceKind};

    use super::*;

    #[test]
    fn test_candidates_cover_every_column() {
        let board = Board::new();
        let o = Piece::new(PieceKind::O);
        let candidates = candidate_placements(&board, &o);
        assert_eq!(candidates.len(), 9);
        assert!(candidates.iter().all(|(rotation, _)| *rotation == 0));

        let i = Piece::new(PieceKind::I);
        // 7 horizontal columns + 10 vertical ones.
        assert_eq!(candidate_placements(&board, &i).len(), 7 + 10);

        let t = Piece::new(PieceKind::T);
        assert_eq!(candidate_placements(&board, &t).len(), 8 + 9 + 8 + 9);
        assert!(candidate_placements(&board, &t).len() <= MAX_CANDIDATES);
    }

    #[test]
    fn test_prefers_filling_the_gap() {
        let board = Board::from_ascii(
            r"
            #########.
            #########.
            #########.
            #########.
            ",
        );
        let piece = Piece::new(PieceKind::I);
        let best = find_best_move(&board, &piece).unwrap();
        assert_eq!(best.rotation, 1);
        assert_eq!(best.piece.position(), PiecePosition::new(9, 16));
        assert_eq!(best.cleared_rows, 4);

        let moves = best.moves_from(piece.position().x());
        let expected: Vec<AiMove> = [AiMove::Rotate]
            .into_iter()
            .chain([AiMove::Right; 6])
            .chain([AiMove::Drop])
            .collect();
        assert_eq!(moves.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_search_is_deterministic() {
        let board = Board::from_ascii(
            r"
            ...#......
            #.####.##.
            ###.######
            ",
        );
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind);
            let first = find_best_move(&board, &piece);
            let second = find_best_move(&board, &piece);
            assert_eq!(first, second, "{kind:?}");
        }
    }

    #[test]
    fn test_blocked_board_falls_back_to_drop() {
        let mut board = Board::new();
        for y in 0..3 {
            for x in 0..10 {
                board.set_cell(x, y, Block::Garbage);
            }
        }
        let piece = Piece::new(PieceKind::T);
        assert!(find_best_move(&board, &piece).is_none());
        let moves = plan_moves(&WeightSet::DEFAULT, &board, &piece);
        assert_eq!(moves, VecDeque::from([AiMove::Drop]));
    }

    #[test]
    fn test_moves_shift_left() {
        let placement = Placement {
            rotation: 0,
            piece: Piece::new(PieceKind::O).with_position(PiecePosition::new(0, 18)),
            cleared_rows: 0,
            score: 0.0,
        };
        let moves = placement.moves_from(3);
        assert_eq!(
            moves,
            VecDeque::from([AiMove::Left, AiMove::Left, AiMove::Left, AiMove::Drop])
        );
        assert_eq!(Command::from(AiMove::Drop), Command::HardDrop);
    }
}
