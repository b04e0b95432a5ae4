use super::{BOARD_WIDTH, BUFFER_HEIGHT, TOTAL_HEIGHT, board::Board, piece::Piece};

/// Whether `piece`, shifted by `(dx, dy)`, overlaps a wall, the floor, or a
/// filled cell.
///
/// Cells above the top of the grid never collide, so a spawning piece may
/// poke out of the buffer. A missing or shapeless piece always collides.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Board, Piece, PieceKind, collides};
///
/// let board = Board::new();
/// let piece = Piece::new(PieceKind::O);
/// assert!(!collides(&board, Some(&piece), 0, 0));
/// assert!(collides(&board, None, 0, 0));
/// ```
#[must_use]
pub fn collides(board: &Board, piece: Option<&Piece>, dx: i32, dy: i32) -> bool {
    let Some(piece) = piece else {
        return true;
    };
    if piece.shape().is_empty() {
        return true;
    }
    piece.occupied_positions().any(|(x, y)| {
        let x = x + dx;
        let board_y = y + dy + offset(BUFFER_HEIGHT);
        if x < 0 || x >= offset(BOARD_WIDTH) || board_y >= offset(TOTAL_HEIGHT) {
            return true;
        }
        board_y >= 0 && board.is_filled(x, board_y)
    })
}

/// Whether a corner probe at piece coordinates `(x, y)` counts as obstructed
/// for T-spin detection: outside the side walls, above the buffer, below the
/// floor, or on a filled cell.
#[must_use]
pub fn is_corner_blocked(board: &Board, x: i32, y: i32) -> bool {
    let board_y = y + offset(BUFFER_HEIGHT);
    if x < 0 || x >= offset(BOARD_WIDTH) || board_y < 0 || board_y >= offset(TOTAL_HEIGHT) {
        return true;
    }
    board.is_filled(x, board_y)
}

#[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const fn offset(n: usize) -> i32 {
    n as i32
}
