use std::{fmt, time::Duration};

use crate::core::{BUFFER_HEIGHT, Block, Board, Piece, PieceKind, PiecePosition, PieceShape};

use super::game_session::{GameSession, SessionState};

/// Read-only view of a session for presentation layers.
///
/// `Display` renders the visible field as text: locked cells show their
/// piece letter, garbage is `#`, the current piece `@`, the ghost `:`.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub board: &'a Board,
    pub current: Option<PieceView>,
    pub ghost: Option<PiecePosition>,
    pub next: PieceKind,
    pub pending_garbage: u32,
    pub state: SessionState,
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub combo: u32,
    pub back_to_back: bool,
    pub elapsed: Duration,
    pub action_label: Option<&'a str>,
}

/// The falling piece as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceView {
    pub kind: PieceKind,
    pub shape: PieceShape,
    pub position: PiecePosition,
    pub color: &'static str,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind(),
            shape: *piece.shape(),
            position: piece.position(),
            color: piece.color(),
        }
    }
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(session: &'a GameSession) -> Self {
        let field = session.field();
        let stats = session.stats();
        Self {
            board: field.board(),
            current: field.current_piece().map(PieceView::from),
            ghost: field.ghost_piece().map(|ghost| ghost.position()),
            next: field.next_piece(),
            pending_garbage: field.pending_garbage(),
            state: session.session_state(),
            score: stats.score(),
            level: stats.level(),
            lines: stats.lines_cleared(),
            combo: stats.combo_count(),
            back_to_back: stats.is_back_to_back(),
            elapsed: session.elapsed(),
            action_label: session.action_label(),
        }
    }

    fn overlay(&self, x: i32, board_y: i32) -> Option<char> {
        let view = self.current?;
        let covers = |position: PiecePosition| {
            view.shape.filled_cells().any(|(dx, dy)| {
                (position.x() + dx, position.y() + dy + offset(BUFFER_HEIGHT)) == (x, board_y)
            })
        };
        if covers(view.position) {
            Some('@')
        } else if self.ghost.is_some_and(covers) {
            Some(':')
        } else {
            None
        }
    }
}

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.board.visible_rows().enumerate() {
            let board_y = offset(row + BUFFER_HEIGHT);
            for (col, block) in cells.iter().enumerate() {
                let x = offset(col);
                let ch = self.overlay(x, board_y).unwrap_or(match block {
                    Block::Empty => '.',
                    Block::Piece(kind) => kind.as_char(),
                    Block::Garbage => '#',
                });
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const fn offset(n: usize) -> i32 {
    n as i32
}
