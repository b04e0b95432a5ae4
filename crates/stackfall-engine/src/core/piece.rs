use serde::{Deserialize, Serialize};

use super::{board::Board, collision::collides};

/// Largest side of any piece matrix (the I-piece).
const MAX_SHAPE_SIDE: usize = 4;

/// Offsets tried, in order, when a rotated piece collides in place.
///
/// Negative `y` moves the piece up.
pub const KICK_OFFSETS: [(i32, i32); 5] = [(-1, 0), (1, 0), (0, -1), (-1, -1), (1, -1)];

/// A falling piece: kind, current shape matrix and position.
///
/// Pieces are values. Movement and rotation return new `Piece` instances and
/// leave the original untouched, which is what the ghost computation and the
/// AI search rely on.
///
/// # Coordinate System
///
/// - `x` is the column of the shape's left edge (may be negative while the
///   shape still fits on the board)
/// - `y` is the row of the shape's top edge relative to the *visible* field;
///   negative values are in the hidden buffer
/// - The board row of a piece cell is `y + 2`
///
/// # Example
///
/// ```
/// use stackfall_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// assert_eq!((piece.position().x(), piece.position().y()), (3, -1));
///
/// let rotated = piece.rotated().rotated().rotated().rotated();
/// assert_eq!(rotated.shape(), piece.shape());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: PieceShape,
    position: PiecePosition,
}

impl Piece {
    /// Creates a piece in its canonical orientation at the spawn position.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            position: PiecePosition::SPAWN,
        }
    }

    /// Creates a piece from explicit parts.
    #[must_use]
    pub const fn from_parts(kind: PieceKind, shape: PieceShape, position: PiecePosition) -> Self {
        Self {
            kind,
            shape,
            position,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &PieceShape {
        &self.shape
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn color(&self) -> &'static str {
        self.kind.color()
    }

    /// Absolute `(x, y)` of every filled cell, in piece coordinates.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let PiecePosition { x, y } = self.position;
        self.shape
            .filled_cells()
            .map(move |(dx, dy)| (x + dx, y + dy))
    }

    #[must_use]
    pub fn with_position(&self, position: PiecePosition) -> Self {
        Self { position, ..*self }
    }

    #[must_use]
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        self.with_position(self.position.offset(dx, dy))
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    /// Rotates the current shape 90° clockwise without any collision check.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated(),
            ..*self
        }
    }

    /// Rotates clockwise, resolving collisions with [`KICK_OFFSETS`].
    ///
    /// Returns `None` when the rotated shape collides in place and at every
    /// kick offset.
    #[must_use]
    pub fn kicked_rotation(&self, board: &Board) -> Option<Self> {
        let rotated = self.rotated();
        if !collides(board, Some(&rotated), 0, 0) {
            return Some(rotated);
        }
        KICK_OFFSETS
            .iter()
            .map(|&(dx, dy)| rotated.shifted(dx, dy))
            .find(|kicked| !collides(board, Some(kicked), 0, 0))
    }

    /// Returns where the piece comes to rest if dropped straight down.
    #[must_use]
    pub fn dropped(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while !collides(board, Some(&dropped), 0, 1) {
            dropped = dropped.down();
        }
        dropped
    }
}

/// Top-left corner of a piece's shape matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    pub const SPAWN: Self = Self::new(3, -1);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rectangular 0/1 matrix of a piece.
///
/// Stored in a fixed 4×4 array with explicit dimensions so the type stays
/// `Copy`. Cells outside `width × height` are always empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    width: usize,
    height: usize,
    cells: [[bool; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
}

impl PieceShape {
    /// A shape with no cells. Such a piece collides everywhere.
    pub const EMPTY: Self = Self {
        width: 0,
        height: 0,
        cells: [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
    };

    /// Builds a shape from rows of `0`/`1` values.
    ///
    /// # Panics
    ///
    /// Panics if the rows are ragged or larger than 4×4.
    #[must_use]
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        assert!(height <= MAX_SHAPE_SIDE && width <= MAX_SHAPE_SIDE);
        let mut cells = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), width, "ragged shape row {y}");
            for (x, &cell) in row.iter().enumerate() {
                cells[y][x] = cell != 0;
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y][x]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled_cells().next().is_none()
    }

    /// Offsets `(dx, dy)` of filled cells, row by row.
    #[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn filled_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .filter(move |&x| self.cells[y][x])
                .map(move |x| (x as i32, y as i32))
        })
    }

    /// Rotates the matrix 90° clockwise: transpose, then reverse each row.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let mut cells = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (y, row) in cells.iter_mut().enumerate().take(self.width) {
            for (x, cell) in row.iter_mut().enumerate().take(self.height) {
                *cell = self.cells[self.height - 1 - x][y];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cells,
        }
    }
}

impl std::fmt::Debug for PieceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| if self.cells[y][x] { '#' } else { '.' })
                    .collect()
            })
            .collect();
        f.debug_tuple("PieceShape").field(&rows.join("/")).finish()
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Canonical spawn-orientation shape.
    #[must_use]
    pub fn shape(self) -> PieceShape {
        match self {
            PieceKind::I => PieceShape::from_rows(&[&[1, 1, 1, 1]]),
            PieceKind::O => PieceShape::from_rows(&[&[1, 1], &[1, 1]]),
            PieceKind::T => PieceShape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            PieceKind::S => PieceShape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            PieceKind::Z => PieceShape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            PieceKind::J => PieceShape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            PieceKind::L => PieceShape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        }
    }

    /// Fixed display color of the piece.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            PieceKind::I => "#00f0f0",
            PieceKind::O => "#f0f000",
            PieceKind::T => "#a000f0",
            PieceKind::S => "#00f000",
            PieceKind::Z => "#f00000",
            PieceKind::J => "#0000f0",
            PieceKind::L => "#f0a000",
        }
    }

    /// Number of distinct orientations, accounting for rotational symmetry.
    #[must_use]
    pub const fn distinct_rotations(self) -> usize {
        match self {
            PieceKind::O => 1,
            PieceKind::I | PieceKind::S | PieceKind::Z => 2,
            PieceKind::T | PieceKind::J | PieceKind::L => 4,
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}
