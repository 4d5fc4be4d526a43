use std::fmt;

use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::grid::Position;

/// RGB color of a settled or falling block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Enum representing the type of piece.
///
/// Discriminants double as template indices, so the order here is the order
/// used by one-hot encodings and random selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// Z-piece.
    Z = 0,
    /// S-piece.
    S = 1,
    /// I-piece.
    I = 2,
    /// O-piece.
    O = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in template order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::Z,
        PieceKind::S,
        PieceKind::I,
        PieceKind::O,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    #[must_use]
    pub const fn color(self) -> Color {
        PIECE_COLORS[self.index()]
    }

    /// Returns the spawn shape of this kind.
    #[must_use]
    pub const fn template(self) -> Shape {
        PIECE_TEMPLATES[self.index()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use rltetris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::Z => 'Z',
            PieceKind::S => 'S',
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use rltetris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('J'), Some(PieceKind::J));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'Z' => Some(PieceKind::Z),
            'S' => Some(PieceKind::S),
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Rectangular matrix of cell markers, `0` meaning empty.
///
/// A shape is a value: rotating produces a new shape and leaves the original
/// untouched. Storage is a fixed 4×4 array; only the top-left `rows × cols`
/// region is meaningful and everything outside it stays zero, so derived
/// equality compares shapes exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [[u8; Shape::MAX_SIZE]; Shape::MAX_SIZE],
}

impl Shape {
    /// Largest row or column count of any tetromino matrix.
    pub const MAX_SIZE: usize = 4;

    #[expect(clippy::cast_possible_truncation)]
    const fn from_rows<const R: usize, const C: usize>(rows: [[u8; C]; R]) -> Self {
        assert!(R <= Self::MAX_SIZE && C <= Self::MAX_SIZE);
        let mut cells = [[0; Self::MAX_SIZE]; Self::MAX_SIZE];
        let mut r = 0;
        while r < R {
            let mut c = 0;
            while c < C {
                cells[r][c] = rows[r][c];
                c += 1;
            }
            r += 1;
        }
        Self {
            rows: R as u8,
            cols: C as u8,
            cells,
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        usize::from(self.cols)
    }

    /// Returns the markers of one row, trimmed to the shape width.
    #[must_use]
    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[row][..self.cols()]
    }

    /// Returns the 90° clockwise rotation.
    ///
    /// An `R×C` shape becomes `C×R` with `out[i][j] = in[R-1-j][i]`.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let rows = self.rows();
        let mut cells = [[0; Self::MAX_SIZE]; Self::MAX_SIZE];
        for (i, out_row) in cells.iter_mut().enumerate().take(self.cols()) {
            for (j, out) in out_row.iter_mut().enumerate().take(rows) {
                *out = self.cells[rows - 1 - j][i];
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Returns `(row, col)` of every non-empty marker in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols)
                .filter(move |&col| self.cells[usize::from(row)][usize::from(col)] != 0)
                .map(move |col| (row, col))
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            if row > 0 {
                f.write_str("/")?;
            }
            for marker in self.row(row) {
                write!(f, "{marker}")?;
            }
        }
        Ok(())
    }
}

/// A falling tetromino: a kind, its current shape and the top-left anchor.
///
/// Movement and rotation return new `Piece` values; the engine validates a
/// candidate before replacing its active piece with it.
///
/// # Example
///
/// ```
/// use rltetris_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::J);
/// assert_eq!((piece.x(), piece.y()), (4, 1));
///
/// let rotated = piece.with_shape(piece.rotate());
/// assert_eq!(rotated.shape().rows(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: Shape,
    x: i32,
    y: i32,
}

impl Piece {
    pub const SPAWN_X: i32 = 4;

    /// Creates a piece in spawn position: `x = 4`, `y = template rows - 1`.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        let shape = kind.template();
        Self {
            kind,
            shape,
            x: Self::SPAWN_X,
            y: i32::from(shape.rows) - 1,
        }
    }

    /// Creates a spawn-positioned piece of a uniformly random kind.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random())
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.kind.color()
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Returns the shape this piece would have after one clockwise turn.
    ///
    /// The O-piece is a fixed point.
    #[must_use]
    pub fn rotate(&self) -> Shape {
        if self.kind == PieceKind::O {
            return self.shape;
        }
        self.shape.rotated_clockwise()
    }

    #[must_use]
    pub fn with_shape(self, shape: Shape) -> Self {
        Self { shape, ..self }
    }

    #[must_use]
    pub fn with_position(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    #[must_use]
    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        self.with_position(self.x + dx, self.y + dy)
    }

    /// Expands the shape into absolute grid coordinates.
    ///
    /// Each occupied marker at `(row, col)` maps to
    /// `(x + col, y + row - rows)` where `rows` is the current shape's row
    /// count. The offset follows the current shape even after a rotation has
    /// changed its height.
    #[must_use]
    pub fn cell_coordinates(&self) -> ArrayVec<Position, 4> {
        let offset = i32::from(self.shape.rows);
        self.shape
            .occupied_cells()
            .map(|(row, col)| (self.x + i32::from(col), self.y + i32::from(row) - offset))
            .collect()
    }
}

const PIECE_COLORS: [Color; PieceKind::LEN] = [
    Color::new(255, 255, 106),
    Color::new(255, 255, 0),
    Color::new(147, 88, 254),
    Color::new(54, 175, 144),
    Color::new(255, 0, 0),
    Color::new(102, 217, 238),
    Color::new(254, 151, 32),
];

const PIECE_TEMPLATES: [Shape; PieceKind::LEN] = [
    // Z-piece
    Shape::from_rows([[1, 1, 0], [0, 1, 1]]),
    // S-piece
    Shape::from_rows([[0, 2, 2], [2, 2, 0]]),
    // I-piece
    Shape::from_rows([[3], [3], [3], [3]]),
    // O-piece
    Shape::from_rows([[4, 4], [4, 4]]),
    // J-piece
    Shape::from_rows([[5, 0, 0], [5, 5, 5]]),
    // L-piece
    Shape::from_rows([[0, 0, 6], [6, 6, 6]]),
    // T-piece
    Shape::from_rows([[0, 7, 0], [7, 7, 7]]),
];
