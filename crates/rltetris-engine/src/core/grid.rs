use super::{locked_cells::LockedCells, piece::Color};

/// Number of columns in the playfield.
pub const GRID_WIDTH: usize = 10;
/// Number of rows in the playfield.
pub const GRID_HEIGHT: usize = 20;

/// [`GRID_WIDTH`] as a signed column bound.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) const WIDTH: i32 = GRID_WIDTH as i32;
/// Index of the lowest playfield row.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) const BOTTOM_ROW: i32 = GRID_HEIGHT as i32 - 1;

/// `(column, row)` in grid coordinates.
///
/// Rows grow downward and may be negative above the visible playfield.
pub type Position = (i32, i32);

/// A single grid cell; `None` is empty.
pub type Cell = Option<Color>;

/// 10×20 playfield view of cell colors.
///
/// The grid never holds authoritative state: it is rebuilt from the
/// [`LockedCells`] map every step, with the active piece painted on top by
/// the engine.
///
/// # Example
///
/// ```
/// use rltetris_engine::{Color, Grid, LockedCells};
///
/// let mut locked = LockedCells::new();
/// locked.insert((3, 19), Color::new(255, 0, 0));
///
/// let grid = Grid::from_locked(&locked);
/// assert_eq!(grid.get(3, 19), Some(Some(Color::new(255, 0, 0))));
/// assert!(grid.is_empty_at(4, 19));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: [[Cell; GRID_WIDTH]; GRID_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const EMPTY: Self = Self {
        rows: [[None; GRID_WIDTH]; GRID_HEIGHT],
    };

    /// Builds an empty grid and overwrites every cell present in `locked`.
    ///
    /// Keys outside the playfield are ignored.
    #[must_use]
    pub fn from_locked(locked: &LockedCells) -> Self {
        let mut grid = Self::EMPTY;
        for ((x, y), color) in locked.iter() {
            grid.paint(x, y, color);
        }
        grid
    }

    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let col = usize::try_from(x).ok().filter(|&x| x < GRID_WIDTH)?;
        let row = usize::try_from(y).ok().filter(|&y| y < GRID_HEIGHT)?;
        Some((col, row))
    }

    /// Returns the cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        Self::index(x, y).map(|(col, row)| self.rows[row][col])
    }

    /// Returns `true` if `(x, y)` is inside the playfield and empty.
    #[must_use]
    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Colors the cell at `(x, y)`. Returns `false` when out of bounds.
    pub fn paint(&mut self, x: i32, y: i32, color: Color) -> bool {
        match Self::index(x, y) {
            Some((col, row)) => {
                self.rows[row][col] = Some(color);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &[Cell; GRID_WIDTH] {
        &self.rows[y]
    }

    /// A row is full when it contains no empty cell. Rows outside the
    /// playfield are never full.
    #[must_use]
    pub fn is_row_full(&self, y: i32) -> bool {
        usize::try_from(y)
            .ok()
            .and_then(|y| self.rows.get(y))
            .is_some_and(|row| row.iter().all(Option::is_some))
    }
}
