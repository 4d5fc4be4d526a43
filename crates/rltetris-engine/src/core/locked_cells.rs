use std::collections::HashMap;

use serde::{Serialize, Serializer};

use super::{
    grid::{BOTTOM_ROW, Position, WIDTH},
    piece::Color,
};

/// Settled blocks keyed by `(column, row)`.
///
/// This map is the single source of truth for the static part of the board;
/// the [`Grid`](super::grid::Grid) is derived from it. Every key has its
/// column inside the playfield. Rows above the playfield (negative) only
/// appear between a lock and the game-over check that follows it.
///
/// # Example
///
/// ```
/// use rltetris_engine::{Color, LockedCells};
///
/// let mut locked = LockedCells::new();
/// locked.insert((0, 19), Color::new(255, 0, 0));
/// locked.insert((0, 17), Color::new(255, 0, 0));
///
/// assert_eq!(locked.height(), 2);
/// assert!(!locked.reaches_top());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedCells {
    cells: HashMap<Position, Color>,
}

impl FromIterator<(Position, Color)> for LockedCells {
    fn from_iter<T: IntoIterator<Item = (Position, Color)>>(iter: T) -> Self {
        let mut locked = Self::new();
        for (pos, color) in iter {
            locked.insert(pos, color);
        }
        locked
    }
}

impl LockedCells {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Color> {
        self.cells.get(&pos).copied()
    }

    #[cfg(test)]
    fn contains(&self, pos: Position) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Settles a block, returning the color previously stored at `pos`.
    pub fn insert(&mut self, pos: Position, color: Color) -> Option<Color> {
        debug_assert!(
            (0..WIDTH).contains(&pos.0),
            "locked column out of range: {pos:?}"
        );
        self.cells.insert(pos, color)
    }

    #[cfg(test)]
    fn remove(&mut self, pos: Position) -> Option<Color> {
        self.cells.remove(&pos)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Iterates all settled blocks in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Color)> + '_ {
        self.cells.iter().map(|(&pos, &color)| (pos, color))
    }

    /// Removes every block on row `y`; missing cells are skipped.
    ///
    /// Returns the number of blocks removed.
    pub fn remove_row(&mut self, y: i32) -> usize {
        (0..WIDTH)
            .filter(|&x| self.cells.remove(&(x, y)).is_some())
            .count()
    }

    /// Moves every block whose row is strictly less than `boundary` down by
    /// `rows`.
    ///
    /// Blocks are re-keyed from the lowest row upward so that a moved block
    /// never lands on one that is still waiting to move. A block that lands
    /// on a key at or below `boundary` replaces it.
    pub fn shift_down_above(&mut self, boundary: i32, rows: i32) {
        let mut keys = self
            .cells
            .keys()
            .copied()
            .filter(|&(_, y)| y < boundary)
            .collect::<Vec<_>>();
        keys.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        for (x, y) in keys {
            if let Some(color) = self.cells.remove(&(x, y)) {
                self.cells.insert((x, y + rows), color);
            }
        }
    }

    /// Returns the smallest row index of any settled block.
    #[must_use]
    pub fn top_row(&self) -> Option<i32> {
        self.cells.keys().map(|&(_, y)| y).min()
    }

    /// Distance from the bottom row to the highest settled block.
    ///
    /// A stack whose top block sits on row 19 has height 0, as does an
    /// empty board.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.top_row()
            .map_or(0, |y| u32::try_from(BOTTOM_ROW - y).unwrap_or(0))
    }

    /// Returns `true` if any block occupies row 0 or above it.
    #[must_use]
    pub fn reaches_top(&self) -> bool {
        self.cells.keys().any(|&(_, y)| y < 1)
    }
}

#[derive(Serialize)]
struct LockedCellEntry {
    x: i32,
    y: i32,
    color: Color,
}

impl Serialize for LockedCells {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Sorted top-to-bottom, left-to-right so output is stable.
        let mut entries = self
            .iter()
            .map(|((x, y), color)| LockedCellEntry { x, y, color })
            .collect::<Vec<_>>();
        entries.sort_unstable_by_key(|e| (e.y, e.x));
        serializer.collect_seq(entries)
    }
}
