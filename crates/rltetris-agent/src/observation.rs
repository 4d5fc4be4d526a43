use rltetris_engine::{GRID_HEIGHT, GRID_WIDTH, LockedCells, Position, StepOutcome, Tetris};
use serde::Serialize;

/// Number of entries in [`Observation::board`].
pub const OBSERVATION_LEN: usize = GRID_WIDTH * GRID_HEIGHT;

/// Board marker for an empty cell.
pub const EMPTY: u8 = 0;
/// Board marker for a settled block.
pub const LOCKED: u8 = 1;
/// Board marker for a cell of the falling piece.
pub const ACTIVE: u8 = 2;

/// What an agent sees after a step.
///
/// `board` is the visible playfield in row-major order (row 0 first), each
/// entry one of [`EMPTY`], [`LOCKED`] or [`ACTIVE`]. Active cells win over
/// locked ones; cells above the playfield are not represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    board: Vec<u8>,
    height: u32,
    reward: i32,
}

impl Observation {
    #[must_use]
    pub fn from_outcome(outcome: &StepOutcome<'_>) -> Self {
        Self {
            board: encode_board(outcome.locked_cells, &outcome.active_cells),
            height: outcome.height,
            reward: outcome.reward,
        }
    }

    /// Observes an engine between steps, with zero reward.
    #[must_use]
    pub fn from_engine(engine: &Tetris) -> Self {
        let locked = engine.locked_cells();
        Self {
            board: encode_board(locked, &engine.current_piece().cell_coordinates()),
            height: locked.height(),
            reward: 0,
        }
    }

    #[must_use]
    pub fn board(&self) -> &[u8] {
        &self.board
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn reward(&self) -> i32 {
        self.reward
    }

    /// Returns the marker at `(x, y)`, or `None` outside the playfield.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<u8> {
        board_index((x, y)).map(|i| self.board[i])
    }
}

fn board_index((x, y): Position) -> Option<usize> {
    let col = usize::try_from(x).ok().filter(|&x| x < GRID_WIDTH)?;
    let row = usize::try_from(y).ok().filter(|&y| y < GRID_HEIGHT)?;
    Some(row * GRID_WIDTH + col)
}

fn encode_board(locked: &LockedCells, active: &[Position]) -> Vec<u8> {
    let mut board = vec![EMPTY; OBSERVATION_LEN];
    for (pos, _) in locked.iter() {
        if let Some(i) = board_index(pos) {
            board[i] = LOCKED;
        }
    }
    for &pos in active {
        if let Some(i) = board_index(pos) {
            board[i] = ACTIVE;
        }
    }
    board
}
