//! Game rules and per-step orchestration.
//!
//! - [`Tetris`] - The board engine: validity, movement, automatic drop,
//!   locking, line clears and game over
//! - [`Direction`] - Movement commands and their one-hot encoding
//! - [`GameMode`] - Player or machine pacing of the drop timer
//! - [`GameStats`] - Score, level and fall speed bookkeeping
//! - [`PieceGenerator`] - Uniform random piece source
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`Tetris`] in the desired [`GameMode`]
//! 2. Call [`Tetris::step`] once per tick with the command (if any) and the
//!    elapsed milliseconds
//! 3. Read the reward, stack height, active cells and locked cells from the
//!    returned [`StepOutcome`]
//! 4. On game over the step reports a negative reward and the engine has
//!    already reset itself; keep stepping
//!
//! # Example
//!
//! ```
//! use rltetris_engine::{Direction, GameMode, PieceSeed, Tetris};
//!
//! let seed = PieceSeed::from_bytes([1; 16]);
//! let mut game = Tetris::with_seed(GameMode::Machine, seed);
//!
//! let action = [0, 0, 0, 1];
//! for _ in 0..20 {
//!     let outcome = game.step(Direction::from_one_hot(&action), 16);
//!     if outcome.is_game_over() {
//!         println!("Game over!");
//!     }
//! }
//! assert!(game.stats().completed_pieces() > 0);
//! ```

pub use self::{command::*, game_stats::*, mode::*, piece_generator::*, tetris::*};

mod command;
mod game_stats;
mod mode;
mod piece_generator;
mod tetris;
