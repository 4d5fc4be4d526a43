//! Agent-side plumbing for driving the engine from a learning loop.
//!
//! No learning algorithm lives here. The crate fixes the seams one would plug
//! into: what the agent sees, how experience is stored and how an episode is
//! run.
//!
//! # Architecture
//!
//! ```text
//! Tetris::step (rltetris-engine)
//!     ↓ StepOutcome
//! Observation (200-cell occupancy board, height, reward)
//!     ↓ observed by
//! Agent (chooses Option<Direction>)
//!     ↓ recorded as
//! Transition → ReplayMemory
//!     ↓ sampled by
//! Agent::train
//! ```
//!
//! - [`observation`] - Encoding of a step outcome for an agent
//! - [`memory`] - Bounded replay memory of transitions
//! - [`params`] - Hyper-parameters and their line-oriented file format
//! - [`agent`] - The [`agent::Agent`] trait and a uniform random baseline
//! - [`rollout`] - Episode driver tying engine and agent together
//!
//! # Example
//!
//! ```
//! use rltetris_agent::{agent::RandomAgent, params::AgentParams, rollout};
//! use rltetris_engine::{GameMode, PieceSeed, Tetris};
//!
//! let mut engine = Tetris::with_seed(GameMode::Machine, PieceSeed::from_bytes([3; 16]));
//! let mut agent = RandomAgent::with_seed(AgentParams::default(), 42);
//!
//! let summary = rollout::run_episode(&mut engine, &mut agent, 200, 16);
//! assert!(summary.steps > 0 && summary.steps <= 200);
//! assert_eq!(agent.memory().len(), summary.steps as usize);
//! ```

pub mod agent;
pub mod memory;
pub mod observation;
pub mod params;
pub mod rollout;
