use std::fmt;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use rltetris_engine::Direction;

use crate::{
    memory::{BATCH_SIZE, ReplayMemory, Transition},
    observation::Observation,
    params::AgentParams,
};

/// A policy that picks commands and learns from recorded experience.
pub trait Agent: fmt::Debug {
    /// Chooses the command for the next step; `None` leaves the piece alone.
    fn observe(&mut self, observation: &Observation) -> Option<Direction>;

    /// Stores one step of experience.
    fn record(&mut self, transition: Transition);

    /// Runs one training pass over the recorded experience.
    fn train(&mut self);
}

/// Baseline agent choosing uniformly among the four directions and no
/// command.
///
/// It keeps a replay memory so that rollouts exercise the full record and
/// train cycle, but its policy never changes.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    params: AgentParams,
    rng: Pcg32,
    memory: ReplayMemory,
    train_passes: u64,
}

impl RandomAgent {
    #[must_use]
    pub fn new(params: AgentParams) -> Self {
        Self::from_rng(params, Pcg32::from_rng(&mut rand::rng()))
    }

    #[must_use]
    pub fn with_seed(params: AgentParams, seed: u64) -> Self {
        Self::from_rng(params, Pcg32::seed_from_u64(seed))
    }

    fn from_rng(params: AgentParams, rng: Pcg32) -> Self {
        Self {
            params,
            rng,
            memory: ReplayMemory::new(),
            train_passes: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    #[must_use]
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    #[must_use]
    pub fn train_passes(&self) -> u64 {
        self.train_passes
    }
}

impl Agent for RandomAgent {
    fn observe(&mut self, _observation: &Observation) -> Option<Direction> {
        let slot = self.rng.random_range(0..=Direction::ALL.len());
        Direction::ALL.get(slot).copied()
    }

    fn record(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    fn train(&mut self) {
        let batch = self.memory.sample(BATCH_SIZE, &mut self.rng);
        let reward = batch.iter().map(|t| i64::from(t.reward)).sum::<i64>();
        self.train_passes += 1;
        log::debug!(
            "train pass {}: sampled {} of {} transitions (batch reward {reward})",
            self.train_passes,
            batch.len(),
            self.memory.len()
        );
    }
}

/// Agent replaying a text command script, one command per line.
///
/// Lines are decoded with [`Direction::parse_command`], so blank or
/// unrecognized lines idle for a step. The script restarts from the top once
/// it runs out; an empty script never issues a command.
///
/// ```
/// use rltetris_agent::{agent::{Agent as _, ScriptedAgent}, observation::Observation};
/// use rltetris_engine::{Direction, GameMode, Tetris};
///
/// let mut agent = ScriptedAgent::from_script("left\n\nup");
/// let observation = Observation::from_engine(&Tetris::new(GameMode::Player));
/// assert_eq!(agent.observe(&observation), Some(Direction::Left));
/// assert_eq!(agent.observe(&observation), None);
/// assert_eq!(agent.observe(&observation), Some(Direction::Up));
/// assert_eq!(agent.observe(&observation), Some(Direction::Left));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    commands: Vec<Option<Direction>>,
    cursor: usize,
    memory: ReplayMemory,
}

impl ScriptedAgent {
    #[must_use]
    pub fn new(commands: Vec<Option<Direction>>) -> Self {
        Self {
            commands,
            cursor: 0,
            memory: ReplayMemory::new(),
        }
    }

    #[must_use]
    pub fn from_script(script: &str) -> Self {
        Self::new(script.lines().map(Direction::parse_command).collect())
    }

    #[must_use]
    pub fn commands(&self) -> &[Option<Direction>] {
        &self.commands
    }

    #[must_use]
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }
}

impl Agent for ScriptedAgent {
    fn observe(&mut self, _observation: &Observation) -> Option<Direction> {
        let command = self.commands.get(self.cursor).copied().flatten();
        self.cursor += 1;
        if self.cursor >= self.commands.len() {
            self.cursor = 0;
        }
        command
    }

    fn record(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    fn train(&mut self) {}
}
