use std::collections::VecDeque;

use rand::{
    Rng,
    distr::{Distribution as _, Uniform},
};
use rltetris_engine::Direction;

use crate::observation::Observation;

/// Default number of transitions kept before the oldest are evicted.
pub const MAX_MEMORY: usize = 100_000;
/// Default number of transitions drawn per training batch.
pub const BATCH_SIZE: usize = 1000;

/// Action vector recorded for a step without a command.
pub const NO_ACTION: [u8; 4] = [0; 4];

/// One step of experience.
///
/// The action is stored in the one-hot layout of
/// [`Direction::from_one_hot`], with [`NO_ACTION`] for an idle step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: Observation,
    pub action: [u8; 4],
    pub reward: i32,
    pub next_state: Observation,
    pub done: bool,
}

impl Transition {
    /// Encodes the command an agent issued into an action vector.
    #[must_use]
    pub fn encode_action(command: Option<Direction>) -> [u8; 4] {
        command.map_or(NO_ACTION, Direction::to_one_hot)
    }

    /// The command this transition's action vector decodes to.
    #[must_use]
    pub fn command(&self) -> Option<Direction> {
        Direction::from_one_hot(&self.action)
    }
}

/// Bounded FIFO of transitions.
///
/// # Example
///
/// ```
/// use rltetris_agent::memory::ReplayMemory;
///
/// let memory = ReplayMemory::with_capacity(8);
/// assert!(memory.is_empty());
/// assert!(memory.sample(4, &mut rand::rng()).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    capacity: usize,
    transitions: VecDeque<Transition>,
}

impl Default for ReplayMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayMemory {
    /// Creates a memory holding up to [`MAX_MEMORY`] transitions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_MEMORY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Appends a transition, evicting the oldest one when full.
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// Iterates transitions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    /// Draws `batch_size` transitions uniformly with replacement.
    ///
    /// Returns an empty batch when the memory is empty.
    pub fn sample<R>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition>
    where
        R: Rng + ?Sized,
    {
        let Ok(indices) = Uniform::new(0, self.transitions.len()) else {
            return vec![];
        };
        indices
            .sample_iter(rng)
            .take(batch_size)
            .map(|i| &self.transitions[i])
            .collect()
    }
}
