use rltetris_engine::{GameStats, Tetris};
use serde::Serialize;

use crate::{agent::Agent, memory::Transition, observation::Observation};

/// Result of one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub steps: u32,
    pub total_reward: i64,
    pub max_height: u32,
    pub game_over: bool,
    /// Statistics of the game as it stood when the episode ended.
    pub stats: GameStats,
}

/// Drives `engine` with `agent` until game over or `max_steps` steps.
///
/// Every step is recorded on the agent as a [`Transition`]. When the episode
/// ends in a game over, `stats` holds the statistics from just before the
/// engine reset itself.
pub fn run_episode<A>(
    engine: &mut Tetris,
    agent: &mut A,
    max_steps: u32,
    elapsed_ms: u64,
) -> EpisodeSummary
where
    A: Agent + ?Sized,
{
    let mut state = Observation::from_engine(engine);
    let mut summary = EpisodeSummary {
        steps: 0,
        total_reward: 0,
        max_height: state.height(),
        game_over: false,
        stats: engine.stats().clone(),
    };

    while summary.steps < max_steps {
        let action = agent.observe(&state);
        let outcome = engine.step(action, elapsed_ms);
        let reward = outcome.reward;
        let done = outcome.is_game_over();
        let next_state = Observation::from_outcome(&outcome);

        summary.steps += 1;
        summary.total_reward += i64::from(reward);
        summary.max_height = summary.max_height.max(next_state.height());

        agent.record(Transition {
            state,
            action: Transition::encode_action(action),
            reward,
            next_state: next_state.clone(),
            done,
        });
        state = next_state;

        if done {
            summary.game_over = true;
            break;
        }
        summary.stats = engine.stats().clone();
    }

    log::info!(
        "episode finished after {} steps: score {}, lines {}, reward {}{}",
        summary.steps,
        summary.stats.score(),
        summary.stats.total_cleared_lines(),
        summary.total_reward,
        if summary.game_over { " (game over)" } else { "" }
    );
    summary
}
