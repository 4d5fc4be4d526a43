use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use rltetris_agent::{
    agent::{Agent as _, RandomAgent},
    params::AgentParams,
    rollout::{self, EpisodeSummary},
};
use rltetris_engine::{GameMode, PieceSeed, Tetris};
use serde::Serialize;

use crate::util::save_report;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Hyper-parameter file, one value per line
    #[arg(long, default_value = "variables.rl")]
    params: PathBuf,
    /// Pacing of the automatic drop (player or machine)
    #[arg(long, default_value_t = GameMode::Machine)]
    mode: GameMode,
    /// Wall time fed to every step, in milliseconds
    #[arg(long, default_value_t = 16)]
    elapsed_ms: u64,
    /// Piece seed as 32 hex characters (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Seed for the agent (random if omitted)
    #[arg(long)]
    agent_seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TrainingReport {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    mode: GameMode,
    seed: PieceSeed,
    params: AgentParams,
    best_score: u64,
    mean_reward: f64,
    episodes: Vec<EpisodeSummary>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        params: params_path,
        mode,
        elapsed_ms,
        seed,
        agent_seed,
        output,
    } = arg;

    let started_at = Utc::now();
    let params = AgentParams::from_file(params_path).with_context(|| {
        format!(
            "Failed to load agent parameters: {}",
            params_path.display()
        )
    })?;
    let mut engine = match seed {
        Some(seed) => Tetris::with_seed(*mode, *seed),
        None => Tetris::new(*mode),
    };
    let mut agent = match agent_seed {
        Some(seed) => RandomAgent::with_seed(params, *seed),
        None => RandomAgent::new(params),
    };

    let mut episodes = vec![];
    for episode in 0..params.episodes {
        let summary =
            rollout::run_episode(&mut engine, &mut agent, params.max_steps, *elapsed_ms);
        agent.train();
        if !summary.game_over {
            engine.reset();
        }
        eprintln!(
            "Episode #{episode}: {} steps, score {}, reward {}",
            summary.steps,
            summary.stats.score(),
            summary.total_reward
        );
        episodes.push(summary);
    }

    #[expect(clippy::cast_precision_loss)]
    let mean_reward = if episodes.is_empty() {
        0.0
    } else {
        episodes.iter().map(|e| e.total_reward as f64).sum::<f64>() / episodes.len() as f64
    };
    let report = TrainingReport {
        started_at,
        finished_at: Utc::now(),
        mode: *mode,
        seed: engine.seed(),
        params,
        best_score: episodes.iter().map(|e| e.stats.score()).max().unwrap_or(0),
        mean_reward,
        episodes,
    };
    save_report(&report, output.as_deref())?;

    eprintln!();
    eprintln!("Training finished");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Episodes: {}", report.episodes.len());
    eprintln!("  Best score: {}", report.best_score);
    eprintln!("  Mean reward: {:.3}", report.mean_reward);

    Ok(())
}
