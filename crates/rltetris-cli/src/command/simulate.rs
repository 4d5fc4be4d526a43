use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use rltetris_agent::{
    agent::{Agent, RandomAgent, ScriptedAgent},
    params::AgentParams,
    rollout::{self, EpisodeSummary},
};
use rltetris_engine::{GameMode, LockedCells, PieceSeed, Tetris};
use serde::Serialize;

use crate::util::save_report;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Pacing of the automatic drop (player or machine)
    #[arg(long, default_value_t = GameMode::Machine)]
    pub(crate) mode: GameMode,
    /// Number of engine steps to run
    #[arg(long, default_value_t = 10_000)]
    pub(crate) steps: u32,
    /// Wall time fed to every step, in milliseconds
    #[arg(long, default_value_t = 16)]
    pub(crate) elapsed_ms: u64,
    /// Piece seed as 32 hex characters (random if omitted)
    #[arg(long)]
    pub(crate) seed: Option<PieceSeed>,
    /// Seed for the random agent (random if omitted)
    #[arg(long)]
    pub(crate) agent_seed: Option<u64>,
    /// Command script replayed instead of the random agent, one of
    /// up/down/left/right per line
    #[arg(long)]
    pub(crate) script: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

impl Default for SimulateArg {
    fn default() -> Self {
        Self {
            mode: GameMode::Machine,
            steps: 10_000,
            elapsed_ms: 16,
            seed: None,
            agent_seed: None,
            script: None,
            output: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct SimulationReport<'a> {
    started_at: DateTime<Utc>,
    mode: GameMode,
    seed: PieceSeed,
    steps: u32,
    elapsed_ms: u64,
    games_played: u64,
    best_score: u64,
    total_reward: i64,
    episodes: Vec<EpisodeSummary>,
    final_locked_cells: &'a LockedCells,
}

fn create_agent(script: Option<&Path>, seed: Option<u64>) -> anyhow::Result<Box<dyn Agent>> {
    if let Some(path) = script {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read command script: {}", path.display()))?;
        let agent = ScriptedAgent::from_script(&text);
        log::info!(
            "replaying {} scripted commands from {}",
            agent.commands().len(),
            path.display()
        );
        return Ok(Box::new(agent));
    }
    let params = AgentParams::default();
    Ok(match seed {
        Some(seed) => Box::new(RandomAgent::with_seed(params, seed)),
        None => Box::new(RandomAgent::new(params)),
    })
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        mode,
        steps,
        elapsed_ms,
        seed,
        agent_seed,
        script,
        output,
    } = arg;

    let started_at = Utc::now();
    let mut engine = match seed {
        Some(seed) => Tetris::with_seed(*mode, *seed),
        None => Tetris::new(*mode),
    };
    let mut agent = create_agent(script.as_deref(), *agent_seed)?;
    log::info!(
        "simulating {steps} steps in {mode} mode (seed {})",
        engine.seed()
    );

    let mut remaining = *steps;
    let mut episodes = vec![];
    while remaining > 0 {
        let summary = rollout::run_episode(&mut engine, agent.as_mut(), remaining, *elapsed_ms);
        remaining -= summary.steps;
        episodes.push(summary);
    }

    let report = SimulationReport {
        started_at,
        mode: *mode,
        seed: engine.seed(),
        steps: *steps,
        elapsed_ms: *elapsed_ms,
        games_played: engine.games_played(),
        best_score: episodes.iter().map(|e| e.stats.score()).max().unwrap_or(0),
        total_reward: episodes.iter().map(|e| e.total_reward).sum(),
        final_locked_cells: engine.locked_cells(),
        episodes,
    };

    eprintln!(
        "Simulated {} steps: {} games over, best score {}",
        report.steps, report.games_played, report.best_score
    );
    save_report(&report, output.as_deref())?;

    Ok(())
}
