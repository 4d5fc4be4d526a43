use clap::{Parser, Subcommand};

use self::{simulate::SimulateArg, train::TrainArg};

mod simulate;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the engine headless with a random agent and report the games
    Simulate(#[clap(flatten)] SimulateArg),
    /// Run training episodes of the placeholder agent
    Train(#[clap(flatten)] TrainArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Simulate(SimulateArg::default())) {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
    }
    Ok(())
}
