use clap::{ArgAction, Parser, Subcommand};

use self::{battle::BattleArg, play::PlayArg, records::RecordsArg};

mod battle;
mod play;
mod records;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let the AI play a headless session and record the result
    Play(#[clap(flatten)] PlayArg),
    /// Run an AI-vs-AI garbage battle
    Battle(#[clap(flatten)] BattleArg),
    /// List stored records
    Records(#[clap(flatten)] RecordsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    crate::logger::init(args.verbose)?;
    match args.mode {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Battle(arg) => battle::run(&arg)?,
        Mode::Records(arg) => records::run(&arg)?,
    }
    Ok(())
}
