use std::path::PathBuf;

use stackfall_engine::GameMode;

use crate::{record::RecordStore, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RecordsArg {
    /// Only show this mode
    #[arg(long)]
    mode: Option<GameMode>,
    /// Only show AI results
    #[arg(long, default_value_t = false)]
    ai: bool,
    /// Record store file
    #[arg(long, default_value = "./data/records.json")]
    records: PathBuf,
}

pub(crate) fn run(arg: &RecordsArg) -> anyhow::Result<()> {
    let store = RecordStore::open(&arg.records)?;
    let boards: Vec<(GameMode, bool)> = store
        .boards()
        .into_iter()
        .filter(|(mode, is_ai)| arg.mode.is_none_or(|m| m == *mode) && (!arg.ai || *is_ai))
        .collect();
    if boards.is_empty() {
        println!("No records in {}", store.path().display());
        return Ok(());
    }
    for (mode, is_ai) in boards {
        let player = if is_ai { "AI" } else { "human" };
        println!("{mode} ({player})");
        for (rank, entry) in store.board(mode, is_ai).enumerate() {
            println!(
                "  {:>2}. {:<14} {}",
                rank + 1,
                util::format_metric(entry.metric),
                entry.date.format("%Y-%m-%d %H:%M:%S"),
            );
        }
    }
    Ok(())
}
