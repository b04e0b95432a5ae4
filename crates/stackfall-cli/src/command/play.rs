use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use rand::Rng as _;
use stackfall_ai::{AutoPlayer, Difficulty};
use stackfall_engine::{GameEvent, GameMode, GameResult, GameSession, PieceSeed, SessionConfig};

use crate::{
    record::{RecordEntry, RecordStore},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Game mode: normal, sprint, lines-10/20/40/100, practice, battle
    #[arg(long)]
    mode: Option<GameMode>,
    /// Piece seed as 32 hex digits (random when omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Session configuration file (JSON); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop the session after this much play time
    #[arg(long, default_value_t = 300)]
    max_seconds: u64,
    /// AI speed: easy, normal, hard or max
    #[arg(long, default_value = "max")]
    difficulty: Difficulty,
    /// Record store file
    #[arg(long, default_value = "./data/records.json")]
    records: PathBuf,
    /// Do not write the result to the record store
    #[arg(long, default_value_t = false)]
    no_save: bool,
    /// Print the final board
    #[arg(long, default_value_t = false)]
    show_board: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let config = resolve_config(arg)?;
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("playing {} with seed {seed}", config.mode);

    let mut session = GameSession::with_seed(config.mode, seed);
    let mut player = AutoPlayer::new(arg.difficulty);
    let frame = config.frame_duration();
    let max_ticks = arg.max_seconds.saturating_mul(u64::from(config.fps));

    for _ in 0..max_ticks {
        player.update(&mut session, frame);
        session.update(frame);
        log_events(&mut session);
        if session.session_state().is_game_over() {
            break;
        }
    }
    session.abort();
    log_events(&mut session);

    let result = session
        .take_result()
        .context("session ended without a result")?;
    print_result(&result, &session);
    if arg.show_board {
        print!("{}", session.snapshot());
    }

    if arg.no_save {
        return Ok(());
    }
    if !result.is_rankable() {
        println!("Result not eligible for the {} leaderboard", result.mode);
        return Ok(());
    }
    let mut store = RecordStore::open(&arg.records)?;
    let rank = store.insert(RecordEntry::from_result(&result, true, Utc::now()));
    store.save()?;
    match rank {
        Some(rank) => println!("Rank #{} on the {} AI board", rank + 1, result.mode),
        None => println!("Not in the {} AI top ten", result.mode),
    }
    Ok(())
}

fn resolve_config(arg: &PlayArg) -> anyhow::Result<SessionConfig> {
    let mut config = util::load_session_config(arg.config.as_deref())?;
    if let Some(mode) = arg.mode {
        config.mode = mode;
    }
    if let Some(seed) = arg.seed {
        config.seed = Some(seed);
    }
    config.validate().context("Invalid session configuration")?;
    Ok(config)
}

fn log_events(session: &mut GameSession) {
    for event in session.take_events() {
        match event {
            GameEvent::ActionLabel(text) => log::info!("{text}"),
            GameEvent::StatsChanged {
                score,
                level,
                lines,
            } => log::debug!("score {score}, level {level}, lines {lines}"),
            GameEvent::GarbageSent(count) => log::debug!("sent {count} garbage rows"),
            GameEvent::GameEnded(result) => log::info!("game over: {:?}", result.outcome),
        }
    }
}

fn print_result(result: &GameResult, session: &GameSession) {
    let stats = session.stats();
    println!("Mode:     {}", result.mode);
    println!("Outcome:  {:?}", result.outcome);
    println!("Score:    {}", result.score);
    println!("Lines:    {}", result.lines);
    println!("Level:    {}", stats.level());
    println!("Pieces:   {}", stats.completed_pieces());
    println!("T-spins:  {}", stats.t_spins());
    println!("Time:     {}", util::format_duration(result.elapsed));
    println!("Metric:   {}", util::format_metric(result.metric));
}
