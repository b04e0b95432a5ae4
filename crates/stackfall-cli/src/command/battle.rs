use std::path::PathBuf;

use anyhow::Context as _;
use rand::Rng as _;
use stackfall_ai::{AutoPlayer, Difficulty};
use stackfall_engine::{Battle, PieceSeed, Side};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BattleArg {
    /// AI speed of the left player
    #[arg(long, default_value = "hard")]
    left: Difficulty,
    /// AI speed of the right player
    #[arg(long, default_value = "normal")]
    right: Difficulty,
    /// Piece seed shared by both players (random when omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Session configuration file (JSON); its mode is ignored
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop the battle after this much play time
    #[arg(long, default_value_t = 300)]
    max_seconds: u64,
}

pub(crate) fn run(arg: &BattleArg) -> anyhow::Result<()> {
    let config = util::load_session_config(arg.config.as_deref())?;
    config.validate().context("Invalid session configuration")?;
    let seed = arg
        .seed
        .or(config.seed)
        .unwrap_or_else(|| rand::rng().random());
    log::info!("battle {} vs {} with seed {seed}", arg.left, arg.right);

    let mut battle = Battle::with_seed(seed);
    let mut left = AutoPlayer::new(arg.left);
    let mut right = AutoPlayer::new(arg.right);
    let frame = config.frame_duration();
    let max_ticks = arg.max_seconds.saturating_mul(u64::from(config.fps));

    for _ in 0..max_ticks {
        left.update(battle.session_mut(Side::Left), frame);
        right.update(battle.session_mut(Side::Right), frame);
        battle.update(frame);
        if battle.is_finished() {
            break;
        }
    }

    for side in [Side::Left, Side::Right] {
        let session = battle.session(side);
        let stats = session.stats();
        println!(
            "{:<5} {:<6}  score {:>7}  lines {:>4}  pieces {:>4}  time {}",
            side.to_string(),
            match side {
                Side::Left => arg.left,
                Side::Right => arg.right,
            }
            .to_string(),
            stats.score(),
            stats.lines_cleared(),
            stats.completed_pieces(),
            util::format_duration(session.elapsed()),
        );
    }
    match battle.winner() {
        Some(side) => println!("Winner: {side}"),
        None if battle.is_finished() => println!("Draw"),
        None => println!("Time limit reached"),
    }
    Ok(())
}
