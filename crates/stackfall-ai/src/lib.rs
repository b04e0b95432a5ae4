//! Heuristic placement search that plays a [`stackfall_engine::GameSession`].
//!
//! - [`BoardAnalysis`] - Cached surface features of a board
//! - [`WeightSet`] - Coefficients of the linear evaluation
//! - [`find_best_move`] - Exhaustive search over rotations and columns
//! - [`AutoPlayer`] - Replays the planned moves through session commands

use std::time::Duration;

pub use self::{auto_player::*, board_analysis::*, planner::*, weights::*};

mod auto_player;
mod board_analysis;
mod planner;
mod weights;

/// How fast an [`AutoPlayer`] issues its moves.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr, derive_more::Display)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    #[default]
    Max,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Normal, Self::Hard, Self::Max];

    /// Delay between two consecutive moves.
    #[must_use]
    pub const fn move_interval(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(400),
            Difficulty::Normal => Duration::from_millis(200),
            Difficulty::Hard => Duration::from_millis(100),
            Difficulty::Max => Duration::from_millis(50),
        }
    }
}
