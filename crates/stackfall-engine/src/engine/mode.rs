use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Length of the sprint mode.
pub const SPRINT_DURATION: Duration = Duration::from_secs(60);

/// Rules variant of a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GameMode {
    /// Endless play, ranked by score.
    #[default]
    Normal,
    /// 60-second sprint, ranked by lines cleared.
    Sprint,
    /// Clear a fixed number of lines as fast as possible.
    Lines(LineTarget),
    /// Undo enabled; a blocked soft drop or gravity step does not lock.
    Practice,
    /// One side of a two-board garbage battle.
    Battle,
}

/// Line count that completes a [`GameMode::Lines`] session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTarget {
    L10,
    L20,
    L40,
    L100,
}

/// How finished sessions of a mode are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Score,
    Lines,
    Time,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseModeError {
    #[display("unknown game mode: {_0:?}")]
    UnknownMode(#[error(not(source))] String),
    #[display("unsupported line target: {_0} (expected 10, 20, 40 or 100)")]
    InvalidLineTarget(#[error(not(source))] u32),
}

impl LineTarget {
    pub const ALL: [Self; 4] = [Self::L10, Self::L20, Self::L40, Self::L100];

    #[must_use]
    pub const fn lines(self) -> u32 {
        match self {
            LineTarget::L10 => 10,
            LineTarget::L20 => 20,
            LineTarget::L40 => 40,
            LineTarget::L100 => 100,
        }
    }
}

impl TryFrom<u32> for LineTarget {
    type Error = ParseModeError;

    fn try_from(lines: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|target| target.lines() == lines)
            .ok_or(ParseModeError::InvalidLineTarget(lines))
    }
}

impl GameMode {
    #[must_use]
    pub const fn metric_kind(self) -> MetricKind {
        match self {
            GameMode::Normal | GameMode::Practice | GameMode::Battle => MetricKind::Score,
            GameMode::Sprint => MetricKind::Lines,
            GameMode::Lines(_) => MetricKind::Time,
        }
    }

    /// Line count that ends the session in success, if any.
    #[must_use]
    pub const fn target_lines(self) -> Option<u32> {
        match self {
            GameMode::Lines(target) => Some(target.lines()),
            _ => None,
        }
    }

    /// Play time that ends the session, if any.
    #[must_use]
    pub const fn time_limit(self) -> Option<Duration> {
        match self {
            GameMode::Sprint => Some(SPRINT_DURATION),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_practice(self) -> bool {
        matches!(self, GameMode::Practice)
    }

    #[must_use]
    pub const fn is_battle(self) -> bool {
        matches!(self, GameMode::Battle)
    }

    /// Whether results of this mode belong in the record store.
    #[must_use]
    pub const fn is_ranked(self) -> bool {
        !self.is_practice()
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Normal => f.write_str("normal"),
            GameMode::Sprint => f.write_str("sprint"),
            GameMode::Lines(target) => write!(f, "lines-{}", target.lines()),
            GameMode::Practice => f.write_str("practice"),
            GameMode::Battle => f.write_str("battle"),
        }
    }
}

impl FromStr for GameMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s {
            "normal" => GameMode::Normal,
            "sprint" => GameMode::Sprint,
            "practice" => GameMode::Practice,
            "battle" => GameMode::Battle,
            _ => {
                let lines = s
                    .strip_prefix("lines-")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| ParseModeError::UnknownMode(s.to_owned()))?;
                GameMode::Lines(LineTarget::try_from(lines)?)
            }
        };
        Ok(mode)
    }
}

impl TryFrom<String> for GameMode {
    type Error = ParseModeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GameMode> for String {
    fn from(mode: GameMode) -> Self {
        mode.to_string()
    }
}
