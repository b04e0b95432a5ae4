use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::mode::{GameMode, MetricKind};

/// How long an action label stays visible.
pub const ACTION_LABEL_LIFETIME: Duration = Duration::from_secs(3);

/// Notifications for the presentation layer, drained with
/// [`GameSession::take_events`](super::GameSession::take_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Score, level or line count changed.
    StatsChanged { score: u64, level: u32, lines: u32 },
    /// A transient label such as `"TETRIS!"`.
    ActionLabel(String),
    /// Attack lines left after cancellation, sent toward the opponent.
    GarbageSent(u32),
    /// The session reached a terminal state. Emitted exactly once.
    GameEnded(GameResult),
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum GameOutcome {
    /// The line target was reached.
    Completed,
    /// The sprint clock ran out.
    TimeUp,
    /// A new piece collided at its spawn position.
    Blockout,
    /// A piece locked with a cell in the buffer rows.
    Lockout,
    /// The driver stopped the session before it finished on its own.
    Aborted,
}

impl GameOutcome {
    /// Whether the session ended because the stack topped out.
    #[must_use]
    pub const fn is_top_out(self) -> bool {
        matches!(self, Self::Blockout | Self::Lockout)
    }
}

/// The value a finished session is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Metric {
    Score(u64),
    Lines(u32),
    /// Elapsed play time in milliseconds.
    TimeMillis(u64),
}

impl Metric {
    #[must_use]
    pub const fn kind(self) -> MetricKind {
        match self {
            Metric::Score(_) => MetricKind::Score,
            Metric::Lines(_) => MetricKind::Lines,
            Metric::TimeMillis(_) => MetricKind::Time,
        }
    }

    /// Value used for ranking; larger is better for score and lines,
    /// smaller is better for time.
    #[must_use]
    pub const fn value(self) -> u64 {
        match self {
            Metric::Score(v) | Metric::TimeMillis(v) => v,
            Metric::Lines(v) => v as u64,
        }
    }
}

/// Final result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub mode: GameMode,
    pub outcome: GameOutcome,
    pub score: u64,
    pub lines: u32,
    pub elapsed: Duration,
    pub metric: Metric,
}

impl GameResult {
    #[must_use]
    pub fn new(
        mode: GameMode,
        outcome: GameOutcome,
        score: u64,
        lines: u32,
        elapsed: Duration,
    ) -> Self {
        let metric = match mode.metric_kind() {
            MetricKind::Score => Metric::Score(score),
            MetricKind::Lines => Metric::Lines(lines),
            MetricKind::Time => {
                Metric::TimeMillis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            }
        };
        Self {
            mode,
            outcome,
            score,
            lines,
            elapsed,
            metric,
        }
    }

    /// Whether the result may enter a leaderboard.
    ///
    /// Practice sessions never rank, and a time-ranked session only ranks
    /// once it completed its line target.
    #[must_use]
    pub fn is_rankable(&self) -> bool {
        if !self.mode.is_ranked() {
            return false;
        }
        match self.metric.kind() {
            MetricKind::Time => self.outcome.is_completed(),
            MetricKind::Score | MetricKind::Lines => true,
        }
    }
}

/// A label on display together with its remaining lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActionLabel {
    pub(crate) text: String,
    pub(crate) remaining: Duration,
}

impl ActionLabel {
    pub(crate) fn new(text: String) -> Self {
        Self {
            text,
            remaining: ACTION_LABEL_LIFETIME,
        }
    }

    /// Advances the lifetime; returns `false` once the label has expired.
    pub(crate) fn tick(&mut self, delta: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(delta);
        !self.remaining.is_zero()
    }
}
