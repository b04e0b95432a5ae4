use std::{collections::VecDeque, time::Duration};

use stackfall_engine::GameSession;

use crate::{
    Difficulty, WeightSet,
    planner::{AiMove, plan_moves},
};

/// Plays a [`GameSession`] through its public commands.
///
/// A plan is computed once per spawned piece and replayed one move per
/// interval. The player does nothing while the session is not playing.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use stackfall_ai::{AutoPlayer, Difficulty};
/// use stackfall_engine::{GameMode, GameSession, PieceSeed};
///
/// let mut session = GameSession::with_seed(GameMode::Normal, PieceSeed::from_bytes([2; 16]));
/// let mut player = AutoPlayer::new(Difficulty::Max);
/// for _ in 0..600 {
///     player.update(&mut session, Duration::from_millis(16));
///     session.update(Duration::from_millis(16));
/// }
/// assert!(session.stats().completed_pieces() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    weights: WeightSet,
    interval: Duration,
    timer: Duration,
    planned_piece: Option<u64>,
    moves: VecDeque<AiMove>,
}

impl AutoPlayer {
    #[must_use]
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_weights(WeightSet::DEFAULT, difficulty.move_interval())
    }

    #[must_use]
    pub fn with_weights(weights: WeightSet, interval: Duration) -> Self {
        Self {
            weights,
            interval,
            timer: Duration::ZERO,
            planned_piece: None,
            moves: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Moves still queued for the current piece.
    pub fn pending_moves(&self) -> impl Iterator<Item = AiMove> + '_ {
        self.moves.iter().copied()
    }

    /// Advances the move timer and issues at most one command.
    pub fn update(&mut self, session: &mut GameSession, delta: Duration) {
        if !session.session_state().is_playing() {
            return;
        }
        let spawned = session.spawned_pieces();
        if self.planned_piece != Some(spawned) {
            self.replan(session);
            self.planned_piece = Some(spawned);
        }

        self.timer = self.timer.saturating_add(delta);
        if self.timer < self.interval {
            return;
        }
        self.timer -= self.interval;
        // Never bank more than one pending step.
        self.timer = self.timer.min(self.interval);

        let mv = self.moves.pop_front().unwrap_or(AiMove::Drop);
        session.apply_command(mv.into());
    }

    fn replan(&mut self, session: &GameSession) {
        self.timer = Duration::ZERO;
        self.moves = match session.field().current_piece() {
            Some(piece) => plan_moves(&self.weights, session.field().board(), piece),
            None => VecDeque::new(),
        };
    }
}
