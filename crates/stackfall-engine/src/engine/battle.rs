use std::time::Duration;

use super::{game_session::GameSession, mode::GameMode, piece_bag::PieceSeed};

/// One of the two players of a [`Battle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Side {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

impl Side {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Two battle-mode sessions coupled only by garbage counts.
///
/// After every update the attack lines each side produced are delivered to
/// the other side. The sessions share no other state.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use stackfall_engine::{Battle, PieceSeed};
///
/// let mut battle = Battle::with_seed(PieceSeed::from_bytes([9; 16]));
/// battle.update(Duration::from_millis(16));
/// assert!(!battle.is_finished());
/// assert_eq!(battle.winner(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Battle {
    pub left: GameSession,
    pub right: GameSession,
}

impl Battle {
    /// Starts a battle where both sides draw the same piece sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::from_sessions(
            GameSession::with_seed(GameMode::Battle, seed),
            GameSession::with_seed(GameMode::Battle, seed),
        )
    }

    #[must_use]
    pub fn from_sessions(left: GameSession, right: GameSession) -> Self {
        Self { left, right }
    }

    #[must_use]
    pub fn session(&self, side: Side) -> &GameSession {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn session_mut(&mut self, side: Side) -> &mut GameSession {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Whether at least one side has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.left.session_state().is_game_over() || self.right.session_state().is_game_over()
    }

    /// The surviving side once the other has ended. `None` while both are
    /// alive or when both ended in the same update.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        let left_over = self.left.session_state().is_game_over();
        let right_over = self.right.session_state().is_game_over();
        match (left_over, right_over) {
            (false, true) => Some(Side::Left),
            (true, false) => Some(Side::Right),
            _ => None,
        }
    }

    /// Advances both sessions by one tick and exchanges garbage.
    ///
    /// Does nothing once the battle is finished.
    pub fn update(&mut self, delta: Duration) {
        if self.is_finished() {
            return;
        }
        self.left.update(delta);
        self.right.update(delta);
        self.exchange_garbage();
        if let Some(winner) = self.winner() {
            log::info!("battle won by the {winner} side");
        }
    }

    /// Delivers outgoing garbage from each side to its opponent.
    pub fn exchange_garbage(&mut self) {
        let to_right = self.left.take_outgoing_garbage();
        let to_left = self.right.take_outgoing_garbage();
        self.right.receive_garbage(to_right);
        self.left.receive_garbage(to_left);
    }
}
