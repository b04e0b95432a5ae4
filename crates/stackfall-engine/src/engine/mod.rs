//! Game rules, timing and session state.
//!
//! This module builds the playable game on top of the data structures in
//! [`core`](crate::core):
//!
//! - [`GameField`] - Board, current piece, 7-bag source and pending garbage
//! - [`GameSession`] - State machine, gravity, line-clear delay, undo, events
//! - [`GameStats`] - Score, level, combo and back-to-back tracking
//! - [`GameMode`] - Rules variant (normal, sprint, line targets, practice, battle)
//! - [`Battle`] - Two sessions coupled by garbage counts
//! - [`Snapshot`] - Read-only view for presentation layers
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`]; the first piece spawns immediately
//! 2. Drive it with [`Command`]s and advance time with [`GameSession::update`]
//! 3. A locked piece that completes rows enters the line-clear delay, then
//!    the rows are scored and removed
//! 4. The next piece spawns, materialising any pending garbage first
//! 5. Repeat until the mode completes or the stack tops out
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use stackfall_engine::{GameEvent, GameMode, GameSession, PieceSeed};
//!
//! let mut session = GameSession::with_seed(GameMode::Normal, PieceSeed::from_bytes([5; 16]));
//! while !session.session_state().is_game_over() {
//!     session.hard_drop();
//!     session.update(Duration::from_millis(16));
//! }
//!
//! let events = session.take_events();
//! assert!(matches!(events.last(), Some(GameEvent::GameEnded(_))));
//! assert!(session.take_result().unwrap().outcome.is_top_out());
//! ```

pub use self::{
    battle::*, config::*, event::*, game_field::*, game_session::*, game_stats::*, mode::*,
    piece_bag::*, snapshot::*,
};

mod battle;
mod config;
mod event;
mod game_field;
mod game_session;
mod game_stats;
mod mode;
mod piece_bag;
mod snapshot;
