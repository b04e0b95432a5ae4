use std::{collections::VecDeque, mem, time::Duration};

use rand::Rng as _;

use crate::core::FullRows;

use super::{
    GameStats,
    config::{ConfigError, SessionConfig},
    event::{ActionLabel, GameEvent, GameOutcome, GameResult},
    game_field::GameField,
    mode::GameMode,
    piece_bag::PieceSeed,
    snapshot::Snapshot,
};

/// Number of `update` calls a line clear stays on screen before the rows
/// are removed.
pub const LINE_CLEAR_TICKS: u32 = 12;

/// Maximum number of practice undo entries.
pub const UNDO_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    LineClearing,
    Paused,
    GameOver,
}

/// Player input, dispatched with [`GameSession::apply_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    TogglePause,
    Undo,
}

#[derive(Debug, Clone)]
struct PendingClear {
    rows: FullRows,
    t_spin: bool,
    ticks_left: u32,
}

#[derive(Debug, Clone)]
struct SavedState {
    field: GameField,
    stats: GameStats,
}

/// One player's game: field, statistics, timers and state machine.
///
/// Time only advances through [`update`](Self::update); one call is one
/// tick. Every gameplay method is a silent no-op returning `false` when the
/// action is not allowed in the current state.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use stackfall_engine::{Command, GameMode, GameSession, PieceSeed};
///
/// let seed = PieceSeed::from_bytes([1; 16]);
/// let mut session = GameSession::with_seed(GameMode::Normal, seed);
///
/// assert!(session.apply_command(Command::MoveLeft));
/// session.update(Duration::from_millis(16));
/// assert!(session.apply_command(Command::HardDrop));
/// assert_eq!(session.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    mode: GameMode,
    field: GameField,
    stats: GameStats,
    state: SessionState,
    elapsed: Duration,
    drop_timer: Duration,
    pending_clear: Option<PendingClear>,
    history: VecDeque<SavedState>,
    action_label: Option<ActionLabel>,
    events: Vec<GameEvent>,
    outgoing_garbage: u32,
    result: Option<GameResult>,
    result_taken: bool,
}

/// Gravity interval for `level`: one second at level 1, 100 ms faster per
/// level, never below 100 ms.
#[must_use]
pub fn gravity_interval(level: u32) -> Duration {
    let steps = u64::from(level.saturating_sub(1));
    Duration::from_millis(100 + 900_u64.saturating_sub(steps * 100))
}

impl GameSession {
    /// Starts a session with a random seed.
    #[must_use]
    pub fn new(mode: GameMode) -> Self {
        Self::with_seed(mode, rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(mode: GameMode, seed: PieceSeed) -> Self {
        Self::with_field(mode, GameField::with_seed(seed))
    }

    /// Starts a session on a prepared field. A piece is spawned unless the
    /// field already has one.
    #[must_use]
    pub fn with_field(mode: GameMode, field: GameField) -> Self {
        let mut session = Self {
            mode,
            field,
            stats: GameStats::new(),
            state: SessionState::Playing,
            elapsed: Duration::ZERO,
            drop_timer: Duration::ZERO,
            pending_clear: None,
            history: VecDeque::with_capacity(UNDO_LIMIT),
            action_label: None,
            events: Vec::new(),
            outgoing_garbage: 0,
            result: None,
            result_taken: false,
        };
        if session.field.current_piece().is_none() {
            session.spawn();
        }
        session
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(match config.seed {
            Some(seed) => Self::with_seed(config.mode, seed),
            None => Self::new(config.mode),
        })
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.state
    }

    /// Play time so far, line clears included. Frozen while paused or ended.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of pieces spawned so far. Changes exactly when a new piece
    /// becomes current.
    #[must_use]
    pub fn spawned_pieces(&self) -> u64 {
        self.field.spawned_pieces()
    }

    /// Text of the action label on display, if any.
    #[must_use]
    pub fn action_label(&self) -> Option<&str> {
        self.action_label.as_ref().map(|label| label.text.as_str())
    }

    /// Entries available to [`undo`](Self::undo).
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(self)
    }

    /// Drains the queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Drains attack lines waiting to be delivered to the opponent.
    pub fn take_outgoing_garbage(&mut self) -> u32 {
        mem::take(&mut self.outgoing_garbage)
    }

    /// Queues attack lines. They appear on the board at the next spawn.
    pub fn receive_garbage(&mut self, count: u32) {
        if self.state.is_game_over() || count == 0 {
            return;
        }
        log::debug!("{} received {count} garbage rows", self.mode);
        self.field.receive_garbage(count);
    }

    /// The final result once the session has ended.
    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Returns the final result the first time it is called after the
    /// session ended, `None` afterwards.
    pub fn take_result(&mut self) -> Option<GameResult> {
        if self.result_taken {
            return None;
        }
        let result = self.result.clone()?;
        self.result_taken = true;
        Some(result)
    }

    /// Advances the session by one tick of length `delta`.
    pub fn update(&mut self, delta: Duration) {
        if self.state.is_game_over() {
            return;
        }
        if let Some(label) = &mut self.action_label
            && !label.tick(delta)
        {
            self.action_label = None;
        }

        if self.state.is_paused() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(delta);
        if let Some(limit) = self.mode.time_limit()
            && self.elapsed >= limit
        {
            self.elapsed = limit;
            self.end(GameOutcome::TimeUp);
            return;
        }

        match self.state {
            SessionState::LineClearing => self.tick_line_clear(),
            SessionState::Playing => {
                self.drop_timer = self.drop_timer.saturating_add(delta);
                if self.drop_timer >= gravity_interval(self.stats.level()) {
                    self.drop_timer = Duration::ZERO;
                    self.gravity_step();
                }
            }
            SessionState::Paused | SessionState::GameOver => {}
        }
    }

    pub fn apply_command(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::Rotate => self.rotate(),
            Command::SoftDrop => self.soft_drop(),
            Command::HardDrop => self.hard_drop(),
            Command::TogglePause => self.toggle_pause(),
            Command::Undo => self.undo(),
        }
    }

    fn can_control(&self) -> bool {
        self.state.is_playing() && self.field.current_piece().is_some()
    }

    pub fn move_left(&mut self) -> bool {
        self.can_control() && self.field.try_shift(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.can_control() && self.field.try_shift(1, 0)
    }

    pub fn rotate(&mut self) -> bool {
        self.can_control() && self.field.try_rotate()
    }

    /// Moves one row down. A blocked soft drop locks the piece, except in
    /// practice mode where it does nothing.
    pub fn soft_drop(&mut self) -> bool {
        if !self.can_control() {
            return false;
        }
        if self.field.try_shift(0, 1) {
            return true;
        }
        if self.mode.is_practice() {
            return false;
        }
        self.lock_piece();
        true
    }

    pub fn hard_drop(&mut self) -> bool {
        if !self.can_control() {
            return false;
        }
        self.field.drop_to_bottom();
        self.lock_piece();
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state = match self.state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::LineClearing | SessionState::GameOver => return false,
        };
        true
    }

    /// Restores the field and statistics saved at the most recent spawn.
    ///
    /// Only available in practice mode while playing.
    pub fn undo(&mut self) -> bool {
        if !self.mode.is_practice() || !self.state.is_playing() {
            return false;
        }
        let Some(saved) = self.history.pop_back() else {
            return false;
        };
        self.field = saved.field;
        self.stats = saved.stats;
        self.drop_timer = Duration::ZERO;
        self.push_stats_event();
        true
    }

    /// Ends the session on behalf of its driver.
    pub fn abort(&mut self) {
        self.end(GameOutcome::Aborted);
    }

    /// Moves the piece one row down. A blocked piece locks, except in
    /// practice mode where only a hard drop locks.
    fn gravity_step(&mut self) {
        if self.field.current_piece().is_none() || self.field.try_shift(0, 1) {
            return;
        }
        if !self.mode.is_practice() {
            self.lock_piece();
        }
    }

    fn lock_piece(&mut self) {
        let Some(summary) = self.field.lock_current() else {
            return;
        };
        self.stats.record_lock();
        self.drop_timer = Duration::ZERO;
        log::debug!(
            "locked {:?} at {:?} (t-spin: {}, rows: {})",
            summary.piece.kind(),
            summary.piece.position(),
            summary.t_spin,
            summary.full_rows.len(),
        );
        if summary.lockout {
            self.end(GameOutcome::Lockout);
            return;
        }
        if summary.full_rows.is_empty() {
            self.stats.break_combo();
            self.spawn();
            return;
        }
        self.pending_clear = Some(PendingClear {
            rows: summary.full_rows,
            t_spin: summary.t_spin,
            ticks_left: LINE_CLEAR_TICKS,
        });
        self.state = SessionState::LineClearing;
    }

    fn tick_line_clear(&mut self) {
        let Some(pending) = &mut self.pending_clear else {
            self.state = SessionState::Playing;
            return;
        };
        pending.ticks_left = pending.ticks_left.saturating_sub(1);
        if pending.ticks_left > 0 {
            return;
        }
        if let Some(pending) = self.pending_clear.take() {
            self.finish_line_clear(&pending);
        }
    }

    fn finish_line_clear(&mut self, pending: &PendingClear) {
        self.field.clear_rows(&pending.rows);
        let report = self.stats.apply_clear(pending.rows.len(), pending.t_spin);
        log::debug!(
            "cleared {} rows for {} points (garbage {}, combo {})",
            report.rows,
            report.score,
            report.garbage,
            report.combo,
        );

        if let Some(text) = report.label() {
            self.events.push(GameEvent::ActionLabel(text.clone()));
            self.action_label = Some(ActionLabel::new(text));
        }
        if self.mode.is_battle() && report.garbage > 0 {
            let sent = self.field.offset_garbage(report.garbage);
            if sent > 0 {
                self.outgoing_garbage += sent;
                self.events.push(GameEvent::GarbageSent(sent));
            }
        }
        self.push_stats_event();

        if let Some(target) = self.mode.target_lines()
            && self.stats.lines_cleared() >= target
        {
            self.end(GameOutcome::Completed);
            return;
        }
        self.state = SessionState::Playing;
        self.spawn();
    }

    fn spawn(&mut self) {
        if self.field.spawn_next().is_err() {
            self.end(GameOutcome::Blockout);
            return;
        }
        self.drop_timer = Duration::ZERO;
        if self.mode.is_practice() {
            if self.history.len() == UNDO_LIMIT {
                self.history.pop_front();
            }
            self.history.push_back(SavedState {
                field: self.field.clone(),
                stats: self.stats.clone(),
            });
        }
    }

    fn push_stats_event(&mut self) {
        self.events.push(GameEvent::StatsChanged {
            score: self.stats.score(),
            level: self.stats.level(),
            lines: self.stats.lines_cleared(),
        });
    }

    fn end(&mut self, outcome: GameOutcome) {
        if self.state.is_game_over() {
            return;
        }
        self.state = SessionState::GameOver;
        self.pending_clear = None;
        self.history.clear();
        let result = GameResult::new(
            self.mode,
            outcome,
            self.stats.score(),
            self.stats.lines_cleared(),
            self.elapsed,
        );
        log::info!(
            "{} session ended: {:?}, score {}, lines {}, {:.1}s",
            self.mode,
            outcome,
            result.score,
            result.lines,
            result.elapsed.as_secs_f64(),
        );
        self.events.push(GameEvent::GameEnded(result.clone()));
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use crate::{Block, Board, LineTarget, Piece, PieceKind, PiecePosition};

    use super::*;

    const TICK: Duration = Duration::from_millis(16);

    fn seed() -> PieceSeed {
        PieceSeed::from_bytes([0x42; 16])
    }

    fn tetris_ready_field() -> GameField {
        let board = Board::from_ascii(
            r"
            #########.
            #########.
            #########.
            #########.
            ",
        );
        let mut field = GameField::with_seed(seed()).with_board(board);
        let vertical_i = Piece::new(PieceKind::I)
            .rotated()
            .with_position(PiecePosition::new(9, 0));
        field.set_current_piece(vertical_i).unwrap();
        field
    }

    fn run_ticks(session: &mut GameSession, ticks: u32) {
        for _ in 0..ticks {
            session.update(TICK);
        }
    }

    #[test]
    fn test_new_session_is_playing() {
        let session = GameSession::with_seed(GameMode::Normal, seed());
        assert!(session.session_state().is_playing());
        assert_eq!(session.spawned_pieces(), 1);
        let piece = session.field().current_piece().unwrap();
        assert_eq!(piece.position(), PiecePosition::SPAWN);
    }

    #[test]
    fn test_paused_session_ignores_input_and_time() {
        let mut session = GameSession::with_seed(GameMode::Normal, seed());
        assert!(session.apply_command(Command::TogglePause));
        assert!(session.session_state().is_paused());
        assert!(!session.move_left());
        assert!(!session.rotate());
        assert!(!session.hard_drop());
        session.update(Duration::from_secs(5));
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert_eq!(
            session.field().current_piece().unwrap().position(),
            PiecePosition::SPAWN
        );

        assert!(session.apply_command(Command::TogglePause));
        assert!(session.move_left());
    }

    #[test]
    fn test_gravity_follows_level_interval() {
        assert_eq!(gravity_interval(1), Duration::from_millis(1000));
        assert_eq!(gravity_interval(5), Duration::from_millis(600));
        assert_eq!(gravity_interval(10), Duration::from_millis(100));
        assert_eq!(gravity_interval(25), Duration::from_millis(100));

        let mut session = GameSession::with_seed(GameMode::Normal, seed());
        session.update(Duration::from_millis(999));
        assert_eq!(session.field().current_piece().unwrap().position().y(), -1);
        session.update(Duration::from_millis(1));
        assert_eq!(session.field().current_piece().unwrap().position().y(), 0);
        assert_eq!(session.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_hard_drop_locks_and_spawns() {
        let mut session = GameSession::with_seed(GameMode::Normal, seed());
        let next = session.field().next_piece();
        assert!(session.hard_drop());
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.spawned_pieces(), 2);
        assert_eq!(session.field().current_piece().unwrap().kind(), next);
        assert_eq!(session.stats().combo_count(), 0);
    }

    #[test]
    fn test_line_clear_waits_twelve_ticks() {
        let mut session = GameSession::with_field(GameMode::Normal, tetris_ready_field());
        assert!(session.hard_drop());
        assert!(session.session_state().is_line_clearing());
        assert!(!session.move_left());
        assert!(!session.toggle_pause());

        run_ticks(&mut session, LINE_CLEAR_TICKS - 1);
        assert!(session.session_state().is_line_clearing());
        assert_eq!(session.stats().lines_cleared(), 0);

        run_ticks(&mut session, 1);
        assert!(session.session_state().is_playing());
        assert_eq!(session.stats().lines_cleared(), 4);
        assert_eq!(session.stats().score(), 3200);
        assert_eq!(session.action_label(), Some("TETRIS!"));
        assert!(session.field().board().rows().flatten().all(|b| b.is_empty()));
        assert!(session.field().current_piece().is_some());

        let events = session.take_events();
        assert!(events.contains(&GameEvent::ActionLabel("TETRIS!".to_owned())));
        assert!(events.contains(&GameEvent::StatsChanged {
            score: 3200,
            level: 1,
            lines: 4,
        }));
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_action_label_expires_after_three_seconds() {
        let mut session = GameSession::with_field(GameMode::Normal, tetris_ready_field());
        session.hard_drop();
        run_ticks(&mut session, LINE_CLEAR_TICKS);
        assert!(session.action_label().is_some());
        session.apply_command(Command::TogglePause);
        session.update(Duration::from_secs(3));
        assert_eq!(session.action_label(), None);
    }

    #[test]
    fn test_practice_soft_drop_never_locks() {
        let resting = Piece::new(PieceKind::O).with_position(PiecePosition::new(0, 18));

        let mut field = GameField::with_seed(seed());
        field.set_current_piece(resting).unwrap();
        let mut practice = GameSession::with_field(GameMode::Practice, field.clone());
        assert!(!practice.soft_drop());
        assert_eq!(practice.field().current_piece(), Some(&resting));
        assert_eq!(practice.stats().completed_pieces(), 0);

        let mut normal = GameSession::with_field(GameMode::Normal, field);
        assert!(normal.soft_drop());
        assert_eq!(normal.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_practice_gravity_never_locks() {
        let resting = Piece::new(PieceKind::O).with_position(PiecePosition::new(0, 18));
        let mut field = GameField::with_seed(seed());
        field.set_current_piece(resting).unwrap();

        let mut session = GameSession::with_field(GameMode::Practice, field);
        for _ in 0..3 {
            session.update(Duration::from_millis(1000));
        }
        assert!(session.session_state().is_playing());
        assert_eq!(session.field().current_piece(), Some(&resting));
        assert_eq!(session.stats().completed_pieces(), 0);

        assert!(session.hard_drop());
        assert_eq!(session.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_elapsed_runs_through_line_clear() {
        let mut session =
            GameSession::with_field(GameMode::Lines(LineTarget::L10), tetris_ready_field());
        assert!(session.hard_drop());
        run_ticks(&mut session, LINE_CLEAR_TICKS);
        assert!(session.session_state().is_playing());
        assert_eq!(session.elapsed(), TICK * LINE_CLEAR_TICKS);
    }

    #[test]
    fn test_sprint_time_runs_out_during_line_clear() {
        let mut session = GameSession::with_field(GameMode::Sprint, tetris_ready_field());
        session.elapsed = Duration::from_secs(60) - TICK;
        assert!(session.hard_drop());
        assert!(session.session_state().is_line_clearing());
        session.update(TICK);
        assert_eq!(session.result().unwrap().outcome, GameOutcome::TimeUp);
        assert_eq!(session.elapsed(), Duration::from_secs(60));
    }

    #[test]
    fn test_huge_delta_saturates() {
        let mut session = GameSession::with_seed(GameMode::Normal, seed());
        session.update(Duration::MAX);
        session.update(Duration::MAX);
        assert_eq!(session.elapsed(), Duration::MAX);
    }

    fn t_slot_board() -> Board {
        Board::from_ascii(
            r"
            ########..
            #########.
            ",
        )
    }

    #[test]
    fn test_kicked_t_spin_scores_doubled() {
        let mut field = GameField::with_seed(seed()).with_board(t_slot_board());
        let upside_down_t = Piece::new(PieceKind::T)
            .rotated()
            .rotated()
            .with_position(PiecePosition::new(7, 17));
        field.set_current_piece(upside_down_t).unwrap();

        let mut session = GameSession::with_field(GameMode::Normal, field);
        assert!(session.rotate());
        assert_eq!(
            session.field().current_piece().unwrap().position(),
            PiecePosition::new(8, 17)
        );
        assert!(session.field().last_move_was_rotation());

        assert!(session.hard_drop());
        run_ticks(&mut session, LINE_CLEAR_TICKS);
        assert_eq!(session.stats().lines_cleared(), 2);
        assert_eq!(session.stats().t_spins(), 1);
        assert_eq!(session.stats().score(), 1600);
        assert_eq!(session.action_label(), Some("T-SPIN DOUBLE!"));
    }

    #[test]
    fn test_shift_after_rotation_is_not_t_spin() {
        let mut field = GameField::with_seed(seed()).with_board(t_slot_board());
        let upside_down_t = Piece::new(PieceKind::T)
            .rotated()
            .rotated()
            .with_position(PiecePosition::new(7, 16));
        field.set_current_piece(upside_down_t).unwrap();

        let mut session = GameSession::with_field(GameMode::Normal, field);
        assert!(session.rotate());
        assert!(session.field().last_move_was_rotation());
        assert!(session.move_right());
        assert!(!session.field().last_move_was_rotation());

        assert!(session.hard_drop());
        run_ticks(&mut session, LINE_CLEAR_TICKS);
        assert_eq!(session.stats().lines_cleared(), 2);
        assert_eq!(session.stats().t_spins(), 0);
        assert_eq!(session.stats().score(), 200);
        assert_eq!(session.action_label(), None);
    }

    #[test]
    fn test_lockout_ends_session_once() {
        let board = Board::from_ascii(&"...##.....\n".repeat(20));
        let mut field = GameField::with_seed(seed()).with_board(board);
        field
            .set_current_piece(Piece::new(PieceKind::O).with_position(PiecePosition::new(3, -2)))
            .unwrap();
        let mut session = GameSession::with_field(GameMode::Normal, field);
        assert!(session.hard_drop());
        assert!(session.session_state().is_game_over());
        assert_eq!(session.field().board().cell(3, 0), Some(Block::Piece(PieceKind::O)));

        let result = session.take_result().unwrap();
        assert_eq!(result.outcome, GameOutcome::Lockout);
        assert!(session.take_result().is_none());
        assert!(session.result().is_some());

        session.abort();
        session.update(TICK);
        assert!(!session.hard_drop());
        assert!(!session.toggle_pause());
        let ended = session
            .take_events()
            .into_iter()
            .filter(|event| matches!(event, GameEvent::GameEnded(_)))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_blockout_on_spawn() {
        let mut board = Board::new();
        for y in 1..3 {
            for x in 3..7 {
                board.set_cell(x, y, Block::Garbage);
            }
        }
        let mut field = GameField::with_seed(seed()).with_board(board);
        field
            .set_current_piece(Piece::new(PieceKind::O).with_position(PiecePosition::new(0, 18)))
            .unwrap();
        let mut session = GameSession::with_field(GameMode::Normal, field);
        assert!(session.hard_drop());
        assert_eq!(session.result().unwrap().outcome, GameOutcome::Blockout);
        assert!(session.field().current_piece().is_none());
    }

    #[test]
    fn test_sprint_ends_on_time_limit() {
        let mut session = GameSession::with_seed(GameMode::Sprint, seed());
        session.update(Duration::from_secs(59));
        assert!(session.session_state().is_playing());
        session.update(Duration::from_secs(2));
        let result = session.result().unwrap();
        assert_eq!(result.outcome, GameOutcome::TimeUp);
        assert_eq!(result.elapsed, Duration::from_secs(60));
    }

    #[test]
    fn test_line_target_completes_session() {
        let mut session = GameSession::with_seed(GameMode::Lines(LineTarget::L10), seed());
        for round in 0..3 {
            assert!(!session.session_state().is_game_over(), "round {round}");
            session.field = tetris_ready_field();
            session.hard_drop();
            run_ticks(&mut session, LINE_CLEAR_TICKS);
        }
        let result = session.result().unwrap();
        assert_eq!(result.outcome, GameOutcome::Completed);
        assert_eq!(result.lines, 12);
    }

    #[test]
    fn test_undo_restores_spawn_snapshots() {
        let mut session = GameSession::with_seed(GameMode::Practice, seed());
        let first = *session.field().current_piece().unwrap();
        assert_eq!(session.undo_depth(), 1);

        session.move_left();
        session.hard_drop();
        assert_eq!(session.undo_depth(), 2);
        let board_after_lock = session.field().board().clone();

        // The first undo puts the current piece back at its spawn point.
        session.move_right();
        assert!(session.apply_command(Command::Undo));
        assert_eq!(session.field().board(), &board_after_lock);
        assert_eq!(
            session.field().current_piece().unwrap().position(),
            PiecePosition::SPAWN
        );

        assert!(session.undo());
        assert_eq!(session.field().board(), &Board::new());
        assert_eq!(session.field().current_piece(), Some(&first));
        assert_eq!(session.stats().completed_pieces(), 0);
        assert!(!session.undo());

        let mut normal = GameSession::with_seed(GameMode::Normal, seed());
        normal.hard_drop();
        assert!(!normal.undo());
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut session = GameSession::with_seed(GameMode::Practice, seed());
        for _ in 0..30 {
            session.spawn();
        }
        assert_eq!(session.undo_depth(), UNDO_LIMIT);
        assert_eq!(session.spawned_pieces(), 31);
    }

    #[test]
    fn test_battle_attack_cancels_pending_garbage() {
        let mut field = tetris_ready_field();
        field.receive_garbage(5);
        let mut session = GameSession::with_field(GameMode::Battle, field);
        session.hard_drop();
        run_ticks(&mut session, LINE_CLEAR_TICKS);
        assert_eq!(session.take_outgoing_garbage(), 0);
        // The remaining line was inserted on the next spawn.
        assert_eq!(session.field().pending_garbage(), 0);
        assert!(
            session.field().board().visible_rows().last().unwrap()[1..]
                .iter()
                .any(|b| *b == Block::Garbage)
        );

        let mut session = GameSession::with_field(GameMode::Battle, tetris_ready_field());
        session.hard_drop();
        run_ticks(&mut session, LINE_CLEAR_TICKS);
        assert!(session.take_events().contains(&GameEvent::GarbageSent(4)));
        assert_eq!(session.take_outgoing_garbage(), 4);
        assert_eq!(session.take_outgoing_garbage(), 0);
    }

    #[test]
    fn test_garbage_is_kept_outside_battle() {
        let mut session = GameSession::with_field(GameMode::Normal, tetris_ready_field());
        session.hard_drop();
        run_ticks(&mut session, LINE_CLEAR_TICKS);
        assert_eq!(session.take_outgoing_garbage(), 0);
    }

    #[test]
    fn test_from_config_validates() {
        let config = SessionConfig {
            fps: 0,
            ..SessionConfig::default()
        };
        assert!(GameSession::from_config(&config).is_err());

        let config = SessionConfig {
            mode: GameMode::Sprint,
            seed: Some(seed()),
            ..SessionConfig::default()
        };
        let session = GameSession::from_config(&config).unwrap();
        assert_eq!(session.mode(), GameMode::Sprint);
    }
}
