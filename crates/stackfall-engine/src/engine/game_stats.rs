use serde::{Deserialize, Serialize};

/// Base points per number of rows cleared at once, before the level factor.
const BASE_SCORES: [u64; 5] = [0, 25, 100, 400, 1600];

/// Points per row of a T-spin clear, before the level factor.
const T_SPIN_ROW_SCORE: u64 = 400;

/// Extra points per level for a back-to-back Tetris.
const BACK_TO_BACK_TETRIS_BONUS: u64 = 800;

/// Lines needed per level step.
const LINES_PER_LEVEL: u32 = 10;

/// Score, level and streak counters of a session.
///
/// - **Score**: points from line clears
/// - **Level**: `lines / 10 + 1`
/// - **Combo**: consecutive locks that cleared at least one row
/// - **Back-to-back**: consecutive "difficult" clears (Tetris or T-spin)
///
/// # Example
///
/// ```
/// use stackfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// let report = stats.apply_clear(4, false);
///
/// assert_eq!(report.score, 3200);
/// assert_eq!(report.garbage, 4);
/// assert!(stats.is_back_to_back());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    level: u32,
    lines_cleared: u32,
    combo_count: u32,
    is_back_to_back: bool,
    completed_pieces: u32,
    line_cleared_counter: [u32; 5],
    t_spins: u32,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one executed line clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearReport {
    /// Rows removed.
    pub rows: usize,
    /// Whether the lock was a T-spin.
    pub t_spin: bool,
    /// Points added to the score.
    pub score: u64,
    /// Attack lines produced, before cancellation against pending garbage.
    pub garbage: u32,
    /// Whether this clear continued a back-to-back streak.
    pub back_to_back: bool,
    /// Combo count after this clear.
    pub combo: u32,
}

impl ClearReport {
    /// Human-readable label such as `"T-SPIN DOUBLE!"` or `"TETRIS! 2 REN!"`.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.back_to_back {
            parts.push("BACK-TO-BACK".to_owned());
        }
        if self.t_spin && self.rows > 0 {
            let name = match self.rows {
                1 => "SINGLE",
                2 => "DOUBLE",
                _ => "TRIPLE",
            };
            parts.push(format!("T-SPIN {name}!"));
        } else if self.rows == 4 {
            parts.push("TETRIS!".to_owned());
        }
        if self.combo >= 2 {
            parts.push(format!("{} REN!", self.combo - 1));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

impl GameStats {
    /// Creates a tracker at level 1 with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines_cleared: 0,
            combo_count: 0,
            is_back_to_back: false,
            completed_pieces: 0,
            line_cleared_counter: [0; 5],
            t_spins: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    #[must_use]
    pub const fn combo_count(&self) -> u32 {
        self.combo_count
    }

    #[must_use]
    pub const fn is_back_to_back(&self) -> bool {
        self.is_back_to_back
    }

    /// Total number of pieces locked into the board.
    #[must_use]
    pub const fn completed_pieces(&self) -> u32 {
        self.completed_pieces
    }

    /// Histogram of locks by rows cleared (`[0]` counts clear-less locks).
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[u32; 5] {
        &self.line_cleared_counter
    }

    /// Number of T-spins that cleared at least one row.
    #[must_use]
    pub const fn t_spins(&self) -> u32 {
        self.t_spins
    }

    /// Counts a locked piece.
    pub fn record_lock(&mut self) {
        self.completed_pieces += 1;
    }

    /// A lock that cleared nothing ends the combo. Back-to-back survives.
    pub fn break_combo(&mut self) {
        self.combo_count = 0;
        self.line_cleared_counter[0] += 1;
    }

    /// Applies the scoring rules for `rows` cleared at once.
    ///
    /// Points use the level in effect *before* the clear; the level is
    /// recomputed from the new line total afterwards.
    pub fn apply_clear(&mut self, rows: usize, t_spin: bool) -> ClearReport {
        let level = u64::from(self.level);
        let t_spin_clear = t_spin && rows > 0;
        let difficult = rows == 4 || t_spin_clear;
        let back_to_back = difficult && self.is_back_to_back;
        if difficult {
            self.is_back_to_back = true;
        } else if rows > 0 {
            self.is_back_to_back = false;
        }

        let rows_u32 = u32::try_from(rows).unwrap_or(u32::MAX);
        let btb_bonus = u32::from(back_to_back);
        let (score, mut garbage) = if t_spin_clear {
            (
                u64::from(rows_u32) * T_SPIN_ROW_SCORE * (level + 1),
                rows_u32 * 2 + btb_bonus,
            )
        } else if rows == 4 {
            let bonus = if back_to_back {
                BACK_TO_BACK_TETRIS_BONUS * level
            } else {
                0
            };
            (BASE_SCORES[4] * (level + 1) + bonus, 4 + btb_bonus)
        } else {
            let base = BASE_SCORES.get(rows).copied().unwrap_or(0);
            (base * (level + 1), rows_u32.saturating_sub(1))
        };

        self.combo_count += 1;
        if self.combo_count >= 2 {
            garbage += self.combo_count - 1;
        }

        self.score += score;
        self.lines_cleared += rows_u32;
        self.level = self.lines_cleared / LINES_PER_LEVEL + 1;
        if let Some(count) = self.line_cleared_counter.get_mut(rows) {
            *count += 1;
        }
        if t_spin_clear {
            self.t_spins += 1;
        }

        ClearReport {
            rows,
            t_spin,
            score,
            garbage,
            back_to_back,
            combo: self.combo_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_double_triple_scores() {
        let mut stats = GameStats::new();
        let single = stats.apply_clear(1, false);
        assert_eq!((single.score, single.garbage), (50, 0));
        stats.break_combo();

        let double = stats.apply_clear(2, false);
        assert_eq!((double.score, double.garbage), (200, 1));
        stats.break_combo();

        let triple = stats.apply_clear(3, false);
        assert_eq!((triple.score, triple.garbage), (800, 2));
        assert_eq!(stats.score(), 1050);
        assert_eq!(stats.lines_cleared(), 6);
        assert_eq!(stats.level(), 1);
    }

    #[test]
    fn test_tetris_at_level_one() {
        let mut stats = GameStats::new();
        let report = stats.apply_clear(4, false);
        assert_eq!(report.score, 3200);
        assert_eq!(report.garbage, 4);
        assert!(!report.back_to_back);
        assert!(stats.is_back_to_back());
        assert_eq!(report.label().as_deref(), Some("TETRIS!"));
    }

    #[test]
    fn test_t_spin_triple_then_plain_single() {
        let mut stats = GameStats::new();
        let report = stats.apply_clear(3, true);
        assert_eq!(report.score, 2400);
        assert_eq!(report.garbage, 6);
        assert!(stats.is_back_to_back());
        assert_eq!(report.label().as_deref(), Some("T-SPIN TRIPLE!"));

        stats.break_combo();
        let single = stats.apply_clear(1, false);
        assert!(!stats.is_back_to_back());
        assert_eq!(single.garbage, 0);
        assert_eq!(single.label(), None);
    }

    #[test]
    fn test_back_to_back_tetris() {
        let mut stats = GameStats::new();
        stats.apply_clear(4, false);
        stats.break_combo();
        let report = stats.apply_clear(4, false);
        assert!(report.back_to_back);
        assert_eq!(report.garbage, 5);
        assert_eq!(report.score, 1600 * 2 + 800);
        assert_eq!(report.label().as_deref(), Some("BACK-TO-BACK TETRIS!"));
    }

    #[test]
    fn test_back_to_back_survives_clear_less_locks() {
        let mut stats = GameStats::new();
        stats.apply_clear(2, true);
        stats.break_combo();
        stats.break_combo();
        let report = stats.apply_clear(1, true);
        assert!(report.back_to_back);
        assert_eq!(report.garbage, 2 + 1);
    }

    #[test]
    fn test_combo_adds_garbage() {
        let mut stats = GameStats::new();
        assert_eq!(stats.apply_clear(1, false).garbage, 0);
        let second = stats.apply_clear(1, false);
        assert_eq!(second.combo, 2);
        assert_eq!(second.garbage, 1);
        assert_eq!(second.label().as_deref(), Some("1 REN!"));
        let third = stats.apply_clear(2, false);
        assert_eq!(third.garbage, 1 + 2);
        assert_eq!(third.label().as_deref(), Some("2 REN!"));

        stats.break_combo();
        assert_eq!(stats.combo_count(), 0);
        assert_eq!(stats.apply_clear(1, false).garbage, 0);
    }

    #[test]
    fn test_level_uses_total_lines() {
        let mut stats = GameStats::new();
        for _ in 0..2 {
            stats.apply_clear(4, false);
            stats.break_combo();
        }
        assert_eq!(stats.level(), 1);
        stats.apply_clear(2, false);
        assert_eq!(stats.lines_cleared(), 10);
        assert_eq!(stats.level(), 2);

        // Level 2 scoring applies from the next clear on.
        stats.break_combo();
        assert_eq!(stats.apply_clear(1, false).score, 75);
    }

    #[test]
    fn test_line_cleared_counter() {
        let mut stats = GameStats::new();
        stats.record_lock();
        stats.break_combo();
        stats.record_lock();
        stats.apply_clear(2, false);
        assert_eq!(stats.completed_pieces(), 2);
        assert_eq!(stats.line_cleared_counter(), &[1, 0, 1, 0, 0]);
    }
}
