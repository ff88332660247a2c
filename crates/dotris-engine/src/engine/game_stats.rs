use serde::Serialize;

use super::{ScoreResult, config::MAX_LEVEL};

/// Number of rows a level lasts.
const LINES_PER_LEVEL: usize = 20;

/// Running score, line and level counters of a session.
///
/// - **Lines**: total rows cleared
/// - **Score**: sum of [`ScoreResult::score_delta`] over all locks
/// - **Level**: `min(lines / 20, 20)`
/// - **Back-to-back**: whether the last clear qualified for the bonus
/// - **Line clear distribution**: count of locks by rows cleared
///
/// # Example
///
/// ```
/// use dotris_engine::{GameStats, LineClear, PieceKind, SpinKind, evaluate_lock};
///
/// let mut stats = GameStats::new();
/// let clear = LineClear {
///     cleared_rows: 4,
///     spin: SpinKind::None,
///     kind: PieceKind::I,
///     perfect_clear: false,
/// };
/// let result = evaluate_lock(clear, stats.back_to_back(), 10);
/// stats.record_lock(4, &result);
///
/// assert_eq!(stats.score(), 1600);
/// assert_eq!(stats.lines(), 4);
/// assert!(stats.back_to_back());
/// assert_eq!(stats.line_clear_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    lines: usize,
    score: usize,
    level: usize,
    back_to_back: bool,
    completed_pieces: usize,
    line_clear_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: 0,
            score: 0,
            level: 0,
            back_to_back: false,
            completed_pieces: 0,
            line_clear_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn lines(&self) -> usize {
        self.lines
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub const fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    /// Number of pieces locked so far.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Histogram of locks by rows cleared.
    ///
    /// - `[0]`: locks that cleared nothing
    /// - `[1]`..`[4]`: singles, doubles, triples, quadruples
    #[must_use]
    pub const fn line_clear_counter(&self) -> &[usize; 5] {
        &self.line_clear_counter
    }

    /// Folds one lock into the counters.
    pub fn record_lock(&mut self, cleared_rows: usize, result: &ScoreResult) {
        self.completed_pieces += 1;
        self.lines += cleared_rows;
        self.level = (self.lines / LINES_PER_LEVEL).min(MAX_LEVEL);
        self.score += result.score_delta;
        self.back_to_back = result.back_to_back;
        if let Some(count) = self.line_clear_counter.get_mut(cleared_rows) {
            *count += 1;
        }
    }
}
