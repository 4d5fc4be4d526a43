use serde::Serialize;

/// Base score values for line clears.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 40 points
/// - 2 lines: 100 points
/// - 3 lines: 300 points
/// - 4 lines: 1200 points
const SCORE_TABLE: [u64; 5] = [0, 40, 100, 300, 1200];

/// Seconds per automatic drop at level 0.
pub const INITIAL_FALL_SPEED: f64 = 0.1;
/// Factor applied to the fall speed on every level-up.
pub const FALL_SPEED_FACTOR: f64 = 0.9;
/// Lines needed for the first level-up.
pub const INITIAL_LEVEL_THRESHOLD: u32 = 4;
/// Lines added to the threshold on every level-up.
pub const LEVEL_THRESHOLD_STEP: u32 = 5;

/// Score, level and drop-speed bookkeeping for one game.
///
/// # Scoring
///
/// Each line clear adds `SCORE_TABLE[lines] × (level + 1)` using the level
/// in effect before the clear. Once total cleared lines reach the next-level
/// threshold the level goes up by one, the threshold grows by 5 and the fall
/// speed is multiplied by 0.9.
///
/// # Example
///
/// ```
/// use rltetris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_clear(4); // Tetris (4 lines)
///
/// assert_eq!(stats.score(), 1200);
/// assert_eq!(stats.level(), 1);
/// assert_eq!(stats.next_level_threshold(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStats {
    score: u64,
    level: u32,
    total_cleared_lines: u32,
    next_level_threshold: u32,
    fall_speed: f64,
    completed_pieces: u64,
    line_cleared_counter: [u64; 5],
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
            score: 0,
            level: 0,
            total_cleared_lines: 0,
            next_level_threshold: INITIAL_LEVEL_THRESHOLD,
            fall_speed: INITIAL_FALL_SPEED,
            completed_pieces: 0,
            line_cleared_counter: [0; 5],
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
    pub const fn total_cleared_lines(&self) -> u32 {
        self.total_cleared_lines
    }

    #[must_use]
    pub const fn next_level_threshold(&self) -> u32 {
        self.next_level_threshold
    }

    /// Seconds between automatic drops.
    #[must_use]
    pub const fn fall_speed(&self) -> f64 {
        self.fall_speed
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> u64 {
        self.completed_pieces
    }

    /// Returns a histogram of line clears by count.
    ///
    /// Index `n` counts locks that cleared `n` rows at once.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[u64; 5] {
        &self.line_cleared_counter
    }

    pub(crate) const fn complete_piece(&mut self) {
        self.completed_pieces += 1;
    }

    /// Applies scoring and leveling for `cleared_lines` rows removed at once.
    ///
    /// Returns the points added.
    pub fn record_clear(&mut self, cleared_lines: usize) -> u64 {
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.total_cleared_lines = self
            .total_cleared_lines
            .saturating_add(u32::try_from(cleared_lines).unwrap_or(u32::MAX));

        let base = SCORE_TABLE.get(cleared_lines).copied().unwrap_or(0);
        let points = base * (u64::from(self.level) + 1);
        self.score += points;

        if self.total_cleared_lines >= self.next_level_threshold {
            self.level += 1;
            self.next_level_threshold += LEVEL_THRESHOLD_STEP;
            self.fall_speed *= FALL_SPEED_FACTOR;
            log::debug!(
                "level up to {} (fall speed {:.4}s)",
                self.level,
                self.fall_speed
            );
        }

        points
    }
}
