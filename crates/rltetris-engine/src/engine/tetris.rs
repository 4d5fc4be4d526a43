use arrayvec::ArrayVec;

use crate::core::{
    grid::{BOTTOM_ROW, Grid, Position, WIDTH},
    locked_cells::LockedCells,
    piece::{Color, Piece},
};

use super::{
    command::Direction,
    game_stats::GameStats,
    mode::GameMode,
    piece_generator::{PieceGenerator, PieceSeed},
};

/// Reward reported for a step whose lock cleared at least one row.
pub const LINE_CLEAR_REWARD: i32 = 10;
/// Reward reported for a step that ended the game.
pub const GAME_OVER_REWARD: i32 = -10;

/// What a driver reads back after one [`Tetris::step`].
#[derive(Debug, Clone)]
pub struct StepOutcome<'a> {
    /// `10` after a line clear, `-10` after a game over, `0` otherwise.
    pub reward: i32,
    /// Stack height after the step.
    pub height: u32,
    /// Cells of the piece that was active when the step began its lock check.
    pub active_cells: ArrayVec<Position, 4>,
    /// Settled blocks after the step.
    pub locked_cells: &'a LockedCells,
}

impl StepOutcome<'_> {
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.reward == GAME_OVER_REWARD
    }
}

/// The board engine.
///
/// Owns the locked-cell map, the derived grid, the active piece and all
/// rules. A driver calls [`Self::step`] once per tick with an already
/// decoded command and the elapsed wall time; the engine never reads a
/// clock itself.
///
/// Game over is not an error: the step that detects it reports
/// [`GAME_OVER_REWARD`] and the engine resets itself in place.
///
/// # Example
///
/// ```
/// use rltetris_engine::{Direction, GameMode, Tetris};
///
/// let mut game = Tetris::new(GameMode::Machine);
/// let outcome = game.step(Some(Direction::Left), 16);
/// assert_eq!(outcome.reward, 0);
/// assert_eq!(outcome.active_cells.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Tetris {
    mode: GameMode,
    generator: PieceGenerator,
    grid: Grid,
    locked: LockedCells,
    current_piece: Piece,
    stats: GameStats,
    fall_time_ms: u64,
    lock_pending: bool,
    games_played: u64,
}

impl Tetris {
    #[must_use]
    pub fn new(mode: GameMode) -> Self {
        Self::from_generator(mode, PieceGenerator::new())
    }

    /// Like [`Self::new`], but with a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(mode: GameMode, seed: PieceSeed) -> Self {
        Self::from_generator(mode, PieceGenerator::with_seed(seed))
    }

    fn from_generator(mode: GameMode, mut generator: PieceGenerator) -> Self {
        let current_piece = generator.next_piece();
        Self {
            mode,
            generator,
            grid: Grid::EMPTY,
            locked: LockedCells::new(),
            current_piece,
            stats: GameStats::new(),
            fall_time_ms: 0,
            lock_pending: false,
            games_played: 0,
        }
    }

    /// Reinitializes the game: empty board, fresh stats, a new random piece.
    ///
    /// The piece generator keeps its sequence, so a seeded engine stays
    /// deterministic across resets.
    pub fn reset(&mut self) {
        self.locked.clear();
        self.grid = Grid::EMPTY;
        self.stats = GameStats::new();
        self.lock_pending = false;
        self.current_piece = self.generator.next_piece();
        self.fall_time_ms = 0;
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.generator.seed()
    }

    /// The grid as painted during the last step.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn locked_cells(&self) -> &LockedCells {
        &self.locked
    }

    #[must_use]
    pub fn current_piece(&self) -> &Piece {
        &self.current_piece
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn is_lock_pending(&self) -> bool {
        self.lock_pending
    }

    /// Number of games that ended in a game over on this instance.
    #[must_use]
    pub fn games_played(&self) -> u64 {
        self.games_played
    }

    /// Replaces the active piece without validating it.
    pub fn set_current_piece(&mut self, piece: Piece) {
        self.current_piece = piece;
    }

    /// Settles a single block, bypassing the lock sequence.
    pub fn insert_locked(&mut self, pos: Position, color: Color) {
        self.locked.insert(pos, color);
    }

    /// Returns `true` if every cell of `piece` is placeable.
    ///
    /// Cells must be within columns 0..=9 and not below row 19. Cells on a
    /// visible row must be empty in a grid freshly built from the locked
    /// cells; cells above the playfield are never blocked.
    #[must_use]
    pub fn is_valid(&self, piece: &Piece) -> bool {
        let grid = Grid::from_locked(&self.locked);
        piece.cell_coordinates().iter().all(|&(x, y)| {
            if !(0..WIDTH).contains(&x) || y > BOTTOM_ROW {
                return false;
            }
            y < 0 || grid.is_empty_at(x, y)
        })
    }

    /// Applies one command to the active piece.
    ///
    /// The candidate position or shape replaces the active piece only if it
    /// is valid; otherwise the command is dropped. Nothing moves while a lock
    /// is pending.
    pub fn move_piece(&mut self, direction: Option<Direction>) {
        if self.lock_pending {
            return;
        }
        let Some(direction) = direction else {
            return;
        };
        let piece = self.current_piece;
        let candidate = match direction.offset() {
            Some((dx, dy)) => piece.shifted(dx, dy),
            None => piece.with_shape(piece.rotate()),
        };
        if self.is_valid(&candidate) {
            self.current_piece = candidate;
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// `elapsed_ms` is the wall time since the previous call; it is scaled by
    /// the mode's speed multiplier before feeding the drop timer.
    pub fn step(&mut self, direction: Option<Direction>, elapsed_ms: u64) -> StepOutcome<'_> {
        let mut reward = 0;
        self.grid = Grid::from_locked(&self.locked);

        self.move_piece(direction);

        let active_cells = self.current_piece.cell_coordinates();
        let color = self.current_piece.color();
        for &(x, y) in &active_cells {
            if (0..=BOTTOM_ROW).contains(&y) {
                self.grid.paint(x, y, color);
            } else if y > BOTTOM_ROW + 1 {
                self.lock_pending = true;
            }
        }

        if self.lock_pending {
            self.lock_piece(&active_cells);
            if self.clear_rows() {
                reward = LINE_CLEAR_REWARD;
            }
            self.lock_pending = false;
        }

        if self.locked.reaches_top() {
            log::info!(
                "game over: score {}, lines {}, level {}",
                self.stats.score(),
                self.stats.total_cleared_lines(),
                self.stats.level()
            );
            reward = GAME_OVER_REWARD;
            self.games_played += 1;
            self.reset();
        }

        self.fall_time_ms = self
            .fall_time_ms
            .saturating_add(elapsed_ms.saturating_mul(self.mode.speed_multiplier()));
        self.tick_fall();

        StepOutcome {
            reward,
            height: self.locked.height(),
            active_cells,
            locked_cells: &self.locked,
        }
    }

    fn lock_piece(&mut self, cells: &[Position]) {
        let color = self.current_piece.color();
        for &pos in cells {
            self.locked.insert(pos, color);
        }
        log::debug!("locked {:?} at {cells:?}", self.current_piece.kind());
        self.stats.complete_piece();
        self.current_piece = self.generator.next_piece();
    }

    /// Drops the piece one row once the fall timer exceeds the fall speed.
    ///
    /// A blocked drop below row 0 raises the pending lock. A blocked drop at
    /// or above row 0 leaves the piece where it moved; the game-over check
    /// handles it after the next lock.
    #[expect(clippy::cast_precision_loss)]
    fn tick_fall(&mut self) {
        if self.fall_time_ms as f64 / 1000.0 <= self.stats.fall_speed() {
            return;
        }
        self.fall_time_ms = 0;
        let candidate = self.current_piece.shifted(0, 1);
        if self.is_valid(&candidate) || candidate.y() <= 0 {
            self.current_piece = candidate;
        } else {
            self.lock_pending = true;
        }
    }

    /// Removes full rows from the locked cells and collapses the rows above.
    ///
    /// Rows are scanned bottom-up on the grid painted this step. Blocks above
    /// the topmost cleared row move down by the number of rows cleared;
    /// blocks at or below it stay put. Scoring runs even when nothing was
    /// cleared. Returns whether any row was cleared.
    fn clear_rows(&mut self) -> bool {
        let mut cleared = 0_usize;
        let mut topmost = None;
        for y in (0..=BOTTOM_ROW).rev() {
            if !self.grid.is_row_full(y) {
                continue;
            }
            cleared += 1;
            topmost = Some(y);
            self.locked.remove_row(y);
        }
        if let Some(boundary) = topmost {
            // at most one per playfield row
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let rows = cleared as i32;
            self.locked.shift_down_above(boundary, rows);
        }

        let points = self.stats.record_clear(cleared);
        if cleared > 0 {
            log::debug!("cleared {cleared} rows (+{points})");
        }
        cleared > 0
    }
}

#[cfg(test)]
mod tests {
    use crate::core::piece::PieceKind;

    use super::*;

    const FILL: Color = Color::new(1, 2, 3);

    fn seeded(mode: GameMode) -> Tetris {
        Tetris::with_seed(mode, PieceSeed::from_bytes([7; 16]))
    }

    fn fill_row_except(game: &mut Tetris, y: i32, holes: &[i32]) {
        for x in (0..WIDTH).filter(|x| !holes.contains(x)) {
            game.insert_locked((x, y), FILL);
        }
    }

    /// Steps with `direction` until the active piece locks, returning the
    /// reward of the locking step.
    fn drive_until_lock(game: &mut Tetris, direction: Option<Direction>) -> i32 {
        let locked_before = game.stats().completed_pieces();
        for _ in 0..64 {
            let reward = game.step(direction, 1000).reward;
            if game.stats().completed_pieces() != locked_before {
                return reward;
            }
        }
        panic!("piece never locked");
    }

    fn sorted_keys(locked: &LockedCells) -> Vec<Position> {
        let mut keys = locked.iter().map(|(pos, _)| pos).collect::<Vec<_>>();
        keys.sort_unstable_by_key(|&(x, y)| (y, x));
        keys
    }

    #[test]
    fn test_initial_state() {
        let game = seeded(GameMode::Player);
        assert_eq!(game.stats(), &GameStats::new());
        assert!(game.locked_cells().is_empty());
        assert_eq!(game.grid(), &Grid::EMPTY);
        assert!(!game.is_lock_pending());
        assert_eq!(game.current_piece().x(), Piece::SPAWN_X);
    }

    #[test]
    fn test_validity_rejects_overlap() {
        let mut game = seeded(GameMode::Player);
        let piece = Piece::new(PieceKind::J).with_position(4, 12);
        assert!(game.is_valid(&piece));

        game.insert_locked((4, 10), FILL);
        assert!(!game.is_valid(&piece));
    }

    #[test]
    fn test_validity_accepts_placement_above_grid() {
        let mut game = seeded(GameMode::Player);
        for y in 0..=BOTTOM_ROW {
            fill_row_except(&mut game, y, &[]);
        }
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind).with_position(3, 0);
            assert!(game.is_valid(&piece), "{kind:?}");
        }
        let spawn = Piece::new(PieceKind::J);
        assert!(!game.is_valid(&spawn));
    }

    #[test]
    fn test_validity_bounds() {
        let game = seeded(GameMode::Player);
        let o = Piece::new(PieceKind::O);
        assert!(game.is_valid(&o.with_position(0, 5)));
        assert!(!game.is_valid(&o.with_position(-1, 5)));
        assert!(game.is_valid(&o.with_position(8, 5)));
        assert!(!game.is_valid(&o.with_position(9, 5)));
        assert!(game.is_valid(&o.with_position(0, 20)));
        assert!(!game.is_valid(&o.with_position(0, 21)));
    }

    #[test]
    fn test_move_rejected_at_wall() {
        let mut game = seeded(GameMode::Player);
        game.set_current_piece(Piece::new(PieceKind::O).with_position(0, 5));
        game.move_piece(Some(Direction::Left));
        assert_eq!(game.current_piece().x(), 0);
        game.move_piece(Some(Direction::Right));
        assert_eq!(game.current_piece().x(), 1);
    }

    #[test]
    fn test_move_down_and_none() {
        let mut game = seeded(GameMode::Player);
        game.set_current_piece(Piece::new(PieceKind::T));
        game.move_piece(Some(Direction::Down));
        assert_eq!(game.current_piece().y(), 2);
        game.move_piece(None);
        assert_eq!(game.current_piece().y(), 2);
    }

    #[test]
    fn test_rotation_rejected_when_blocked() {
        let mut game = seeded(GameMode::Player);
        // A vertical I on the right wall has no room to lie flat.
        let i = Piece::new(PieceKind::I);
        let vertical = i.with_position(9, 10);
        game.set_current_piece(vertical);
        game.move_piece(Some(Direction::Up));
        assert!(!game.is_valid(&vertical.with_shape(vertical.rotate())));
        assert_eq!(game.current_piece(), &vertical);

        let free = i.with_position(3, 10);
        game.set_current_piece(free);
        game.move_piece(Some(Direction::Up));
        assert_eq!(game.current_piece().shape(), &free.rotate());
    }

    #[test]
    fn test_no_move_while_lock_pending() {
        let mut game = seeded(GameMode::Player);
        let piece = Piece::new(PieceKind::T).with_position(4, 10);
        game.set_current_piece(piece);
        game.lock_pending = true;
        for direction in Direction::ALL {
            game.move_piece(Some(direction));
        }
        assert_eq!(game.current_piece(), &piece);
    }

    #[test]
    fn test_automatic_drop_waits_for_fall_speed() {
        let mut game = seeded(GameMode::Player);
        game.set_current_piece(Piece::new(PieceKind::T));
        game.step(None, 50);
        assert_eq!(game.current_piece().y(), 1);
        // 100 ms is not strictly greater than 0.1 s.
        game.step(None, 50);
        assert_eq!(game.current_piece().y(), 1);
        game.step(None, 50);
        assert_eq!(game.current_piece().y(), 2);
        assert_eq!(game.fall_time_ms, 0);
    }

    #[test]
    fn test_machine_mode_speeds_up_drop_timer() {
        let mut game = seeded(GameMode::Machine);
        game.set_current_piece(Piece::new(PieceKind::T));
        game.step(None, 20);
        assert_eq!(game.current_piece().y(), 2);
    }

    #[test]
    fn test_blocked_drop_raises_pending_lock() {
        let mut game = seeded(GameMode::Player);
        game.set_current_piece(Piece::new(PieceKind::O).with_position(0, 20));
        game.step(None, 1000);
        assert!(game.is_lock_pending());
        assert_eq!(game.current_piece().y(), 20);
    }

    #[test]
    fn test_step_reports_active_cells_and_paints_grid() {
        let mut game = seeded(GameMode::Player);
        let piece = Piece::new(PieceKind::J).with_position(4, 5);
        game.set_current_piece(piece);
        let outcome = game.step(None, 0);
        assert_eq!(
            outcome.active_cells.as_slice(),
            &[(4, 3), (4, 4), (5, 4), (6, 4)]
        );
        assert_eq!(outcome.reward, 0);
        assert_eq!(outcome.height, 0);
        assert_eq!(game.grid().get(5, 4), Some(Some(PieceKind::J.color())));
        assert_eq!(game.grid().get(5, 3), Some(None));
    }

    #[test]
    fn test_j_piece_lands_on_empty_board() {
        let mut game = seeded(GameMode::Player);
        game.set_current_piece(Piece::new(PieceKind::J));

        for _ in 0..64 {
            if game.is_lock_pending() {
                break;
            }
            game.step(Some(Direction::Down), 1000);
        }
        assert!(game.is_lock_pending());

        let outcome = game.step(None, 0);
        assert_eq!(outcome.reward, 0);
        assert_eq!(outcome.height, 1);
        assert_eq!(
            sorted_keys(outcome.locked_cells),
            vec![(4, 18), (4, 19), (5, 19), (6, 19)]
        );

        let red = Some(PieceKind::J.color());
        let bottom = game.grid().row(19);
        assert_eq!(bottom[4], red);
        assert_eq!(bottom[5], red);
        assert_eq!(bottom[6], red);
        assert_eq!(bottom.iter().filter(|c| c.is_some()).count(), 3);
        assert!(!game.is_lock_pending());
        assert_eq!(game.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_single_line_clear() {
        let mut game = seeded(GameMode::Player);
        fill_row_except(&mut game, 19, &[9]);
        game.set_current_piece(Piece::new(PieceKind::I).with_position(9, 3));

        let reward = drive_until_lock(&mut game, Some(Direction::Down));
        assert_eq!(reward, LINE_CLEAR_REWARD);
        assert_eq!(game.stats().total_cleared_lines(), 1);
        assert_eq!(game.stats().score(), 40);
        assert_eq!(
            sorted_keys(game.locked_cells()),
            vec![(9, 17), (9, 18), (9, 19)]
        );
    }

    #[test]
    fn test_tetris_clear() {
        let mut game = seeded(GameMode::Player);
        for y in 16..=19 {
            fill_row_except(&mut game, y, &[0]);
        }
        game.set_current_piece(Piece::new(PieceKind::I).with_position(0, 3));
        let level = u64::from(game.stats().level());

        let reward = drive_until_lock(&mut game, Some(Direction::Down));
        assert_eq!(reward, LINE_CLEAR_REWARD);
        assert_eq!(game.stats().score(), 1200 * (level + 1));
        assert_eq!(game.stats().total_cleared_lines(), 4);
        assert_eq!(game.stats().level(), 1);
        assert_eq!(game.stats().line_cleared_counter()[4], 1);
        assert!(game.locked_cells().is_empty());
    }

    #[test]
    fn test_clear_shifts_rows_above_and_keeps_rows_below() {
        let mut game = seeded(GameMode::Player);
        fill_row_except(&mut game, 18, &[9]);
        for x in 0..6 {
            game.insert_locked((x, 19), FILL);
        }
        game.insert_locked((2, 17), FILL);
        game.set_current_piece(Piece::new(PieceKind::I).with_position(9, 3));

        let reward = drive_until_lock(&mut game, Some(Direction::Down));
        assert_eq!(reward, LINE_CLEAR_REWARD);
        assert_eq!(game.stats().total_cleared_lines(), 1);

        let mut expected = (0..6).map(|x| (x, 19)).collect::<Vec<_>>();
        // The I-piece bottom cell sat on row 19 and stays there.
        expected.push((9, 19));
        // Blocks above the cleared row moved down by one.
        expected.extend([(2, 18), (9, 18), (9, 17)]);
        expected.sort_unstable_by_key(|&(x, y)| (y, x));
        assert_eq!(sorted_keys(game.locked_cells()), expected);
    }

    #[test]
    fn test_lock_without_clear_scores_nothing() {
        let mut game = seeded(GameMode::Player);
        game.set_current_piece(Piece::new(PieceKind::O));
        let reward = drive_until_lock(&mut game, None);
        assert_eq!(reward, 0);
        assert_eq!(game.stats().score(), 0);
        assert_eq!(game.stats().line_cleared_counter()[0], 1);
        assert_eq!(game.locked_cells().len(), 4);
    }

    #[test]
    fn test_game_over_resets_state() {
        let mut game = seeded(GameMode::Player);
        fill_row_except(&mut game, 19, &[9]);
        game.set_current_piece(Piece::new(PieceKind::I).with_position(9, 3));
        drive_until_lock(&mut game, Some(Direction::Down));
        assert_eq!(game.stats().score(), 40);

        game.insert_locked((3, 0), FILL);
        let outcome = game.step(None, 0);
        assert_eq!(outcome.reward, GAME_OVER_REWARD);
        assert!(outcome.is_game_over());
        assert_eq!(outcome.height, 0);
        assert!(outcome.locked_cells.is_empty());

        assert_eq!(game.stats(), &GameStats::new());
        assert_eq!(game.grid(), &Grid::EMPTY);
        assert!(!game.is_lock_pending());
        assert_eq!(game.games_played(), 1);
    }

    #[test]
    fn test_noncontiguous_clear_uses_topmost_boundary() {
        let mut game = seeded(GameMode::Player);
        fill_row_except(&mut game, 19, &[9]);
        fill_row_except(&mut game, 17, &[9]);
        game.insert_locked((3, 18), FILL);
        game.insert_locked((5, 16), FILL);
        // Fills column 9 on rows 16..=19.
        game.set_current_piece(Piece::new(PieceKind::I).with_position(9, 20));
        game.lock_pending = true;

        let outcome = game.step(None, 0);
        assert_eq!(outcome.reward, LINE_CLEAR_REWARD);
        assert_eq!(game.stats().total_cleared_lines(), 2);
        // Row 18 sits below the boundary and stays; row 16 drops by two and
        // lands on the I block already at (9, 18).
        assert_eq!(
            sorted_keys(game.locked_cells()),
            vec![(3, 18), (5, 18), (9, 18)]
        );
    }

    #[test]
    fn test_game_over_overrides_line_clear_reward() {
        let mut game = seeded(GameMode::Player);
        fill_row_except(&mut game, 19, &[9]);
        // Collapses onto row 0 once row 19 is cleared.
        game.insert_locked((0, -1), FILL);
        game.set_current_piece(Piece::new(PieceKind::I).with_position(9, 20));
        game.lock_pending = true;

        let outcome = game.step(None, 0);
        assert_eq!(outcome.reward, GAME_OVER_REWARD);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut game = seeded(GameMode::Player);
        for _ in 0..30 {
            game.step(Some(Direction::Down), 1000);
        }
        game.reset();
        assert_eq!(game.stats(), &GameStats::new());
        assert!(game.locked_cells().is_empty());
        assert_eq!(game.grid(), &Grid::EMPTY);
        assert_eq!(game.fall_time_ms, 0);
        let piece = game.current_piece();
        assert_eq!(piece, &Piece::new(piece.kind()));
    }

    #[test]
    fn test_seeded_engines_are_deterministic() {
        let commands = [
            Some(Direction::Left),
            Some(Direction::Up),
            None,
            Some(Direction::Right),
            Some(Direction::Down),
        ];
        let mut a = seeded(GameMode::Machine);
        let mut b = seeded(GameMode::Machine);
        for command in commands.iter().cycle().take(2000) {
            let ra = a.step(*command, 16).reward;
            let rb = b.step(*command, 16).reward;
            assert_eq!(ra, rb);
        }
        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.locked_cells(), b.locked_cells());
        assert_eq!(a.games_played(), b.games_played());
    }

    #[test]
    fn test_locked_columns_stay_in_range() {
        let mut game = seeded(GameMode::Machine);
        let commands = [Some(Direction::Left), Some(Direction::Right), Some(Direction::Up)];
        for (i, command) in commands.iter().cycle().take(3000).enumerate() {
            let command = if i % 7 == 0 { None } else { *command };
            let outcome = game.step(command, 16);
            for ((x, y), _) in outcome.locked_cells.iter() {
                assert!((0..WIDTH).contains(&x));
                assert!((1..=BOTTOM_ROW).contains(&y));
            }
        }
    }
}
