use std::time::Duration;

use log::{debug, info};
use rand::{Rng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    ConfigError,
    core::{
        geom::Point,
        piece::{PieceKind, RotationDirection, RotationState},
        playfield::{Playfield, SPAWN_BUFFER_ROWS},
        rotation::{ActivePiece, attempt_rotate},
    },
};

use super::{
    GameConfig, GameEvent, GameMode, GameStats, GravityClock, LineClear, MovementKind, PieceBuffer,
    PieceSeed, detect_spin, evaluate_lock,
};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, waiting for [`GameSession::start`].
    Ready,
    Playing,
    Paused,
    /// Terminal; every intent is a no-op from here on.
    GameOver,
}

/// One game from first spawn to game over.
///
/// The session owns the playfield, the piece queue, the falling piece and the
/// gravity clock, and is the only thing that mutates them. Front ends forward
/// player intents (each returns whether it took effect), feed wall-clock time
/// through [`Self::advance`], read state through the query methods and poll
/// [`Self::drain_events`] for score and message updates.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use dotris_engine::{GameConfig, GameEvent, GameSession};
///
/// let mut session = GameSession::new(GameConfig::default()).unwrap();
/// assert!(session.start());
///
/// session.move_left();
/// session.rotate_clockwise();
/// session.hard_drop();
/// session.advance(Duration::from_millis(16));
///
/// assert_eq!(session.stats().completed_pieces(), 1);
/// let events: Vec<_> = session.drain_events().collect();
/// assert!(matches!(events[0], GameEvent::ScoreUpdate { score: 0, .. }));
///
/// let summary = session.quit();
/// assert_eq!(summary.stats.completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    seed: PieceSeed,
    playfield: Playfield,
    buffer: PieceBuffer,
    column_rng: Pcg32,
    active: Option<ActivePiece>,
    holdable: bool,
    last_movement: MovementKind,
    stats: GameStats,
    state: SessionState,
    clock: GravityClock,
    play_time: Duration,
    events: Vec<GameEvent>,
}

/// Serializable view of a session for front ends.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub state: SessionState,
    pub mode: GameMode,
    pub color_scheme: String,
    pub field: Playfield,
    pub active: Option<ActivePieceView>,
    pub next: Vec<PieceKind>,
    pub held: Option<PieceKind>,
    pub holdable: bool,
    pub stats: GameStats,
}

/// Serializable view of the falling piece.
#[derive(Debug, Clone, Serialize)]
pub struct ActivePieceView {
    pub kind: PieceKind,
    pub rotation: RotationState,
    pub position: Point,
    pub ghost: Point,
    pub blocks: Vec<Point>,
}

impl From<&ActivePiece> for ActivePieceView {
    fn from(piece: &ActivePiece) -> Self {
        Self {
            kind: piece.kind(),
            rotation: piece.rotation(),
            position: piece.position(),
            ghost: piece.ghost(),
            blocks: piece.blocks().to_vec(),
        }
    }
}

/// Final report returned by [`GameSession::quit`].
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub seed: PieceSeed,
    pub mode: GameMode,
    pub field_width: i32,
    pub field_height: i32,
    pub final_state: SessionState,
    pub play_time_secs: f64,
    pub stats: GameStats,
    pub field: Playfield,
}

impl GameSession {
    /// Validates `config` and builds a session in the [`SessionState::Ready`] state.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed().unwrap_or_else(|| rand::rng().random());
        let mode = config.mode();
        Ok(Self {
            playfield: Playfield::new(config.field_width(), config.field_height()),
            buffer: PieceBuffer::with_seed(seed),
            column_rng: seed.derived_rng(),
            seed,
            config,
            active: None,
            holdable: true,
            last_movement: MovementKind::Spawn,
            stats: GameStats::new(),
            state: SessionState::Ready,
            clock: GravityClock::new(mode.normal_frequency(0)),
            play_time: Duration::ZERO,
            events: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Seed of the piece sequence, generated at construction if none was configured.
    #[must_use]
    pub const fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn ghost_position(&self) -> Option<Point> {
        self.active.map(|piece| piece.ghost())
    }

    /// Upcoming pieces, limited to the configured preview length.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.buffer.next_pieces().take(self.config.next_count())
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.buffer.held_piece()
    }

    /// Returns `true` if hold has not been used during the current piece's life.
    #[must_use]
    pub const fn is_holdable(&self) -> bool {
        self.holdable
    }

    #[must_use]
    pub const fn last_movement(&self) -> MovementKind {
        self.last_movement
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Time spent in the playing state.
    #[must_use]
    pub const fn play_time(&self) -> Duration {
        self.play_time
    }

    /// Current gravity frequency in Hz.
    #[must_use]
    pub const fn gravity_frequency(&self) -> u32 {
        self.clock.frequency()
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state,
            mode: self.config.mode(),
            color_scheme: self.config.color_scheme().to_owned(),
            field: self.playfield.clone(),
            active: self.active.as_ref().map(ActivePieceView::from),
            next: self.next_pieces().collect(),
            held: self.held_piece(),
            holdable: self.holdable,
            stats: self.stats.clone(),
        }
    }

    /// Hands out the queued events, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Starts a ready session or resumes a paused one.
    pub fn start(&mut self) -> bool {
        match self.state {
            SessionState::Ready => {
                info!(
                    "session started: {}x{} field, {} mode, seed {}",
                    self.config.field_width(),
                    self.config.field_height(),
                    self.config.mode(),
                    self.seed
                );
                self.state = SessionState::Playing;
                self.clock.start();
                self.push_score_update();
                self.spawn();
                true
            }
            SessionState::Paused => self.pause(),
            SessionState::Playing | SessionState::GameOver => false,
        }
    }

    /// Toggles between playing and paused.
    pub fn pause(&mut self) -> bool {
        match self.state {
            SessionState::Playing => {
                self.state = SessionState::Paused;
                self.clock.stop();
                debug!("paused");
                true
            }
            SessionState::Paused => {
                self.state = SessionState::Playing;
                self.clock.start();
                debug!("resumed");
                true
            }
            SessionState::Ready | SessionState::GameOver => false,
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1, 0)
    }

    /// Moves the piece one row down. Never locks.
    pub fn soft_drop(&mut self) -> bool {
        self.shift(0, 1)
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        self.rotate(RotationDirection::Clockwise)
    }

    pub fn rotate_counterclockwise(&mut self) -> bool {
        self.rotate(RotationDirection::CounterClockwise)
    }

    /// Drops the piece to its ghost position and locks it.
    pub fn hard_drop(&mut self) -> bool {
        if self.controllable_piece().is_none() {
            return false;
        }
        self.drop_and_lock();
        true
    }

    /// Swaps the piece with the hold slot, once per piece life.
    pub fn hold(&mut self) -> bool {
        let Some(piece) = self.controllable_piece() else {
            return false;
        };
        if !self.holdable {
            return false;
        }
        let current = piece.kind();
        let next = self.buffer.hold(current);
        debug!("hold {current:?}, playing {next:?}");
        self.place_piece(next);
        self.holdable = false;
        true
    }

    /// Feeds `elapsed` wall-clock time to the gravity clock and runs the ticks
    /// it produces. Returns the number of ticks run.
    ///
    /// Stops early when a tick resets the clock, since that discards the
    /// remaining accumulated time, or when the session leaves the playing state.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if !self.state.is_playing() {
            return 0;
        }
        self.play_time += elapsed;
        self.clock.accumulate(elapsed);
        let mut ticks = 0;
        loop {
            let resets = self.clock.resets();
            if !self.clock.take_tick() {
                break;
            }
            self.gravity_tick();
            ticks += 1;
            if !self.state.is_playing() || self.clock.resets() != resets {
                break;
            }
        }
        ticks
    }

    /// Runs one gravity tick immediately, as if a clock period had elapsed.
    pub fn step_gravity(&mut self) -> bool {
        if !self.state.is_playing() || self.active.is_none() {
            return false;
        }
        self.gravity_tick();
        true
    }

    /// Ends the session and returns its summary.
    #[must_use]
    pub fn quit(mut self) -> GameSummary {
        self.clock.stop();
        info!(
            "session closed: {} pieces, {} lines, score {}",
            self.stats.completed_pieces(),
            self.stats.lines(),
            self.stats.score()
        );
        GameSummary {
            seed: self.seed,
            mode: self.config.mode(),
            field_width: self.config.field_width(),
            field_height: self.config.field_height(),
            final_state: self.state,
            play_time_secs: self.play_time.as_secs_f64(),
            stats: self.stats,
            field: self.playfield,
        }
    }

    /// The falling piece, if the player may act on it right now.
    fn controllable_piece(&self) -> Option<ActivePiece> {
        if !self.state.is_playing() || self.config.mode().is_auto() {
            return None;
        }
        self.active
    }

    fn shift(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.controllable_piece() else {
            return false;
        };
        let Some(moved) = piece.moved_to(piece.position().offset(dx, dy), &self.playfield) else {
            return false;
        };
        self.active = Some(moved);
        self.last_movement = MovementKind::Move;
        self.update_gravity_frequency();
        true
    }

    fn rotate(&mut self, direction: RotationDirection) -> bool {
        let Some(piece) = self.controllable_piece() else {
            return false;
        };
        let Some(rotated) = attempt_rotate(&piece, direction, &self.playfield) else {
            return false;
        };
        self.active = Some(rotated);
        self.last_movement = MovementKind::Rotate;
        self.update_gravity_frequency();
        true
    }

    fn gravity_tick(&mut self) {
        let Some(piece) = self.active else {
            return;
        };
        if self.config.mode().is_auto() {
            self.drop_and_lock();
            return;
        }
        if piece.will_land(&self.playfield) {
            self.lock();
            return;
        }
        if let Some(moved) = piece.moved_to(piece.position().down(), &self.playfield) {
            self.active = Some(moved);
            self.last_movement = MovementKind::Move;
            self.update_gravity_frequency();
        }
    }

    fn drop_and_lock(&mut self) {
        let Some(piece) = self.active else {
            return;
        };
        if piece.ghost() != piece.position() {
            if let Some(dropped) = piece.moved_to(piece.ghost(), &self.playfield) {
                self.active = Some(dropped);
                self.last_movement = MovementKind::Move;
            }
        }
        self.lock();
    }

    fn lock(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        let spin = detect_spin(&piece, &self.playfield, self.last_movement);
        self.playfield
            .commit(piece.shape(), piece.kind(), piece.position());
        let cleared_rows = self.playfield.clear_full_rows(piece.position().y);
        let clear = LineClear {
            cleared_rows,
            spin,
            kind: piece.kind(),
            perfect_clear: cleared_rows > 0 && self.playfield.is_empty(),
        };
        let width = self.playfield.width().unsigned_abs() as usize;
        let result = evaluate_lock(clear, self.stats.back_to_back(), width);
        debug!(
            "locked {:?} at {:?}: {} rows, {:?} spin, +{}",
            piece.kind(),
            piece.position(),
            cleared_rows,
            spin,
            result.score_delta
        );
        self.stats.record_lock(cleared_rows, &result);
        if cleared_rows > 0 {
            self.events.push(GameEvent::Message {
                text: result.message,
            });
            self.push_score_update();
        }

        if self.playfield.forbidden_rows_occupied(SPAWN_BUFFER_ROWS) {
            self.game_over();
        } else {
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        let kind = self.buffer.pop_next();
        self.place_piece(kind);
        self.holdable = true;
    }

    /// Puts a fresh piece of `kind` at its spawn position, or ends the game if
    /// there is no room for it.
    fn place_piece(&mut self, kind: PieceKind) {
        self.active = None;
        let Some(position) = self.spawn_position(kind) else {
            self.game_over();
            return;
        };
        self.active = Some(ActivePiece::spawn(kind, position, &self.playfield));
        self.last_movement = MovementKind::Spawn;
        self.update_gravity_frequency();
    }

    fn spawn_position(&mut self, kind: PieceKind) -> Option<Point> {
        let shape = kind.shape();
        let y = kind.spawn_offset();
        if !self.config.mode().is_auto() {
            let size = i32::try_from(shape.size()).unwrap_or_default();
            let position = Point::new((self.playfield.width() - size) / 2, y);
            return (!self.playfield.hit_test(&shape, position)).then_some(position);
        }
        let bounds = shape.trimmed_bounds();
        let columns: Vec<i32> = (-bounds.x..=self.playfield.width() - bounds.right())
            .filter(|&x| !self.playfield.hit_test(&shape, Point::new(x, y)))
            .collect();
        columns
            .choose(&mut self.column_rng)
            .map(|&x| Point::new(x, y))
    }

    fn update_gravity_frequency(&mut self) {
        let level = self.stats.level();
        let mode = self.config.mode();
        let landing = self
            .active
            .is_some_and(|piece| piece.will_land(&self.playfield));
        let frequency = if landing {
            mode.landing_frequency(level)
        } else {
            mode.normal_frequency(level)
        };
        self.clock.set_frequency(frequency);
    }

    fn push_score_update(&mut self) {
        self.events.push(GameEvent::ScoreUpdate {
            lines: self.stats.lines(),
            score: self.stats.score(),
            level: self.stats.level(),
        });
    }

    fn game_over(&mut self) {
        if self.state.is_game_over() {
            return;
        }
        self.state = SessionState::GameOver;
        self.active = None;
        self.clock.stop();
        self.events.push(GameEvent::GameOver);
        info!(
            "game over: {} pieces, {} lines, score {}",
            self.stats.completed_pieces(),
            self.stats.lines(),
            self.stats.score()
        );
    }
}
