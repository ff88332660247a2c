//! Game rules and session state.
//!
//! This module builds the gameplay on top of the core data structures:
//!
//! - [`GameSession`] - Owns the field, the falling piece and the gravity clock
//! - [`GameConfig`] / [`GameMode`] - Field size, preview length, gravity mode and seed
//! - [`PieceBuffer`] - 7-bag piece queue with the hold slot
//! - [`PieceSeed`] - Seed for a reproducible piece sequence
//! - [`GravityClock`] - Turns elapsed time into gravity ticks
//! - [`evaluate_lock`] / [`detect_spin`] - Clear classification and scoring
//! - [`GameStats`] - Lines, score, level and back-to-back state
//! - [`GameEvent`] - Notifications for the front end
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from a validated [`GameConfig`]
//! 2. [`GameSession::start`] spawns the first piece and starts gravity
//! 3. The front end forwards intents (move, rotate, hold, drops) and elapsed time
//! 4. Each lock scores the clear and spawns the next piece
//! 5. The game ends when a piece cannot spawn or locks inside the spawn buffer
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use dotris_engine::{GameConfig, GameMode, GameSession};
//!
//! let config = GameConfig::new(10, 20).with_mode(GameMode::Auto);
//! let mut session = GameSession::new(config).unwrap();
//! session.start();
//!
//! while !session.is_over() {
//!     session.advance(Duration::from_millis(100));
//! }
//!
//! let summary = session.quit();
//! println!("{} pieces, score {}", summary.stats.completed_pieces(), summary.stats.score());
//! ```

pub use self::{
    clock::*, config::*, event::*, game_session::*, game_stats::*, piece_buffer::*, scoring::*,
};

mod clock;
mod config;
mod event;
mod game_session;
mod game_stats;
mod piece_buffer;
mod scoring;
