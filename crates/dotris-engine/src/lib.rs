pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reasons a [`GameConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("field dimensions must be positive, got {width}x{height}")]
    NonPositiveDimension { width: i32, height: i32 },
    #[display("field width must be at least 4, got {width}")]
    TooNarrow { width: i32 },
    #[display("at most 7 next pieces can be shown, got {count}")]
    TooManyNextPieces { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown game mode {name:?} (expected standard, endless or auto)")]
pub struct UnknownGameModeError {
    name: String,
}
