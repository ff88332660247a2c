use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, PieceKind, PieceSeed, UnknownGameModeError};

/// Narrowest field that fits every piece (the horizontal I).
pub const MIN_FIELD_WIDTH: i32 = 4;

/// Largest number of preview pieces; the queue always holds at least one bag.
pub const MAX_NEXT_COUNT: usize = PieceKind::LEN;

/// Highest level reachable, one level per 20 cleared lines.
pub const MAX_LEVEL: usize = 20;

/// How gravity behaves and who controls the pieces.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Gravity speeds up with the level.
    #[default]
    #[display("standard")]
    Standard,
    /// Fixed slow gravity.
    #[display("endless")]
    Endless,
    /// No player input; every piece spawns in a random column and is
    /// hard-dropped on the next tick.
    #[display("auto")]
    Auto,
}

impl FromStr for GameMode {
    type Err = UnknownGameModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(GameMode::Standard),
            "endless" => Ok(GameMode::Endless),
            "auto" => Ok(GameMode::Auto),
            _ => Err(UnknownGameModeError { name: s.to_owned() }),
        }
    }
}

impl GameMode {
    /// Gravity frequency (Hz) while the piece is falling freely.
    #[must_use]
    pub fn normal_frequency(self, level: usize) -> u32 {
        match self {
            GameMode::Standard => 1 + u32::try_from(level.min(MAX_LEVEL)).unwrap_or_default(),
            GameMode::Endless => 1,
            GameMode::Auto => 30,
        }
    }

    /// Gravity frequency (Hz) while the piece rests on the stack.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotris_engine::GameMode;
    ///
    /// assert_eq!(GameMode::Standard.landing_frequency(0), 4);
    /// assert_eq!(GameMode::Standard.landing_frequency(10), 11);
    /// assert_eq!(GameMode::Endless.landing_frequency(10), 4);
    /// ```
    #[must_use]
    pub fn landing_frequency(self, level: usize) -> u32 {
        match self {
            GameMode::Standard => self.normal_frequency(level).max(4),
            GameMode::Endless => 4,
            GameMode::Auto => 30,
        }
    }
}

/// Settings a [`GameSession`](crate::GameSession) is created from.
///
/// # Example
///
/// ```
/// use dotris_engine::{GameConfig, GameMode};
///
/// let config = GameConfig::new(12, 24)
///     .with_mode(GameMode::Endless)
///     .with_next_count(3);
/// assert!(config.validate().is_ok());
///
/// assert!(GameConfig::new(3, 20).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    field_width: i32,
    field_height: i32,
    mode: GameMode,
    next_count: usize,
    color_scheme: String,
    seed: Option<PieceSeed>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(10, 20)
    }
}

impl GameConfig {
    pub const DEFAULT_NEXT_COUNT: usize = 5;
    pub const DEFAULT_COLOR_SCHEME: &'static str = "standard";

    /// Creates a standard-mode configuration for a `width`×`height` field.
    #[must_use]
    pub fn new(field_width: i32, field_height: i32) -> Self {
        Self {
            field_width,
            field_height,
            mode: GameMode::Standard,
            next_count: Self::DEFAULT_NEXT_COUNT,
            color_scheme: Self::DEFAULT_COLOR_SCHEME.to_owned(),
            seed: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_next_count(mut self, next_count: usize) -> Self {
        self.next_count = next_count;
        self
    }

    /// Sets the color scheme name. The engine only passes it through.
    #[must_use]
    pub fn with_color_scheme(mut self, color_scheme: impl Into<String>) -> Self {
        self.color_scheme = color_scheme.into();
        self
    }

    /// Fixes the piece sequence. Without a seed every session is random.
    #[must_use]
    pub fn with_seed(mut self, seed: PieceSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn field_width(&self) -> i32 {
        self.field_width
    }

    #[must_use]
    pub const fn field_height(&self) -> i32 {
        self.field_height
    }

    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub const fn next_count(&self) -> usize {
        self.next_count
    }

    #[must_use]
    pub fn color_scheme(&self) -> &str {
        &self.color_scheme
    }

    #[must_use]
    pub const fn seed(&self) -> Option<PieceSeed> {
        self.seed
    }

    /// Checks the configuration without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_width <= 0 || self.field_height <= 0 {
            return Err(ConfigError::NonPositiveDimension {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if self.field_width < MIN_FIELD_WIDTH {
            return Err(ConfigError::TooNarrow {
                width: self.field_width,
            });
        }
        if self.next_count > MAX_NEXT_COUNT {
            return Err(ConfigError::TooManyNextPieces {
                count: self.next_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!((config.field_width(), config.field_height()), (10, 20));
        assert_eq!(config.mode(), GameMode::Standard);
        assert_eq!(config.next_count(), 5);
        assert_eq!(config.color_scheme(), "standard");
        assert_eq!(config.seed(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        assert_eq!(
            GameConfig::new(0, 20).validate(),
            Err(ConfigError::NonPositiveDimension {
                width: 0,
                height: 20
            })
        );
        assert_eq!(
            GameConfig::new(10, -1).validate(),
            Err(ConfigError::NonPositiveDimension {
                width: 10,
                height: -1
            })
        );
        assert_eq!(
            GameConfig::new(3, 20).validate(),
            Err(ConfigError::TooNarrow { width: 3 })
        );
        assert!(GameConfig::new(MIN_FIELD_WIDTH, 1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_long_preview() {
        let config = GameConfig::default().with_next_count(MAX_NEXT_COUNT + 1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyNextPieces { count: 8 })
        );
        assert!(
            GameConfig::default()
                .with_next_count(0)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_game_mode_parse_and_display() {
        for mode in [GameMode::Standard, GameMode::Endless, GameMode::Auto] {
            assert_eq!(mode.to_string().parse::<GameMode>(), Ok(mode));
        }
        let err = "turbo".parse::<GameMode>().unwrap_err();
        assert!(err.to_string().contains("turbo"));
    }

    #[test]
    fn test_frequencies() {
        assert_eq!(GameMode::Standard.normal_frequency(0), 1);
        assert_eq!(GameMode::Standard.normal_frequency(5), 6);
        assert_eq!(GameMode::Standard.landing_frequency(5), 6);
        assert_eq!(GameMode::Standard.normal_frequency(100), 21);
        assert_eq!(GameMode::Endless.normal_frequency(7), 1);
        assert_eq!(GameMode::Auto.normal_frequency(0), 30);
        assert_eq!(GameMode::Auto.landing_frequency(0), 30);
    }

    #[test]
    fn test_config_serialization() {
        let config = GameConfig::new(8, 16).with_mode(GameMode::Auto);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["mode"], "auto");
        assert_eq!(json["field_width"], 8);
        let back: GameConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
