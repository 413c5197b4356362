//! Game configuration.
//!
//! The engine reads its configuration once, at construction. Timing values
//! are stored in milliseconds (matching how they are written in config files
//! and environment variables) and exposed as `Duration` through accessors.
//!
//! Three ways to obtain a config:
//! - `GameConfig::default()` plus `with_*` builder methods
//! - `GameConfig::from_env()`: defaults overlaid with `SET_*` variables
//! - `GameConfig::from_json()`: a serialized config

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of players (1-255).
    pub players: usize,

    /// Players `0..human_players` are human; the rest are automated.
    pub human_players: usize,

    /// Number of board slots.
    pub table_size: usize,

    /// Size of the card universe `0..deck_size`.
    pub deck_size: usize,

    /// Cards per claim.
    pub feature_size: usize,

    /// Features per card, used by the standard oracle.
    pub feature_count: usize,

    /// Round countdown. Zero means no countdown: a round lasts until the
    /// board holds no valid set.
    pub turn_timeout_millis: u64,

    /// Remaining time below which the countdown is shown as a warning.
    pub turn_timeout_warning_millis: u64,

    /// Restart the countdown when a collected set is replaced from the deck.
    pub reset_countdown_on_set: bool,

    /// Freeze after a valid claim.
    pub point_freeze_millis: u64,

    /// Freeze after an invalid claim.
    pub penalty_freeze_millis: u64,

    /// Step in which a freeze is counted down and published.
    pub freeze_step_millis: u64,

    /// Delay per card while dealing a full board.
    pub table_delay_millis: u64,

    /// Pause after the winners are announced.
    pub end_game_pause_millis: u64,

    /// Tick used near the deadline or right after a card placement.
    pub fast_tick_millis: u64,

    /// Tick used otherwise.
    pub slow_tick_millis: u64,

    /// Log every valid set on the board each tick.
    pub hints: bool,

    /// Probability that an automated player goes for a real set.
    pub ai_set_probability: f64,

    /// Upper bound on the pause between automated key presses.
    pub ai_max_delay_millis: u64,

    /// Seed for the deck shuffle and automated players.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 2,
            human_players: 0,
            table_size: 12,
            deck_size: 81,
            feature_size: 3,
            feature_count: 4,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            reset_countdown_on_set: true,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            freeze_step_millis: 1_000,
            table_delay_millis: 100,
            end_game_pause_millis: 5_000,
            fast_tick_millis: 10,
            slow_tick_millis: 100,
            hints: false,
            ai_set_probability: 0.25,
            ai_max_delay_millis: 2_000,
            seed: 42,
        }
    }
}

impl GameConfig {
    /// Create a default configuration with the given number of players.
    pub fn new(players: usize) -> Self {
        Self {
            players,
            ..Self::default()
        }
    }

    /// Set how many of the players are human.
    #[must_use]
    pub fn with_human_players(mut self, humans: usize) -> Self {
        self.human_players = humans;
        self
    }

    /// Set board and deck dimensions.
    #[must_use]
    pub fn with_table(mut self, table_size: usize, deck_size: usize) -> Self {
        self.table_size = table_size;
        self.deck_size = deck_size;
        self
    }

    /// Set claim size and features per card.
    #[must_use]
    pub fn with_features(mut self, feature_size: usize, feature_count: usize) -> Self {
        self.feature_size = feature_size;
        self.feature_count = feature_count;
        self
    }

    /// Set the round countdown and its warning threshold.
    #[must_use]
    pub fn with_turn_timeout(mut self, timeout: Duration, warning: Duration) -> Self {
        self.turn_timeout_millis = timeout.as_millis() as u64;
        self.turn_timeout_warning_millis = warning.as_millis() as u64;
        self
    }

    /// Set point and penalty freeze durations.
    #[must_use]
    pub fn with_freezes(mut self, point: Duration, penalty: Duration) -> Self {
        self.point_freeze_millis = point.as_millis() as u64;
        self.penalty_freeze_millis = penalty.as_millis() as u64;
        self
    }

    /// Set the per-card dealing delay.
    #[must_use]
    pub fn with_table_delay(mut self, delay: Duration) -> Self {
        self.table_delay_millis = delay.as_millis() as u64;
        self
    }

    /// Set the pause after announcing winners.
    #[must_use]
    pub fn with_end_game_pause(mut self, pause: Duration) -> Self {
        self.end_game_pause_millis = pause.as_millis() as u64;
        self
    }

    /// Set fast and slow tick intervals.
    #[must_use]
    pub fn with_ticks(mut self, fast: Duration, slow: Duration) -> Self {
        self.fast_tick_millis = fast.as_millis() as u64;
        self.slow_tick_millis = slow.as_millis() as u64;
        self
    }

    /// Tune automated play.
    #[must_use]
    pub fn with_ai(mut self, set_probability: f64, max_delay: Duration) -> Self {
        self.ai_set_probability = set_probability;
        self.ai_max_delay_millis = max_delay.as_millis() as u64;
        self
    }

    /// Enable or disable hint output.
    #[must_use]
    pub fn with_hints(mut self, hints: bool) -> Self {
        self.hints = hints;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 || self.players > 255 {
            return Err(ConfigError::PlayerCount(self.players));
        }
        if self.human_players > self.players {
            return Err(ConfigError::TooManyHumans {
                humans: self.human_players,
                players: self.players,
            });
        }
        if !(2..=u8::MAX as usize).contains(&self.feature_size) {
            return Err(ConfigError::FeatureSize(self.feature_size));
        }
        if self.table_size < self.feature_size {
            return Err(ConfigError::TableTooSmall {
                table_size: self.table_size,
                feature_size: self.feature_size,
            });
        }
        if self.table_size > u16::MAX as usize {
            return Err(ConfigError::TableTooLarge(self.table_size));
        }
        if self.deck_size < self.feature_size {
            return Err(ConfigError::DeckTooSmall {
                deck_size: self.deck_size,
                feature_size: self.feature_size,
            });
        }
        if self.fast_tick_millis == 0 || self.fast_tick_millis > self.slow_tick_millis {
            return Err(ConfigError::TickIntervals {
                fast: self.fast_tick_millis,
                slow: self.slow_tick_millis,
            });
        }
        if !(0.0..=1.0).contains(&self.ai_set_probability) {
            return Err(ConfigError::Probability(self.ai_set_probability));
        }
        Ok(())
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Construct configuration from process environment variables.
    ///
    /// - `SET_PLAYERS` / `SET_HUMAN_PLAYERS`
    /// - `SET_TABLE_SIZE` / `SET_DECK_SIZE`
    /// - `SET_FEATURE_SIZE` / `SET_FEATURE_COUNT`
    /// - `SET_TURN_TIMEOUT_MILLIS` / `SET_TURN_TIMEOUT_WARNING_MILLIS`
    /// - `SET_POINT_FREEZE_MILLIS` / `SET_PENALTY_FREEZE_MILLIS`
    /// - `SET_TABLE_DELAY_MILLIS` / `SET_END_GAME_PAUSE_MILLIS`
    /// - `SET_HINTS`, `SET_AI_SET_PROBABILITY`, `SET_AI_MAX_DELAY_MILLIS`, `SET_SEED`
    ///
    /// Unset or unparsable variables leave the default in place.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        overlay(&mut config.players, "SET_PLAYERS");
        overlay(&mut config.human_players, "SET_HUMAN_PLAYERS");
        overlay(&mut config.table_size, "SET_TABLE_SIZE");
        overlay(&mut config.deck_size, "SET_DECK_SIZE");
        overlay(&mut config.feature_size, "SET_FEATURE_SIZE");
        overlay(&mut config.feature_count, "SET_FEATURE_COUNT");
        overlay(&mut config.turn_timeout_millis, "SET_TURN_TIMEOUT_MILLIS");
        overlay(&mut config.turn_timeout_warning_millis, "SET_TURN_TIMEOUT_WARNING_MILLIS");
        overlay(&mut config.point_freeze_millis, "SET_POINT_FREEZE_MILLIS");
        overlay(&mut config.penalty_freeze_millis, "SET_PENALTY_FREEZE_MILLIS");
        overlay(&mut config.table_delay_millis, "SET_TABLE_DELAY_MILLIS");
        overlay(&mut config.end_game_pause_millis, "SET_END_GAME_PAUSE_MILLIS");
        overlay(&mut config.hints, "SET_HINTS");
        overlay(&mut config.ai_set_probability, "SET_AI_SET_PROBABILITY");
        overlay(&mut config.ai_max_delay_millis, "SET_AI_MAX_DELAY_MILLIS");
        overlay(&mut config.seed, "SET_SEED");

        config
    }

    /// Number of automated players.
    #[must_use]
    pub fn automated_players(&self) -> usize {
        self.players.saturating_sub(self.human_players)
    }

    /// Whether rounds run against a countdown.
    #[must_use]
    pub fn has_countdown(&self) -> bool {
        self.turn_timeout_millis > 0
    }

    #[must_use]
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_millis)
    }

    #[must_use]
    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }

    #[must_use]
    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    #[must_use]
    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    /// Freeze publication step; never zero.
    #[must_use]
    pub fn freeze_step(&self) -> Duration {
        Duration::from_millis(self.freeze_step_millis.max(1))
    }

    #[must_use]
    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_millis)
    }

    #[must_use]
    pub fn end_game_pause(&self) -> Duration {
        Duration::from_millis(self.end_game_pause_millis)
    }

    #[must_use]
    pub fn fast_tick(&self) -> Duration {
        Duration::from_millis(self.fast_tick_millis)
    }

    #[must_use]
    pub fn slow_tick(&self) -> Duration {
        Duration::from_millis(self.slow_tick_millis)
    }

    #[must_use]
    pub fn ai_max_delay(&self) -> Duration {
        Duration::from_millis(self.ai_max_delay_millis)
    }
}

fn overlay<T>(slot: &mut T, key: &str)
where
    T: std::str::FromStr,
{
    if let Some(value) = env::var(key).ok().and_then(|v| v.parse().ok()) {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.feature_size, 3);
        assert_eq!(config.automated_players(), 2);
        assert!(config.has_countdown());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GameConfig::new(4)
            .with_human_players(1)
            .with_table(6, 9)
            .with_features(3, 2)
            .with_turn_timeout(Duration::ZERO, Duration::ZERO)
            .with_freezes(Duration::from_millis(5), Duration::from_millis(50))
            .with_seed(7);

        assert_eq!(config.players, 4);
        assert_eq!(config.automated_players(), 3);
        assert_eq!(config.table_size, 6);
        assert_eq!(config.deck_size, 9);
        assert!(!config.has_countdown());
        assert_eq!(config.point_freeze(), Duration::from_millis(5));
        assert_eq!(config.penalty_freeze(), Duration::from_millis(50));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            GameConfig::new(2).with_features(300, 1).validate(),
            Err(ConfigError::FeatureSize(300))
        ));
        assert!(matches!(
            GameConfig::new(0).validate(),
            Err(ConfigError::PlayerCount(0))
        ));
        assert!(matches!(
            GameConfig::new(2).with_human_players(3).validate(),
            Err(ConfigError::TooManyHumans { humans: 3, players: 2 })
        ));
        assert!(matches!(
            GameConfig::new(2).with_table(2, 81).validate(),
            Err(ConfigError::TableTooSmall { .. })
        ));
        assert!(matches!(
            GameConfig::new(2).with_table(12, 2).validate(),
            Err(ConfigError::DeckTooSmall { .. })
        ));
        assert!(matches!(
            GameConfig::new(2)
                .with_ticks(Duration::from_millis(50), Duration::from_millis(10))
                .validate(),
            Err(ConfigError::TickIntervals { .. })
        ));
        assert!(matches!(
            GameConfig::new(2).with_ai(1.5, Duration::ZERO).validate(),
            Err(ConfigError::Probability(_))
        ));
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let config = GameConfig::from_json(r#"{ "players": 3, "hints": true }"#).unwrap();
        assert_eq!(config.players, 3);
        assert!(config.hints);
        assert_eq!(config.table_size, 12);

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GameConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_json_invalid() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "players": 0 }"#),
            Err(ConfigError::PlayerCount(0))
        ));
    }

    #[test]
    fn test_freeze_step_never_zero() {
        let mut config = GameConfig::default();
        config.freeze_step_millis = 0;
        assert_eq!(config.freeze_step(), Duration::from_millis(1));
    }
}
