//! Error types for engine construction.
//!
//! Only setup can fail. Once `Dealer::run` starts, every abnormal condition
//! (stale claims, interrupted waits, an exhausted deck) is absorbed by the
//! engine itself.

use thiserror::Error;

/// Invalid or unreadable game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("player count must be between 1 and 255, got {0}")]
    PlayerCount(usize),

    #[error("{humans} human players requested but only {players} players configured")]
    TooManyHumans { humans: usize, players: usize },

    #[error("feature size must be between 2 and 255, got {0}")]
    FeatureSize(usize),

    #[error("table of {table_size} slots cannot hold a claim of {feature_size} cards")]
    TableTooSmall { table_size: usize, feature_size: usize },

    #[error("deck of {deck_size} cards cannot form a claim of {feature_size} cards")]
    DeckTooSmall { deck_size: usize, feature_size: usize },

    #[error("table size {0} exceeds the slot id range")]
    TableTooLarge(usize),

    #[error("tick intervals must be non-zero with fast <= slow (fast {fast}ms, slow {slow}ms)")]
    TickIntervals { fast: u64, slow: u64 },

    #[error("automated set probability must be within [0, 1], got {0}")]
    Probability(f64),

    #[error("failed to parse configuration")]
    Parse(#[from] serde_json::Error),
}

/// Failure to assemble an engine from its collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("oracle judges claims of {oracle} cards but the game uses {config}")]
    OracleMismatch { oracle: usize, config: usize },

    #[error("deck of {deck_size} cards exceeds the {limit} cards the oracle can describe")]
    DeckExceedsOracle { deck_size: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
