//! # set-engine
//!
//! A concurrent dealer/player engine for the card game Set.
//!
//! ## Design Principles
//!
//! 1. **One authority over cards**: only the dealer deals, removes, and
//!    reshuffles. Players touch nothing but their own tokens.
//!
//! 2. **Fine-grained locking**: one lock per slot, per claim buffer, and for
//!    the claim queue. There is no global game lock.
//!
//! 3. **Pluggable collaborators**: the set rule (`SetOracle`) and the output
//!    (`GameDisplay`) are traits supplied at construction.
//!
//! ## Architecture
//!
//! - **Claims are optimistic**: several players may mark the same slot. The
//!   first valid claim drained from the queue takes the cards and evicts the
//!   other players' tokens.
//!
//! - **FIFO fairness**: complete claims are validated in submission order.
//!
//! - **Deterministic shutdown**: automation threads stop before player
//!   threads, and every wait is released by termination.
//!
//! ## Modules
//!
//! - `core`: identifiers, per-player storage, RNG, configuration
//! - `error`: configuration and assembly errors
//! - `rules`: `SetOracle` trait and the standard feature rule
//! - `display`: `GameDisplay` trait and stock implementations
//! - `table`: slots and the board
//! - `claims`: claim buffers and the claim queue
//! - `actors`: player threads and automated key presses
//! - `dealer`: the game loop, round timer, and winner computation

pub mod core;
pub mod error;
pub mod rules;
pub mod display;
pub mod table;
pub mod claims;
pub mod actors;
pub mod dealer;

// Re-export commonly used types
pub use crate::core::{CardId, GameConfig, GameRng, PlayerId, PlayerMap, SlotId};

pub use crate::error::{ConfigError, EngineError};

pub use crate::rules::{CardSet, FeatureOracle, SetOracle};

pub use crate::display::{DisplayEvent, GameDisplay, NullDisplay, RecordingDisplay, TracingDisplay};

pub use crate::table::{Board, Hint, RemovedCard, Slot, TokenSet, TokenToggle};

pub use crate::claims::{Claim, ClaimQueue, ClaimToggle};

pub use crate::actors::{ActorPhase, AutomatedPlayer, Outcome, Player, Signal};

pub use crate::dealer::{winners, Countdown, Dealer, DealerHandle, DealerPhase, GameOutcome};
