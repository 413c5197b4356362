//! Core engine types: identifiers, per-player storage, RNG, configuration.
//!
//! Everything here is plain data with no threading concerns. The shared,
//! lock-protected state lives in `table`, `claims`, and `actors`.

pub mod card;
pub mod player;
pub mod rng;
pub mod config;

pub use card::{CardId, SlotId};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use config::GameConfig;
