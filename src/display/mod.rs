//! Display collaborator.
//!
//! The engine publishes every visible change through `GameDisplay` and never
//! reads anything back. Implementations must not block: the dealer calls
//! these methods from inside its tick.
//!
//! - [`NullDisplay`]: discards everything
//! - [`TracingDisplay`]: logs every call at `debug` level
//! - [`RecordingDisplay`]: keeps an event log for tests and replays

mod recorder;

pub use recorder::{DisplayEvent, RecordingDisplay};

use crate::core::{CardId, PlayerId, SlotId};

/// One-way sink for board, score, and timer updates.
pub trait GameDisplay: Send + Sync {
    /// A card was dealt into a slot.
    fn place_card(&self, card: CardId, slot: SlotId);

    /// The card in a slot was taken away.
    fn remove_card(&self, slot: SlotId);

    /// A player marked a slot.
    fn place_token(&self, player: PlayerId, slot: SlotId);

    /// A player's mark was removed from a slot.
    fn remove_token(&self, player: PlayerId, slot: SlotId);

    /// Every mark on a slot was cleared.
    fn remove_tokens(&self, slot: SlotId);

    /// A player's score changed.
    fn set_score(&self, player: PlayerId, score: u32);

    /// Remaining round time; `warn` once below the warning threshold.
    fn set_countdown(&self, millis: u64, warn: bool);

    /// Time since the round started, for games without a countdown.
    fn set_elapsed(&self, millis: u64);

    /// Remaining freeze of a player; zero when the freeze ends.
    fn set_freeze(&self, player: PlayerId, millis: u64);

    /// The game ended with these winners.
    fn announce_winners(&self, winners: &[PlayerId]);
}

/// Display that discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay;

impl GameDisplay for NullDisplay {
    fn place_card(&self, _card: CardId, _slot: SlotId) {}
    fn remove_card(&self, _slot: SlotId) {}
    fn place_token(&self, _player: PlayerId, _slot: SlotId) {}
    fn remove_token(&self, _player: PlayerId, _slot: SlotId) {}
    fn remove_tokens(&self, _slot: SlotId) {}
    fn set_score(&self, _player: PlayerId, _score: u32) {}
    fn set_countdown(&self, _millis: u64, _warn: bool) {}
    fn set_elapsed(&self, _millis: u64) {}
    fn set_freeze(&self, _player: PlayerId, _millis: u64) {}
    fn announce_winners(&self, _winners: &[PlayerId]) {}
}

/// Display that writes every update to the `tracing` log.
///
/// Countdown and elapsed updates arrive every tick and are logged at
/// `trace` to keep `debug` output readable.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDisplay;

impl GameDisplay for TracingDisplay {
    fn place_card(&self, card: CardId, slot: SlotId) {
        tracing::debug!(%card, %slot, "card placed");
    }

    fn remove_card(&self, slot: SlotId) {
        tracing::debug!(%slot, "card removed");
    }

    fn place_token(&self, player: PlayerId, slot: SlotId) {
        tracing::debug!(%player, %slot, "token placed");
    }

    fn remove_token(&self, player: PlayerId, slot: SlotId) {
        tracing::debug!(%player, %slot, "token removed");
    }

    fn remove_tokens(&self, slot: SlotId) {
        tracing::debug!(%slot, "tokens cleared");
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        tracing::debug!(%player, score, "score");
    }

    fn set_countdown(&self, millis: u64, warn: bool) {
        tracing::trace!(millis, warn, "countdown");
    }

    fn set_elapsed(&self, millis: u64) {
        tracing::trace!(millis, "elapsed");
    }

    fn set_freeze(&self, player: PlayerId, millis: u64) {
        tracing::debug!(%player, millis, "freeze");
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        tracing::info!(?winners, "winners announced");
    }
}
