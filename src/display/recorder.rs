//! Recording display.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId, SlotId};

use super::GameDisplay;

/// One published display update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayEvent {
    PlaceCard { card: CardId, slot: SlotId },
    RemoveCard { slot: SlotId },
    PlaceToken { player: PlayerId, slot: SlotId },
    RemoveToken { player: PlayerId, slot: SlotId },
    RemoveTokens { slot: SlotId },
    Score { player: PlayerId, score: u32 },
    Countdown { millis: u64, warn: bool },
    Elapsed { millis: u64 },
    Freeze { player: PlayerId, millis: u64 },
    Winners { players: Vec<PlayerId> },
}

impl DisplayEvent {
    /// Whether this event is a per-tick timer update.
    #[must_use]
    pub fn is_timer(&self) -> bool {
        matches!(self, DisplayEvent::Countdown { .. } | DisplayEvent::Elapsed { .. })
    }
}

/// Display that records every update in order.
///
/// ```
/// use set_engine::core::{CardId, SlotId};
/// use set_engine::display::{DisplayEvent, GameDisplay, RecordingDisplay};
///
/// let display = RecordingDisplay::new();
/// display.place_card(CardId(4), SlotId(0));
/// assert_eq!(
///     display.events(),
///     vec![DisplayEvent::PlaceCard { card: CardId(4), slot: SlotId(0) }]
/// );
/// ```
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
    record_timers: bool,
}

impl RecordingDisplay {
    /// Create a recorder that skips countdown/elapsed updates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder that also keeps the per-tick timer updates.
    #[must_use]
    pub fn with_timers() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            record_timers: true,
        }
    }

    /// Snapshot of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().clone()
    }

    /// Recorded events matching a predicate.
    pub fn filter(&self, predicate: impl Fn(&DisplayEvent) -> bool) -> Vec<DisplayEvent> {
        self.events.lock().iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// The announced winners, if the game reached its end.
    #[must_use]
    pub fn winners(&self) -> Option<Vec<PlayerId>> {
        self.events.lock().iter().rev().find_map(|e| match e {
            DisplayEvent::Winners { players } => Some(players.clone()),
            _ => None,
        })
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, event: DisplayEvent) {
        if event.is_timer() && !self.record_timers {
            return;
        }
        self.events.lock().push(event);
    }
}

impl GameDisplay for RecordingDisplay {
    fn place_card(&self, card: CardId, slot: SlotId) {
        self.push(DisplayEvent::PlaceCard { card, slot });
    }

    fn remove_card(&self, slot: SlotId) {
        self.push(DisplayEvent::RemoveCard { slot });
    }

    fn place_token(&self, player: PlayerId, slot: SlotId) {
        self.push(DisplayEvent::PlaceToken { player, slot });
    }

    fn remove_token(&self, player: PlayerId, slot: SlotId) {
        self.push(DisplayEvent::RemoveToken { player, slot });
    }

    fn remove_tokens(&self, slot: SlotId) {
        self.push(DisplayEvent::RemoveTokens { slot });
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.push(DisplayEvent::Score { player, score });
    }

    fn set_countdown(&self, millis: u64, warn: bool) {
        self.push(DisplayEvent::Countdown { millis, warn });
    }

    fn set_elapsed(&self, millis: u64) {
        self.push(DisplayEvent::Elapsed { millis });
    }

    fn set_freeze(&self, player: PlayerId, millis: u64) {
        self.push(DisplayEvent::Freeze { player, millis });
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        self.push(DisplayEvent::Winners {
            players: winners.to_vec(),
        });
    }
}
