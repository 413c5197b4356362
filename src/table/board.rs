//! The shared board: slots, the card↔slot mapping, and token bookkeeping.
//!
//! Card placement and removal are reserved to the dealer thread. Tokens are
//! toggled by any player thread and force-cleared when a card leaves. Each
//! slot has its own lock; the card→slot index has one more, always taken
//! before a slot lock and never while a slot lock is held.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{CardId, PlayerId, SlotId};
use crate::display::GameDisplay;
use crate::rules::SetOracle;

use super::slot::{Slot, TokenSet};

/// Result of toggling one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenToggle {
    /// The player now holds a token on the slot.
    Placed,
    /// The player's token was taken off the slot.
    Removed,
    /// Nothing changed: the slot holds no card.
    Rejected,
}

/// A card taken off the board together with the tokens it carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovedCard {
    pub card: CardId,
    pub slot: SlotId,
    pub evicted: TokenSet,
}

/// A valid set currently on the board, for hint output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint {
    pub slots: Vec<SlotId>,
    pub features: Vec<Vec<u8>>,
}

/// Grid of slots plus the reverse card index.
///
/// ## Invariant
///
/// `card_at(slot_of(c)) == Some(c)` for every placed card and
/// `slot_of(card_at(s)) == Some(s)` for every occupied slot.
pub struct Board {
    slots: Vec<Slot>,
    card_slots: RwLock<Vec<Option<SlotId>>>,
    display: Arc<dyn GameDisplay>,
}

impl Board {
    /// Create an empty board for a deck of `deck_size` cards.
    pub fn new(table_size: usize, deck_size: usize, display: Arc<dyn GameDisplay>) -> Self {
        Self {
            slots: SlotId::all(table_size).map(Slot::new).collect(),
            card_slots: RwLock::new(vec![None; deck_size]),
            display,
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Access a slot.
    #[must_use]
    pub fn slot(&self, slot: SlotId) -> Option<&Slot> {
        self.slots.get(slot.index())
    }

    /// The card in a slot.
    #[must_use]
    pub fn card_at(&self, slot: SlotId) -> Option<CardId> {
        self.slot(slot)?.card()
    }

    /// The slot holding a card.
    #[must_use]
    pub fn slot_of(&self, card: CardId) -> Option<SlotId> {
        self.card_slots.read().get(card.index()).copied().flatten()
    }

    /// Every card on the board, in slot order.
    #[must_use]
    pub fn cards_on_board(&self) -> Vec<CardId> {
        self.slots.iter().filter_map(Slot::card).collect()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn count_cards(&self) -> usize {
        self.slots.iter().filter(|s| s.card().is_some()).count()
    }

    /// Slots currently without a card, in order.
    #[must_use]
    pub fn empty_slots(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|s| s.card().is_none())
            .map(Slot::id)
            .collect()
    }

    /// Players holding a token on a slot.
    #[must_use]
    pub fn tokens_at(&self, slot: SlotId) -> TokenSet {
        self.slot(slot).map(Slot::tokens).unwrap_or_default()
    }

    /// Slots where a player holds a token, in slot order.
    #[must_use]
    pub fn tokens_of(&self, player: PlayerId) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|s| s.has_token(player))
            .map(Slot::id)
            .collect()
    }

    /// Deal a card into a slot.
    ///
    /// No-op returning false if the slot is occupied, out of range, or the
    /// card is already on the board.
    pub fn place_card(&self, card: CardId, slot: SlotId) -> bool {
        let mut card_slots = self.card_slots.write();
        let Some(entry) = card_slots.get_mut(card.index()) else {
            return false;
        };
        if entry.is_some() {
            return false;
        }
        let Some(target) = self.slots.get(slot.index()) else {
            return false;
        };
        if !target.place_card(card) {
            return false;
        }
        *entry = Some(slot);
        drop(card_slots);

        self.display.place_card(card, slot);
        true
    }

    /// Take the card out of a slot, evicting every token on it.
    ///
    /// No-op returning `None` if the slot is already empty.
    pub fn remove_card(&self, slot: SlotId) -> Option<RemovedCard> {
        let mut card_slots = self.card_slots.write();
        let (card, evicted) = self.slot(slot)?.take_card()?;
        debug_assert_eq!(card_slots[card.index()], Some(slot), "card index out of sync");
        card_slots[card.index()] = None;
        drop(card_slots);

        self.display.remove_card(slot);
        if !evicted.is_empty() {
            self.display.remove_tokens(slot);
            for &player in &evicted {
                self.display.remove_token(player, slot);
            }
        }
        Some(RemovedCard { card, slot, evicted })
    }

    /// Put a player's token on a slot that holds a card.
    ///
    /// Idempotent per (player, slot). Returns whether the token is present.
    pub fn place_token(&self, player: PlayerId, slot: SlotId) -> bool {
        match self.slot(slot).and_then(|s| s.add_token(player)) {
            Some(true) => {
                self.display.place_token(player, slot);
                true
            }
            Some(false) => true,
            None => false,
        }
    }

    /// Take a player's token off a slot. Returns false if there was none.
    pub fn remove_token(&self, player: PlayerId, slot: SlotId) -> bool {
        let removed = self.slot(slot).is_some_and(|s| s.remove_token(player));
        if removed {
            self.display.remove_token(player, slot);
        }
        removed
    }

    /// Flip a player's token on a slot.
    pub fn toggle_token(&self, player: PlayerId, slot: SlotId) -> TokenToggle {
        match self.slot(slot).and_then(|s| s.toggle_token(player)) {
            Some(true) => {
                self.display.place_token(player, slot);
                TokenToggle::Placed
            }
            Some(false) => {
                self.display.remove_token(player, slot);
                TokenToggle::Removed
            }
            None => TokenToggle::Rejected,
        }
    }

    /// Remove every token a player holds. Returns the slots cleared.
    pub fn clear_tokens(&self, player: PlayerId) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|s| s.remove_token(player))
            .map(|s| {
                self.display.remove_token(player, s.id());
                s.id()
            })
            .collect()
    }

    /// Remove every token on every slot.
    pub fn clear_all_tokens(&self) {
        for slot in &self.slots {
            let evicted = slot.clear_tokens();
            if !evicted.is_empty() {
                self.display.remove_tokens(slot.id());
                for &player in &evicted {
                    self.display.remove_token(player, slot.id());
                }
            }
        }
    }

    /// Every valid set on the board, with slots sorted and card features.
    pub fn hints(&self, oracle: &dyn SetOracle) -> Vec<Hint> {
        let cards = self.cards_on_board();
        oracle
            .find_sets(&cards, usize::MAX)
            .into_iter()
            .map(|set| {
                let mut slots: Vec<SlotId> = set.iter().filter_map(|&c| self.slot_of(c)).collect();
                slots.sort_unstable();
                Hint {
                    slots,
                    features: oracle.card_features(&set),
                }
            })
            .collect()
    }

    /// Check the card↔slot mapping in both directions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let card_slots = self.card_slots.read();
        let forward = self.slots.iter().all(|s| match s.card() {
            Some(card) => card_slots.get(card.index()).copied().flatten() == Some(s.id()),
            None => true,
        });
        let backward = card_slots.iter().enumerate().all(|(card, slot)| match slot {
            Some(slot) => self.card_at(*slot) == Some(CardId(card as u32)),
            None => true,
        });
        forward && backward
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}
