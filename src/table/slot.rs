//! A single board slot.
//!
//! The card and the token set share one lock per slot, so a token can never
//! be added to a slot whose card is being removed: either the toggle sees the
//! card and the removal evicts the new token, or the toggle sees an empty slot.

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::core::{CardId, PlayerId, SlotId};

/// Players holding a token on one slot.
pub type TokenSet = SmallVec<[PlayerId; 4]>;

#[derive(Debug, Default)]
struct SlotState {
    card: Option<CardId>,
    tokens: TokenSet,
}

/// Board position holding at most one card and any number of tokens.
#[derive(Debug)]
pub struct Slot {
    id: SlotId,
    state: Mutex<SlotState>,
}

impl Slot {
    /// Create an empty slot.
    #[must_use]
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            state: Mutex::new(SlotState::default()),
        }
    }

    /// This slot's position.
    #[must_use]
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// The card in this slot, if any.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        self.state.lock().card
    }

    /// Snapshot of the players holding a token here.
    #[must_use]
    pub fn tokens(&self) -> TokenSet {
        self.state.lock().tokens.clone()
    }

    /// Whether `player` holds a token here.
    #[must_use]
    pub fn has_token(&self, player: PlayerId) -> bool {
        self.state.lock().tokens.contains(&player)
    }

    /// Put a card in the slot. Returns false if it was occupied.
    pub(crate) fn place_card(&self, card: CardId) -> bool {
        let mut state = self.state.lock();
        if state.card.is_some() {
            return false;
        }
        state.card = Some(card);
        true
    }

    /// Take the card and every token with it.
    pub(crate) fn take_card(&self) -> Option<(CardId, TokenSet)> {
        let mut state = self.state.lock();
        let card = state.card.take()?;
        Some((card, std::mem::take(&mut state.tokens)))
    }

    /// Add a token if the slot holds a card.
    ///
    /// Returns `Some(true)` if added, `Some(false)` if already present,
    /// `None` if the slot is empty.
    pub(crate) fn add_token(&self, player: PlayerId) -> Option<bool> {
        let mut state = self.state.lock();
        state.card?;
        if state.tokens.contains(&player) {
            return Some(false);
        }
        state.tokens.push(player);
        Some(true)
    }

    /// Remove a token. Returns false if the player held none here.
    pub(crate) fn remove_token(&self, player: PlayerId) -> bool {
        let mut state = self.state.lock();
        match state.tokens.iter().position(|&p| p == player) {
            Some(pos) => {
                state.tokens.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove the token if present, otherwise add it (card permitting).
    ///
    /// Returns `Some(true)` if a token is now present, `Some(false)` if it
    /// was removed, `None` if nothing changed.
    pub(crate) fn toggle_token(&self, player: PlayerId) -> Option<bool> {
        let mut state = self.state.lock();
        if let Some(pos) = state.tokens.iter().position(|&p| p == player) {
            state.tokens.remove(pos);
            return Some(false);
        }
        state.card?;
        state.tokens.push(player);
        Some(true)
    }

    /// Clear every token, returning who held them.
    pub(crate) fn clear_tokens(&self) -> TokenSet {
        std::mem::take(&mut self.state.lock().tokens)
    }
}
