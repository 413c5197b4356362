//! Card and slot identifiers.
//!
//! Cards are opaque integers drawn from `0..deck_size`. The engine never
//! looks inside a card; only the oracle derives features from it.
//! Slots are board positions `0..table_size`.

use serde::{Deserialize, Serialize};

/// Card identifier.
///
/// ```
/// use set_engine::core::CardId;
///
/// let card = CardId::new(17);
/// assert_eq!(card.index(), 17);
/// assert_eq!(format!("{}", card), "Card(17)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the card as an index into card-indexed tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Iterate over the full card universe of a deck.
    pub fn all(deck_size: usize) -> impl Iterator<Item = CardId> {
        (0..deck_size as u32).map(CardId)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Board position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u16);

impl SlotId {
    /// Create a new slot ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the slot as an index into the slot array.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every slot of a board with `table_size` slots.
    pub fn all(table_size: usize) -> impl Iterator<Item = SlotId> {
        (0..table_size as u16).map(SlotId)
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}
