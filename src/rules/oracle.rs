//! Oracle trait for the combinatorial set rule.
//!
//! The dealer and the automated players consult the oracle but never
//! interpret card features themselves:
//! - Is this claim a valid set?
//! - Which valid sets exist among these cards?
//! - What are the features of these cards (hint output only)?

use smallvec::SmallVec;

use crate::core::CardId;

/// Cards forming one candidate or valid set.
pub type CardSet = SmallVec<[CardId; 3]>;

/// Set rule oracle.
///
/// ## Implementation Notes
///
/// - Every method must be pure: the oracle is shared across the dealer
///   thread and every automated player thread.
/// - `find_sets` returns at most `limit` sets, each of exactly
///   `feature_size()` cards.
/// - `test_set` returns false for anything other than `feature_size()`
///   distinct cards.
pub trait SetOracle: Send + Sync {
    /// Number of cards in a set.
    fn feature_size(&self) -> usize;

    /// Find up to `limit` valid sets among `cards`.
    fn find_sets(&self, cards: &[CardId], limit: usize) -> Vec<CardSet>;

    /// Check whether `cards` form a valid set.
    fn test_set(&self, cards: &[CardId]) -> bool;

    /// Feature vectors of `cards`, in order.
    fn card_features(&self, cards: &[CardId]) -> Vec<Vec<u8>>;

    /// Number of distinct cards the oracle can judge, if bounded.
    fn card_limit(&self) -> Option<usize> {
        None
    }

    // === Convenience Methods ===

    /// Whether at least one valid set exists among `cards`.
    fn has_set(&self, cards: &[CardId]) -> bool {
        !self.find_sets(cards, 1).is_empty()
    }
}
