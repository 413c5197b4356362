//! A player's in-progress selection of slots.

use smallvec::SmallVec;

use crate::core::SlotId;

/// Outcome of toggling one slot in a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimToggle {
    /// The slot was appended.
    Added,
    /// The slot was already claimed and has been taken out.
    Removed,
    /// The claim is already complete; nothing changed.
    Full,
}

/// Ordered selection of up to `capacity` distinct slots.
///
/// ```
/// use set_engine::claims::{Claim, ClaimToggle};
/// use set_engine::core::SlotId;
///
/// let mut claim = Claim::new(3);
/// assert_eq!(claim.toggle(SlotId(4)), ClaimToggle::Added);
/// assert_eq!(claim.toggle(SlotId(4)), ClaimToggle::Removed);
/// assert!(claim.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim {
    slots: SmallVec<[SlotId; 3]>,
    capacity: usize,
}

impl Claim {
    /// Create an empty claim that completes at `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: SmallVec::new(),
            capacity,
        }
    }

    /// Slots in the order they were claimed.
    #[must_use]
    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the claim holds exactly `capacity` slots.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.len() == self.capacity
    }

    #[must_use]
    pub fn contains(&self, slot: SlotId) -> bool {
        self.slots.contains(&slot)
    }

    /// Add the slot, or take it out if already claimed.
    ///
    /// A complete claim is locked: it rejects both additions and removals
    /// until it is cleared.
    pub fn toggle(&mut self, slot: SlotId) -> ClaimToggle {
        if self.is_complete() {
            return ClaimToggle::Full;
        }
        if self.remove(slot) {
            ClaimToggle::Removed
        } else {
            self.slots.push(slot);
            ClaimToggle::Added
        }
    }

    /// Take a slot out of the claim. Returns false if it was not claimed.
    pub fn remove(&mut self, slot: SlotId) -> bool {
        match self.slots.iter().position(|&s| s == slot) {
            Some(pos) => {
                self.slots.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Empty the claim, returning the slots it held.
    pub fn clear(&mut self) -> SmallVec<[SlotId; 3]> {
        std::mem::take(&mut self.slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_to_capacity() {
        let mut claim = Claim::new(3);
        for i in 0..3 {
            assert!(!claim.is_complete());
            assert_eq!(claim.toggle(SlotId(i)), ClaimToggle::Added);
        }
        assert!(claim.is_complete());
        assert_eq!(claim.slots(), &[SlotId(0), SlotId(1), SlotId(2)]);
    }

    #[test]
    fn test_complete_claim_is_locked() {
        let mut claim = Claim::new(2);
        claim.toggle(SlotId(0));
        claim.toggle(SlotId(1));

        assert_eq!(claim.toggle(SlotId(5)), ClaimToggle::Full);
        assert_eq!(claim.toggle(SlotId(0)), ClaimToggle::Full);
        assert_eq!(claim.len(), 2);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut claim = Claim::new(3);
        claim.toggle(SlotId(7));
        claim.toggle(SlotId(2));
        claim.toggle(SlotId(9));

        assert!(claim.remove(SlotId(2)));
        assert!(!claim.remove(SlotId(2)));
        assert_eq!(claim.slots(), &[SlotId(7), SlotId(9)]);
    }

    #[test]
    fn test_clear_returns_slots() {
        let mut claim = Claim::new(3);
        claim.toggle(SlotId(1));
        claim.toggle(SlotId(4));

        assert_eq!(claim.clear().as_slice(), &[SlotId(1), SlotId(4)]);
        assert!(claim.is_empty());
    }
}
