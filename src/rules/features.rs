//! Standard feature-based set rule.
//!
//! A card id is read as `feature_count` digits in base `feature_size`
//! (least significant digit first). `feature_size` cards form a set when,
//! for every feature, their values are either all equal or all distinct.
//! With the defaults (3 values, 4 features) this is the classic 81-card game.

use smallvec::SmallVec;

use crate::core::CardId;

use super::oracle::{CardSet, SetOracle};

/// Oracle implementing the classic all-same-or-all-different rule.
///
/// ```
/// use set_engine::core::CardId;
/// use set_engine::rules::{FeatureOracle, SetOracle};
///
/// let oracle = FeatureOracle::new(3, 4);
///
/// // 0, 1, 2 differ only in the first feature, which takes all three values.
/// assert!(oracle.test_set(&[CardId(0), CardId(1), CardId(2)]));
/// assert!(!oracle.test_set(&[CardId(0), CardId(1), CardId(3)]));
/// ```
#[derive(Clone, Debug)]
pub struct FeatureOracle {
    feature_size: usize,
    feature_count: usize,
}

impl FeatureOracle {
    /// Create an oracle for `feature_size` values per feature and
    /// `feature_count` features per card.
    pub fn new(feature_size: usize, feature_count: usize) -> Self {
        assert!(feature_size >= 2, "Feature size must be at least 2");
        assert!(feature_size <= u8::MAX as usize, "Feature values must fit in a byte");
        Self {
            feature_size,
            feature_count,
        }
    }

    /// Number of distinct cards this oracle can describe.
    #[must_use]
    pub fn universe_size(&self) -> usize {
        self.feature_size.saturating_pow(self.feature_count as u32)
    }

    fn features(&self, card: CardId) -> SmallVec<[u8; 8]> {
        let base = self.feature_size as u32;
        let mut rest = card.raw();
        (0..self.feature_count)
            .map(|_| {
                let digit = (rest % base) as u8;
                rest /= base;
                digit
            })
            .collect()
    }

    /// Whether `candidate` can extend `chosen` without breaking any feature.
    fn compatible(chosen: &[&[u8]], candidate: &[u8]) -> bool {
        if chosen.len() < 2 {
            return chosen
                .first()
                .map_or(true, |first| first.len() == candidate.len());
        }
        candidate.iter().enumerate().all(|(f, &value)| {
            if chosen[0][f] == chosen[1][f] {
                value == chosen[0][f]
            } else {
                chosen.iter().all(|c| c[f] != value)
            }
        })
    }

    fn search(
        &self,
        cards: &[CardId],
        features: &[SmallVec<[u8; 8]>],
        start: usize,
        chosen: &mut SmallVec<[usize; 3]>,
        limit: usize,
        out: &mut Vec<CardSet>,
    ) {
        if chosen.len() == self.feature_size {
            out.push(chosen.iter().map(|&i| cards[i]).collect());
            return;
        }

        let needed = self.feature_size - chosen.len();
        for i in start..cards.len() {
            if out.len() >= limit || cards.len() - i < needed {
                return;
            }
            if chosen.iter().any(|&c| cards[c] == cards[i]) {
                continue;
            }
            let prefix: SmallVec<[&[u8]; 3]> = chosen.iter().map(|&c| features[c].as_slice()).collect();
            if !Self::compatible(&prefix, &features[i]) {
                continue;
            }
            chosen.push(i);
            self.search(cards, features, i + 1, chosen, limit, out);
            chosen.pop();
        }
    }
}

impl SetOracle for FeatureOracle {
    fn feature_size(&self) -> usize {
        self.feature_size
    }

    fn card_limit(&self) -> Option<usize> {
        Some(self.universe_size())
    }

    fn find_sets(&self, cards: &[CardId], limit: usize) -> Vec<CardSet> {
        let mut out = Vec::new();
        if limit == 0 || cards.len() < self.feature_size {
            return out;
        }

        let features: Vec<_> = cards.iter().map(|&c| self.features(c)).collect();
        let mut chosen = SmallVec::new();
        self.search(cards, &features, 0, &mut chosen, limit, &mut out);
        out
    }

    fn test_set(&self, cards: &[CardId]) -> bool {
        if cards.len() != self.feature_size {
            return false;
        }
        let features: Vec<_> = cards.iter().map(|&c| self.features(c)).collect();
        let mut chosen: SmallVec<[&[u8]; 3]> = SmallVec::new();
        for (i, card) in cards.iter().enumerate() {
            if cards[..i].contains(card) || !Self::compatible(&chosen, &features[i]) {
                return false;
            }
            chosen.push(&features[i]);
        }
        true
    }

    fn card_features(&self, cards: &[CardId]) -> Vec<Vec<u8>> {
        cards.iter().map(|&c| self.features(c).to_vec()).collect()
    }
}
