use crate::core::PlayerId;

/// Every player holding the maximal score, in player order.
///
/// A strictly greater score replaces the winner set and an equal score joins
/// it, so ties report every tied player.
///
/// ```
/// use set_engine::core::PlayerId;
/// use set_engine::dealer::winners;
///
/// let scores = [5, 3, 5, 2].into_iter().enumerate().map(|(i, s)| (PlayerId(i as u8), s));
/// assert_eq!(winners(scores), vec![PlayerId(0), PlayerId(2)]);
/// ```
pub fn winners(scores: impl IntoIterator<Item = (PlayerId, u32)>) -> Vec<PlayerId> {
    let mut best = 0;
    let mut winners = Vec::new();
    for (player, score) in scores {
        if winners.is_empty() || score > best {
            best = score;
            winners.clear();
            winners.push(player);
        } else if score == best {
            winners.push(player);
        }
    }
    winners
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ranked(scores: &[u32]) -> Vec<PlayerId> {
        winners(
            scores
                .iter()
                .enumerate()
                .map(|(i, &s)| (PlayerId(i as u8), s)),
        )
    }

    #[test]
    fn test_tie_for_first() {
        assert_eq!(ranked(&[5, 3, 5, 2]), vec![PlayerId(0), PlayerId(2)]);
    }

    #[test]
    fn test_all_zero() {
        assert_eq!(ranked(&[0, 0, 0]), vec![PlayerId(0), PlayerId(1), PlayerId(2)]);
    }

    #[test]
    fn test_later_leader_replaces() {
        assert_eq!(ranked(&[1, 1, 4]), vec![PlayerId(2)]);
        assert!(ranked(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_winners_hold_the_max(scores in prop::collection::vec(0u32..10, 1..8)) {
            let max = *scores.iter().max().unwrap();
            let expected: Vec<PlayerId> = scores
                .iter()
                .enumerate()
                .filter(|(_, &s)| s == max)
                .map(|(i, _)| PlayerId(i as u8))
                .collect();
            prop_assert_eq!(ranked(&scores), expected);
        }
    }
}
