//! Key-press generator for non-human players.
//!
//! Runs on its own thread and feeds presses into [`Player::key_pressed`]
//! exactly as an input device would. With a configured probability it asks
//! the oracle for a real set on the board and presses its slots; otherwise it
//! presses a random slot.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::core::{GameConfig, GameRng, SlotId};
use crate::rules::SetOracle;
use crate::table::Board;

use super::player::Player;

/// Poll interval while input is not accepted and nothing else will wake us.
const IDLE_POLL: Duration = Duration::from_millis(20);

/// Automation driver for one player.
pub struct AutomatedPlayer {
    player: Arc<Player>,
    board: Arc<Board>,
    oracle: Arc<dyn SetOracle>,
    rng: GameRng,
    set_probability: f64,
    max_delay: Duration,
    table_size: usize,
}

impl AutomatedPlayer {
    pub fn new(
        player: Arc<Player>,
        board: Arc<Board>,
        oracle: Arc<dyn SetOracle>,
        config: &GameConfig,
        rng: GameRng,
    ) -> Self {
        Self {
            player,
            board,
            oracle,
            rng,
            set_probability: config.ai_set_probability,
            max_delay: config.ai_max_delay(),
            table_size: config.table_size,
        }
    }

    /// Press keys until the player's automation is terminated.
    pub fn run(mut self) {
        let id = self.player.id();
        tracing::info!(player = %id, "automation thread starting");

        while !self.player.automation_terminating() {
            let seen = self.player.ai_signal().generation();

            if self.player.is_frozen() {
                // Freeze end and termination both notify this signal.
                self.player.ai_signal().wait_past(seen);
                continue;
            }
            if !self.player.accepts_input() {
                self.player.ai_signal().wait_past_timeout(seen, IDLE_POLL);
                continue;
            }

            if self.player.claim_is_empty() && self.rng.gen_bool(self.set_probability) {
                if let Some(slots) = self.find_set() {
                    tracing::trace!(player = %id, ?slots, "going for a set");
                    for slot in slots {
                        if self.player.automation_terminating() {
                            break;
                        }
                        self.player.key_pressed(slot);
                        self.pause();
                    }
                    continue;
                }
            }

            let slot = SlotId(self.rng.gen_range_usize(0..self.table_size) as u16);
            self.player.key_pressed(slot);
            self.pause();
        }

        tracing::info!(player = %id, "automation thread terminated");
    }

    /// Slots of one valid set currently on the board.
    fn find_set(&self) -> Option<Vec<SlotId>> {
        let cards = self.board.cards_on_board();
        let set = self.oracle.find_sets(&cards, 1).into_iter().next()?;
        let slots: Vec<SlotId> = set.iter().filter_map(|&card| self.board.slot_of(card)).collect();
        (slots.len() == self.oracle.feature_size()).then_some(slots)
    }

    fn pause(&mut self) {
        let delay = self.rng.gen_delay(self.max_delay);
        if delay.is_zero() {
            thread::yield_now();
            return;
        }
        let seen = self.player.ai_signal().generation();
        if !self.player.automation_terminating() {
            self.player.ai_signal().wait_past_timeout(seen, delay);
        }
    }
}

impl std::fmt::Debug for AutomatedPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomatedPlayer")
            .field("player", &self.player.id())
            .field("set_probability", &self.set_probability)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::ClaimQueue;
    use crate::core::{CardId, PlayerId};
    use crate::display::{GameDisplay, NullDisplay};
    use crate::rules::FeatureOracle;
    use std::sync::atomic::AtomicBool;
    use std::time::Instant;

    #[test]
    fn test_always_finds_the_set_on_board() {
        let config = GameConfig::new(1)
            .with_table(6, 9)
            .with_features(3, 2)
            .with_ai(1.0, Duration::ZERO);
        let display: Arc<dyn GameDisplay> = Arc::new(NullDisplay);
        let board = Arc::new(Board::new(6, 9, display.clone()));
        for (slot, card) in [0u32, 1, 2, 3, 4, 8].into_iter().enumerate() {
            board.place_card(CardId(card), SlotId(slot as u16));
        }
        let queue = Arc::new(ClaimQueue::new());
        let player = Arc::new(Player::new(
            PlayerId(0),
            false,
            &config,
            board.clone(),
            queue.clone(),
            display,
            Arc::new(AtomicBool::new(true)),
        ));

        let automation = AutomatedPlayer::new(
            player.clone(),
            board.clone(),
            Arc::new(FeatureOracle::new(3, 2)),
            &config,
            GameRng::new(7),
        );
        let worker = thread::spawn(move || automation.run());

        let deadline = Instant::now() + Duration::from_secs(2);
        while queue.is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        player.terminate_automation();
        worker.join().unwrap();

        assert_eq!(queue.snapshot(), vec![PlayerId(0)]);
        let oracle = FeatureOracle::new(3, 2);
        let claimed: Vec<CardId> = player
            .claimed_slots()
            .iter()
            .filter_map(|&slot| board.card_at(slot))
            .collect();
        assert!(oracle.test_set(&claimed));
    }
}
