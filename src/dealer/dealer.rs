//! The dealer loop.
//!
//! The dealer is the only context that moves cards. It deals, runs the
//! round timer, validates queued claims in arrival order, rebuilds the board
//! between rounds, and coordinates shutdown. It never blocks on a condition a
//! player controls: every wait is a bounded sleep that termination cuts short.
//!
//! ## Shutdown order
//!
//! Automation threads are stopped and joined before any player thread is
//! told to stop. An automation loop parked on a freeze wait is released by
//! its player, so stopping players first could leave it waiting forever.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::actors::{AutomatedPlayer, Player, Signal};
use crate::claims::ClaimQueue;
use crate::core::{CardId, GameConfig, GameRng, PlayerId, PlayerMap, SlotId};
use crate::display::GameDisplay;
use crate::error::{EngineError, Result};
use crate::rules::{CardSet, SetOracle};
use crate::table::{Board, TokenToggle};

use super::countdown::Countdown;
use super::winners::winners;

/// Dealer state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DealerPhase {
    Seeding,
    RoundActive,
    Reshuffling,
    GameOver,
    AnnouncingWinners,
    Terminated,
}

/// How a game ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    /// No set remained; winners were announced.
    Finished {
        winners: Vec<PlayerId>,
        scores: PlayerMap<u32>,
    },
    /// Termination was requested before the game finished.
    Terminated { scores: PlayerMap<u32> },
}

impl GameOutcome {
    #[must_use]
    pub fn scores(&self) -> &PlayerMap<u32> {
        match self {
            GameOutcome::Finished { scores, .. } | GameOutcome::Terminated { scores } => scores,
        }
    }

    /// Announced winners; empty for a terminated game.
    #[must_use]
    pub fn winners(&self) -> &[PlayerId] {
        match self {
            GameOutcome::Finished { winners, .. } => winners,
            GameOutcome::Terminated { .. } => &[],
        }
    }

    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        self.winners().contains(&player)
    }
}

struct Shared {
    board: Arc<Board>,
    players: PlayerMap<Arc<Player>>,
    phase: Mutex<DealerPhase>,
    terminate: AtomicBool,
    wake: Signal,
}

/// Cloneable control surface of a running dealer.
#[derive(Clone)]
pub struct DealerHandle {
    shared: Arc<Shared>,
}

impl DealerHandle {
    /// Ask the dealer to stop. `run` then shuts every thread down and
    /// returns `GameOutcome::Terminated`.
    pub fn request_termination(&self) {
        self.shared.terminate.store(true, Ordering::Release);
        self.shared.wake.notify();
    }

    /// Forward a key press from a human player's input device.
    pub fn key_pressed(&self, player: PlayerId, slot: SlotId) -> TokenToggle {
        match self.shared.players.get(player) {
            Some(p) if p.is_human() => p.key_pressed(slot),
            _ => TokenToggle::Rejected,
        }
    }

    #[must_use]
    pub fn phase(&self) -> DealerPhase {
        *self.shared.phase.lock()
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> Option<u32> {
        self.shared.players.get(player).map(|p| p.score())
    }

    #[must_use]
    pub fn scores(&self) -> PlayerMap<u32> {
        self.shared.players.values().map(|p| p.score()).collect()
    }

    #[must_use]
    pub fn is_frozen(&self, player: PlayerId) -> bool {
        self.shared.players.get(player).is_some_and(|p| p.is_frozen())
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<Arc<Player>> {
        self.shared.players.get(player).cloned()
    }

    #[must_use]
    pub fn board(&self) -> Arc<Board> {
        Arc::clone(&self.shared.board)
    }
}

impl std::fmt::Debug for DealerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DealerHandle")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

enum RoundEnd {
    Expired,
    GameOver,
    Terminated,
}

/// Owner of the deck and the game loop.
pub struct Dealer {
    shared: Arc<Shared>,
    oracle: Arc<dyn SetOracle>,
    display: Arc<dyn GameDisplay>,
    queue: Arc<ClaimQueue>,
    round_active: Arc<AtomicBool>,
    config: GameConfig,
    deck: Vec<CardId>,
    rng: GameRng,
    countdown: Countdown,
    /// A card was dealt since the last tick.
    card_placed: bool,
    /// The board changed since hints were last logged.
    board_changed: bool,
    players_started: bool,
    player_threads: Vec<JoinHandle<()>>,
    automation_threads: Vec<JoinHandle<()>>,
}

impl Dealer {
    /// Assemble a game. Fails if the configuration is invalid or the oracle
    /// judges a different claim size than the configuration uses.
    pub fn new(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        display: Arc<dyn GameDisplay>,
    ) -> Result<Self> {
        config.validate()?;
        if oracle.feature_size() != config.feature_size {
            return Err(EngineError::OracleMismatch {
                oracle: oracle.feature_size(),
                config: config.feature_size,
            });
        }
        if let Some(limit) = oracle.card_limit().filter(|&limit| config.deck_size > limit) {
            return Err(EngineError::DeckExceedsOracle {
                deck_size: config.deck_size,
                limit,
            });
        }

        let board = Arc::new(Board::new(config.table_size, config.deck_size, Arc::clone(&display)));
        let queue = Arc::new(ClaimQueue::new());
        let round_active = Arc::new(AtomicBool::new(false));
        let players = PlayerMap::new(config.players, |id| {
            Arc::new(Player::new(
                id,
                id.index() < config.human_players,
                &config,
                Arc::clone(&board),
                Arc::clone(&queue),
                Arc::clone(&display),
                Arc::clone(&round_active),
            ))
        });

        let shared = Arc::new(Shared {
            board,
            players,
            phase: Mutex::new(DealerPhase::Seeding),
            terminate: AtomicBool::new(false),
            wake: Signal::new(),
        });

        Ok(Self {
            shared,
            oracle,
            display,
            queue,
            round_active,
            deck: CardId::all(config.deck_size).collect(),
            rng: GameRng::new(config.seed),
            countdown: Countdown::from_config(&config),
            config,
            card_placed: false,
            board_changed: false,
            players_started: false,
            player_threads: Vec::new(),
            automation_threads: Vec::new(),
        })
    }

    #[must_use]
    pub fn handle(&self) -> DealerHandle {
        DealerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Arc<Board> {
        &self.shared.board
    }

    /// Cards not on the board and not yet collected.
    #[must_use]
    pub fn deck(&self) -> &[CardId] {
        &self.deck
    }

    /// Play until no set remains or termination is requested.
    ///
    /// Every player and automation thread has been joined when this returns.
    pub fn run(mut self) -> GameOutcome {
        tracing::info!(
            players = self.config.players,
            automated = self.config.automated_players(),
            countdown = self.config.has_countdown(),
            table = self.config.table_size,
            deck = self.config.deck_size,
            "dealer starting"
        );

        let result = self.play();
        self.round_active.store(false, Ordering::Release);
        self.shutdown();

        let scores = self.handle().scores();
        let outcome = match result {
            Some(winners) => GameOutcome::Finished { winners, scores },
            None => GameOutcome::Terminated { scores },
        };
        self.set_phase(DealerPhase::Terminated);
        tracing::info!(?outcome, "dealer terminated");
        outcome
    }

    /// Rounds until game over (the winners) or termination (`None`).
    fn play(&mut self) -> Option<Vec<PlayerId>> {
        loop {
            self.set_phase(DealerPhase::Seeding);
            self.deal();
            if self.terminating() {
                return None;
            }
            if !self.players_started {
                self.spawn_players();
                self.players_started = true;
            }
            if self.is_game_over() {
                return Some(self.finish());
            }

            match self.play_round() {
                RoundEnd::Expired => {
                    self.set_phase(DealerPhase::Reshuffling);
                    self.collect_cards();
                }
                RoundEnd::GameOver => return Some(self.finish()),
                RoundEnd::Terminated => return None,
            }
        }
    }

    fn play_round(&mut self) -> RoundEnd {
        self.countdown.reset();
        self.set_phase(DealerPhase::RoundActive);
        self.round_active.store(true, Ordering::Release);
        tracing::info!(cards = self.shared.board.count_cards(), deck = self.deck.len(), "round started");

        let end = loop {
            if self.terminating() {
                break RoundEnd::Terminated;
            }
            if self.config.hints && std::mem::take(&mut self.board_changed) {
                self.log_hints();
            }
            for player in self.shared.players.values() {
                player.pull();
            }

            self.countdown.publish(&*self.display);
            let tick = self.countdown.tick_interval(std::mem::take(&mut self.card_placed));
            tracing::trace!(?tick, "tick");
            if !self.pause(tick) {
                break RoundEnd::Terminated;
            }

            self.drain_claims();
            if self.refill() && self.config.reset_countdown_on_set {
                self.countdown.reset();
            }

            if self.is_game_over() {
                break RoundEnd::GameOver;
            }
            if self.countdown.is_expired() {
                tracing::debug!("round timed out");
                break RoundEnd::Expired;
            }
            if !self.countdown.is_timed() && !self.oracle.has_set(&self.shared.board.cards_on_board()) {
                tracing::debug!("no set left on the board");
                break RoundEnd::Expired;
            }
        };

        self.round_active.store(false, Ordering::Release);
        end
    }

    /// Validate queued claims in arrival order.
    fn drain_claims(&mut self) {
        while let Some(id) = self.queue.poll() {
            let Some(player) = self.shared.players.get(id).cloned() else {
                continue;
            };
            let Some(slots) = player.pending_claim() else {
                tracing::debug!(player = %id, "stale claim skipped");
                continue;
            };

            let mut cards = CardSet::new();
            for &slot in &slots {
                match self.shared.board.card_at(slot) {
                    Some(card) => cards.push(card),
                    None => break,
                }
            }
            if cards.len() != slots.len() {
                tracing::debug!(player = %id, "claim references an empty slot");
                if let Some(&slot) = slots.get(cards.len()) {
                    player.evict_slot(slot);
                }
                continue;
            }

            let valid = self.oracle.test_set(&cards);
            if valid {
                for &slot in &slots {
                    self.take_card(slot, Some(id));
                }
                tracing::info!(player = %id, ?cards, "set collected");
            } else {
                tracing::info!(player = %id, ?cards, "invalid set");
            }
            player.conclude(valid);
        }
    }

    /// Remove a card from the board and evict every other player's token on it.
    fn take_card(&mut self, slot: SlotId, claimant: Option<PlayerId>) -> Option<CardId> {
        let removed = self.shared.board.remove_card(slot)?;
        for &other in removed.evicted.iter().filter(|&&p| Some(p) != claimant) {
            if let Some(player) = self.shared.players.get(other) {
                player.evict_slot(slot);
            }
        }
        self.board_changed = true;
        Some(removed.card)
    }

    /// Fill the empty slots from a freshly shuffled deck, throttled per card.
    fn deal(&mut self) {
        let empty = self.shared.board.empty_slots();
        if empty.is_empty() || self.deck.is_empty() {
            return;
        }
        self.rng.shuffle(&mut self.deck);

        let delay = self.config.table_delay();
        for slot in empty {
            if !self.pause(delay) {
                return;
            }
            let Some(card) = self.deck.pop() else {
                tracing::debug!("deck exhausted while dealing");
                break;
            };
            self.place(card, slot);
        }
    }

    /// Replace collected cards without throttling. Returns whether any card
    /// was placed.
    fn refill(&mut self) -> bool {
        let empty = self.shared.board.empty_slots();
        if empty.is_empty() || self.deck.is_empty() {
            return false;
        }
        self.rng.shuffle(&mut self.deck);

        let mut placed = false;
        for slot in empty {
            let Some(card) = self.deck.pop() else {
                break;
            };
            placed |= self.place(card, slot);
        }
        tracing::debug!(deck = self.deck.len(), "board refilled");
        placed
    }

    fn place(&mut self, card: CardId, slot: SlotId) -> bool {
        if self.shared.board.place_card(card, slot) {
            self.card_placed = true;
            self.board_changed = true;
            true
        } else {
            tracing::error!(%card, %slot, "card could not be placed");
            self.deck.push(card);
            false
        }
    }

    /// Return every board card to the deck and drop all claims.
    fn collect_cards(&mut self) {
        self.queue.clear();
        for player in self.shared.players.values() {
            player.reset_claim();
        }
        self.shared.board.clear_all_tokens();
        for slot in SlotId::all(self.config.table_size) {
            if let Some(card) = self.take_card(slot, None) {
                self.deck.push(card);
            }
        }
        tracing::debug!(deck = self.deck.len(), "board collected");
    }

    /// No set left in the deck and board combined.
    fn is_game_over(&self) -> bool {
        let mut cards = self.shared.board.cards_on_board();
        cards.extend_from_slice(&self.deck);
        !self.oracle.has_set(&cards)
    }

    fn finish(&mut self) -> Vec<PlayerId> {
        self.set_phase(DealerPhase::GameOver);
        let winners = winners(self.shared.players.iter().map(|(id, p)| (id, p.score())));

        self.set_phase(DealerPhase::AnnouncingWinners);
        self.display.announce_winners(&winners);
        tracing::info!(?winners, "game over");
        self.pause(self.config.end_game_pause());
        winners
    }

    fn log_hints(&self) {
        for hint in self.shared.board.hints(&*self.oracle) {
            tracing::info!(slots = ?hint.slots, features = ?hint.features, "Hint: set found");
        }
    }

    fn spawn_players(&mut self) {
        let shared = Arc::clone(&self.shared);

        for (id, player) in shared.players.iter() {
            let player = Arc::clone(player);
            let spawned = thread::Builder::new()
                .name(format!("player-{}", id.0))
                .spawn(move || player.run());
            match spawned {
                Ok(handle) => self.player_threads.push(handle),
                Err(err) => tracing::error!(player = %id, %err, "failed to spawn player thread"),
            }
        }

        for (id, player) in shared.players.iter().filter(|(_, p)| !p.is_human()) {
            let automation = AutomatedPlayer::new(
                Arc::clone(player),
                Arc::clone(&shared.board),
                Arc::clone(&self.oracle),
                &self.config,
                self.rng.fork(),
            );
            let spawned = thread::Builder::new()
                .name(format!("automation-{}", id.0))
                .spawn(move || automation.run());
            match spawned {
                Ok(handle) => self.automation_threads.push(handle),
                Err(err) => tracing::error!(player = %id, %err, "failed to spawn automation thread"),
            }
        }
    }

    fn shutdown(&mut self) {
        for player in self.shared.players.values() {
            player.terminate_automation();
        }
        for handle in self.automation_threads.drain(..) {
            if handle.join().is_err() {
                tracing::error!("automation thread panicked");
            }
        }

        for player in self.shared.players.values() {
            player.terminate();
        }
        for handle in self.player_threads.drain(..) {
            if handle.join().is_err() {
                tracing::error!("player thread panicked");
            }
        }
        tracing::debug!("all player threads joined");
    }

    /// Sleep for `duration`. Returns false if cut short by termination.
    fn pause(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            let seen = self.shared.wake.generation();
            if self.terminating() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            self.shared.wake.wait_past_timeout(seen, remaining);
        }
    }

    fn terminating(&self) -> bool {
        self.shared.terminate.load(Ordering::Acquire)
    }

    fn set_phase(&self, next: DealerPhase) {
        let mut phase = self.shared.phase.lock();
        if *phase != next {
            tracing::debug!(from = ?*phase, to = ?next, "dealer phase");
            *phase = next;
        }
    }
}

impl std::fmt::Debug for Dealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dealer")
            .field("phase", &*self.shared.phase.lock())
            .field("deck", &self.deck.len())
            .field("board", &self.shared.board)
            .finish_non_exhaustive()
    }
}
