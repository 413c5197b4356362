//! Player actor: claim building, outcome handling, and freezes.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──toggle──▶ Submitting ──claim complete──▶ AwaitingOutcome
//!   ▲                                               │
//!   │                      ┌──── valid ─────────────┤
//!   │                      ▼                        ▼ invalid
//!   └──── freeze ends ── Rewarding            Penalizing ── freeze ends ──▶ Idle
//! ```
//!
//! Any state can move to `Terminated`. Toggles come from the input thread
//! (humans) or the automation thread; the player's own thread only waits for
//! outcomes and serves freezes.
//!
//! ## Locking
//!
//! The claim buffer and pending outcome share one lock. Key presses take it
//! before touching a slot; the dealer never holds a slot lock while taking it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::claims::{Claim, ClaimQueue};
use crate::core::{GameConfig, PlayerId, SlotId};
use crate::display::GameDisplay;
use crate::table::{Board, TokenToggle};

use super::signal::Signal;

/// Validation state of a player's claim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// No complete claim.
    #[default]
    None,
    /// Complete claim queued for validation.
    Pending,
    /// The dealer accepted the claim.
    Awarded,
    /// The dealer rejected the claim.
    Penalized,
}

/// Observable actor state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorPhase {
    Idle,
    Submitting,
    AwaitingOutcome,
    Rewarding,
    Penalizing,
    Terminated,
}

#[derive(Debug)]
struct ClaimState {
    claim: Claim,
    outcome: Outcome,
}

/// One player, shared between its own thread, its automation thread, the
/// input source, and the dealer.
pub struct Player {
    id: PlayerId,
    human: bool,
    point_freeze: Duration,
    penalty_freeze: Duration,
    freeze_step: Duration,

    board: Arc<Board>,
    queue: Arc<ClaimQueue>,
    display: Arc<dyn GameDisplay>,
    round_active: Arc<AtomicBool>,

    score: AtomicU32,
    state: Mutex<ClaimState>,
    frozen_until: Mutex<Option<Instant>>,

    terminate: AtomicBool,
    terminate_automation: AtomicBool,
    finished: AtomicBool,

    /// Wakes the player thread: dealer pulls, outcomes, evictions, termination.
    wake: Signal,
    /// Wakes the automation thread: freeze end, termination.
    ai_wake: Signal,
}

impl Player {
    /// Create a player wired to the shared board and claim queue.
    pub fn new(
        id: PlayerId,
        human: bool,
        config: &GameConfig,
        board: Arc<Board>,
        queue: Arc<ClaimQueue>,
        display: Arc<dyn GameDisplay>,
        round_active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            human,
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
            freeze_step: config.freeze_step(),
            board,
            queue,
            display,
            round_active,
            score: AtomicU32::new(0),
            state: Mutex::new(ClaimState {
                claim: Claim::new(config.feature_size),
                outcome: Outcome::None,
            }),
            frozen_until: Mutex::new(None),
            terminate: AtomicBool::new(false),
            terminate_automation: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            wake: Signal::new(),
            ai_wake: Signal::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn is_human(&self) -> bool {
        self.human
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen_until.lock().is_some()
    }

    /// Time left on the current freeze.
    #[must_use]
    pub fn freeze_remaining(&self) -> Option<Duration> {
        self.frozen_until
            .lock()
            .map(|until| until.saturating_duration_since(Instant::now()))
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.state.lock().outcome
    }

    /// Slots currently claimed, in claim order.
    #[must_use]
    pub fn claimed_slots(&self) -> Vec<SlotId> {
        self.state.lock().claim.slots().to_vec()
    }

    #[must_use]
    pub fn claim_is_empty(&self) -> bool {
        self.state.lock().claim.is_empty()
    }

    #[must_use]
    pub fn phase(&self) -> ActorPhase {
        if self.finished.load(Ordering::Acquire) {
            return ActorPhase::Terminated;
        }
        let state = self.state.lock();
        match state.outcome {
            Outcome::Pending => ActorPhase::AwaitingOutcome,
            Outcome::Awarded => ActorPhase::Rewarding,
            Outcome::Penalized => ActorPhase::Penalizing,
            Outcome::None if state.claim.is_empty() => ActorPhase::Idle,
            Outcome::None => ActorPhase::Submitting,
        }
    }

    /// Whether a key press could currently change the claim.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        !self.terminate.load(Ordering::Acquire)
            && self.round_active.load(Ordering::Acquire)
            && !self.is_frozen()
            && self.state.lock().outcome == Outcome::None
    }

    /// Handle a key press on `slot`.
    ///
    /// Adds the slot to the claim (placing a token) or, if already claimed,
    /// takes it back out. Completing the claim queues the player for
    /// validation; a complete claim accepts no further presses.
    pub fn key_pressed(&self, slot: SlotId) -> TokenToggle {
        if self.terminate.load(Ordering::Acquire)
            || !self.round_active.load(Ordering::Acquire)
            || self.is_frozen()
        {
            return TokenToggle::Rejected;
        }

        let mut state = self.state.lock();
        if state.outcome != Outcome::None {
            return TokenToggle::Rejected;
        }

        if state.claim.remove(slot) {
            self.board.remove_token(self.id, slot);
            return TokenToggle::Removed;
        }

        if state.claim.is_complete() || !self.board.place_token(self.id, slot) {
            return TokenToggle::Rejected;
        }
        state.claim.toggle(slot);

        if state.claim.is_complete() {
            state.outcome = Outcome::Pending;
            self.queue.enqueue(self.id);
            drop(state);
            tracing::debug!(player = %self.id, "claim complete");
            self.wake.notify();
        }
        TokenToggle::Placed
    }

    // === Dealer side ===

    /// The complete claim awaiting validation, or `None` if the claim went
    /// stale (a slot was evicted) before the dealer got to it.
    pub(crate) fn pending_claim(&self) -> Option<SmallVec<[SlotId; 3]>> {
        let state = self.state.lock();
        (state.outcome == Outcome::Pending && state.claim.is_complete())
            .then(|| SmallVec::from_slice(state.claim.slots()))
    }

    /// A card under one of this player's tokens left the board.
    pub(crate) fn evict_slot(&self, slot: SlotId) {
        let mut state = self.state.lock();
        if !state.claim.remove(slot) {
            return;
        }
        if state.outcome == Outcome::Pending {
            state.outcome = Outcome::None;
        }
        drop(state);
        tracing::debug!(player = %self.id, %slot, "token evicted");
        self.wake.notify();
    }

    /// Record the validation result, clear the claim, and release the
    /// player thread to serve its freeze.
    pub(crate) fn conclude(&self, valid: bool) {
        let mut state = self.state.lock();
        for slot in state.claim.clear() {
            self.board.remove_token(self.id, slot);
        }
        if valid {
            state.outcome = Outcome::Awarded;
            let score = self.score.fetch_add(1, Ordering::AcqRel) + 1;
            self.display.set_score(self.id, score);
        } else {
            state.outcome = Outcome::Penalized;
        }
        drop(state);
        self.wake.notify();
    }

    /// Wake the player thread unless it is serving a freeze.
    pub(crate) fn pull(&self) {
        if !self.is_frozen() {
            self.wake.notify();
        }
    }

    /// Drop the claim and every token of this player without an outcome,
    /// e.g. when the board is rebuilt.
    pub(crate) fn reset_claim(&self) {
        let mut state = self.state.lock();
        state.claim.clear();
        self.board.clear_tokens(self.id);
        if state.outcome == Outcome::Pending {
            state.outcome = Outcome::None;
        }
    }

    /// Stop the automation loop. Releases it from any freeze wait.
    pub fn terminate_automation(&self) {
        self.terminate_automation.store(true, Ordering::Release);
        self.ai_wake.notify();
    }

    /// Stop the player loop. Releases every wait it may be blocked in.
    pub fn terminate(&self) {
        self.terminate.store(true, Ordering::Release);
        self.wake.notify();
        self.ai_wake.notify();
    }

    pub(crate) fn terminating(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    pub(crate) fn automation_terminating(&self) -> bool {
        self.terminate_automation.load(Ordering::Acquire) || self.terminating()
    }

    pub(crate) fn ai_signal(&self) -> &Signal {
        &self.ai_wake
    }

    // === Player thread ===

    /// Main loop of the player thread.
    pub fn run(&self) {
        tracing::info!(player = %self.id, human = self.human, "player thread starting");

        while !self.terminating() {
            let seen = self.wake.generation();
            match self.outcome() {
                Outcome::Awarded => self.serve(self.point_freeze),
                Outcome::Penalized => self.serve(self.penalty_freeze),
                Outcome::None | Outcome::Pending => self.wake.wait_past(seen),
            }
        }

        self.finished.store(true, Ordering::Release);
        tracing::info!(player = %self.id, "player thread terminated");
    }

    fn serve(&self, duration: Duration) {
        self.freeze(duration);
        self.state.lock().outcome = Outcome::None;
    }

    /// Block input for `duration`, publishing the remaining time in steps.
    fn freeze(&self, duration: Duration) {
        let until = Instant::now() + duration;
        *self.frozen_until.lock() = Some(until);

        loop {
            let seen = self.wake.generation();
            if self.terminating() {
                break;
            }
            let remaining = until.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.display.set_freeze(self.id, remaining.as_millis() as u64);
            self.wake.wait_past_timeout(seen, remaining.min(self.freeze_step));
        }

        *self.frozen_until.lock() = None;
        self.display.set_freeze(self.id, 0);
        self.ai_wake.notify();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("human", &self.human)
            .field("score", &self.score())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardId;
    use crate::display::NullDisplay;
    use std::thread;

    struct Fixture {
        board: Arc<Board>,
        queue: Arc<ClaimQueue>,
        active: Arc<AtomicBool>,
        player: Arc<Player>,
    }

    fn fixture(config: GameConfig) -> Fixture {
        let display: Arc<dyn GameDisplay> = Arc::new(NullDisplay);
        let board = Arc::new(Board::new(config.table_size, config.deck_size, display.clone()));
        for slot in SlotId::all(config.table_size) {
            board.place_card(CardId(slot.0 as u32), slot);
        }
        let queue = Arc::new(ClaimQueue::new());
        let active = Arc::new(AtomicBool::new(true));
        let player = Arc::new(Player::new(
            PlayerId(0),
            true,
            &config,
            board.clone(),
            queue.clone(),
            display,
            active.clone(),
        ));
        Fixture { board, queue, active, player }
    }

    fn config() -> GameConfig {
        GameConfig::new(1)
            .with_human_players(1)
            .with_table(6, 9)
            .with_features(3, 2)
            .with_freezes(Duration::from_millis(30), Duration::from_millis(30))
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let f = fixture(config());

        assert_eq!(f.player.key_pressed(SlotId(1)), TokenToggle::Placed);
        assert_eq!(f.player.phase(), ActorPhase::Submitting);
        assert_eq!(f.board.tokens_of(PlayerId(0)), vec![SlotId(1)]);

        assert_eq!(f.player.key_pressed(SlotId(1)), TokenToggle::Removed);
        assert!(f.board.tokens_of(PlayerId(0)).is_empty());
        assert_eq!(f.player.phase(), ActorPhase::Idle);
    }

    #[test]
    fn test_complete_claim_enqueues_once_and_locks() {
        let f = fixture(config());
        for slot in [0, 1, 2] {
            f.player.key_pressed(SlotId(slot));
        }

        assert_eq!(f.player.outcome(), Outcome::Pending);
        assert_eq!(f.queue.snapshot(), vec![PlayerId(0)]);
        assert_eq!(f.player.key_pressed(SlotId(3)), TokenToggle::Rejected);
        assert_eq!(f.player.key_pressed(SlotId(0)), TokenToggle::Rejected);
        assert_eq!(f.queue.len(), 1);
    }

    #[test]
    fn test_inactive_round_rejects_input() {
        let f = fixture(config());
        f.active.store(false, Ordering::Release);

        assert!(!f.player.accepts_input());
        assert_eq!(f.player.key_pressed(SlotId(0)), TokenToggle::Rejected);
    }

    #[test]
    fn test_empty_slot_rejected() {
        let f = fixture(config());
        f.board.remove_card(SlotId(4));
        assert_eq!(f.player.key_pressed(SlotId(4)), TokenToggle::Rejected);
        assert!(f.player.claim_is_empty());
    }

    #[test]
    fn test_eviction_makes_pending_claim_stale() {
        let f = fixture(config());
        for slot in [0, 1, 2] {
            f.player.key_pressed(SlotId(slot));
        }

        f.board.remove_card(SlotId(1));
        f.player.evict_slot(SlotId(1));

        assert_eq!(f.player.outcome(), Outcome::None);
        assert_eq!(f.player.pending_claim(), None);
        assert_eq!(f.player.claimed_slots(), vec![SlotId(0), SlotId(2)]);
    }

    #[test]
    fn test_reset_claim_clears_stray_tokens() {
        let f = fixture(config());
        for slot in [0, 1, 2] {
            f.player.key_pressed(SlotId(slot));
        }
        // A token the claim does not know about.
        f.board.place_token(PlayerId(0), SlotId(5));

        f.player.reset_claim();
        assert_eq!(f.player.outcome(), Outcome::None);
        assert!(f.player.claim_is_empty());
        assert!(f.board.tokens_of(PlayerId(0)).is_empty());
    }

    #[test]
    fn test_conclude_awards_point_and_clears_tokens() {
        let f = fixture(config());
        for slot in [0, 1, 2] {
            f.player.key_pressed(SlotId(slot));
        }

        f.player.conclude(true);
        assert_eq!(f.player.score(), 1);
        assert_eq!(f.player.outcome(), Outcome::Awarded);
        assert!(f.player.claim_is_empty());
        assert!(f.board.tokens_of(PlayerId(0)).is_empty());
    }

    #[test]
    fn test_thread_serves_penalty_then_returns_idle() {
        let f = fixture(config());
        let worker = {
            let player = f.player.clone();
            thread::spawn(move || player.run())
        };

        for slot in [0, 1, 3] {
            f.player.key_pressed(SlotId(slot));
        }
        f.player.conclude(false);
        assert_eq!(f.player.score(), 0);

        let deadline = Instant::now() + Duration::from_secs(2);
        while f.player.phase() != ActorPhase::Idle && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(f.player.phase(), ActorPhase::Idle);
        assert!(!f.player.is_frozen());

        f.player.terminate();
        worker.join().unwrap();
        assert_eq!(f.player.phase(), ActorPhase::Terminated);
    }

    #[test]
    fn test_terminate_interrupts_long_freeze() {
        let f = fixture(config().with_freezes(Duration::from_secs(60), Duration::from_secs(60)));
        let worker = {
            let player = f.player.clone();
            thread::spawn(move || player.run())
        };

        for slot in [0, 1, 2] {
            f.player.key_pressed(SlotId(slot));
        }
        f.player.conclude(true);
        while !f.player.is_frozen() {
            thread::sleep(Duration::from_millis(1));
        }

        let start = Instant::now();
        f.player.terminate();
        worker.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
