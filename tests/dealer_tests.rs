//! Dealer tests.
//!
//! These tests run complete games on real threads: human claims submitted
//! through the handle, game-over detection, round expiry, and fully
//! automated games.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use set_engine::core::{CardId, GameConfig, PlayerId, SlotId};
use set_engine::dealer::{Dealer, DealerHandle, DealerPhase, GameOutcome};
use set_engine::display::{DisplayEvent, GameDisplay, RecordingDisplay};
use set_engine::rules::{FeatureOracle, SetOracle};
use set_engine::table::TokenToggle;

const TIMEOUT: Duration = Duration::from_secs(10);

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Nine-card plane with one human player and fast timings.
fn human_config(table: usize, deck: usize) -> GameConfig {
    GameConfig::new(1)
        .with_human_players(1)
        .with_table(table, deck)
        .with_features(3, 2)
        .with_table_delay(Duration::ZERO)
        .with_ticks(Duration::from_millis(1), Duration::from_millis(5))
        .with_freezes(Duration::from_secs(2), Duration::from_secs(3))
        .with_end_game_pause(Duration::from_millis(10))
}

struct Game {
    handle: DealerHandle,
    display: Arc<RecordingDisplay>,
    thread: JoinHandle<GameOutcome>,
}

fn start(config: GameConfig, display: RecordingDisplay) -> Game {
    let display = Arc::new(display);
    let oracle = Arc::new(FeatureOracle::new(config.feature_size, config.feature_count));
    let dealer = Dealer::new(config, oracle, display.clone() as Arc<dyn GameDisplay>).unwrap();
    let handle = dealer.handle();
    let thread = thread::spawn(move || dealer.run());
    Game { handle, display, thread }
}

fn claim(handle: &DealerHandle, player: PlayerId, cards: [u32; 3]) {
    let board = handle.board();
    for card in cards {
        let slot = board.slot_of(CardId(card)).unwrap();
        assert_eq!(handle.key_pressed(player, slot), TokenToggle::Placed);
    }
}

/// Test a valid claim: exactly its cards leave the board, one point, point freeze.
#[test]
fn test_valid_claim_round_trip() {
    let game = start(human_config(6, 6), RecordingDisplay::new());
    let player = PlayerId(0);
    assert!(wait_until(|| game.handle.phase() == DealerPhase::RoundActive));

    claim(&game.handle, player, [0, 1, 2]);

    assert!(wait_until(|| game.handle.score(player) == Some(1)));
    assert!(wait_until(|| game.handle.is_frozen(player)));

    let board = game.handle.board();
    let mut remaining = board.cards_on_board();
    remaining.sort_unstable();
    assert_eq!(remaining, vec![CardId(3), CardId(4), CardId(5)]);
    assert!(board.tokens_of(player).is_empty());
    assert!(board.is_consistent());

    let freeze = game.handle.player(player).unwrap().freeze_remaining().unwrap();
    assert!(freeze <= Duration::from_secs(2));
    assert!(freeze > Duration::from_millis(500));

    // Frozen players cannot mark slots.
    let slot = board.slot_of(CardId(3)).unwrap();
    assert_eq!(game.handle.key_pressed(player, slot), TokenToggle::Rejected);
    assert!(game
        .display
        .events()
        .contains(&DisplayEvent::Score { player, score: 1 }));

    game.handle.request_termination();
    let outcome = game.thread.join().unwrap();
    assert!(matches!(outcome, GameOutcome::Terminated { .. }));
    assert_eq!(outcome.scores()[player], 1);
}

/// Test an invalid claim: board untouched, no point, penalty freeze.
#[test]
fn test_invalid_claim_penalized() {
    let game = start(human_config(6, 6), RecordingDisplay::new());
    let player = PlayerId(0);
    assert!(wait_until(|| game.handle.phase() == DealerPhase::RoundActive));

    claim(&game.handle, player, [0, 1, 3]);

    assert!(wait_until(|| game.handle.is_frozen(player)));
    let board = game.handle.board();
    assert_eq!(board.count_cards(), 6);
    assert_eq!(game.handle.score(player), Some(0));
    assert!(board.tokens_of(player).is_empty());

    let freeze = game.handle.player(player).unwrap().freeze_remaining().unwrap();
    assert!(freeze > Duration::from_secs(2));

    game.handle.request_termination();
    let outcome = game.thread.join().unwrap();
    assert_eq!(outcome.scores()[player], 0);
    assert!(outcome.winners().is_empty());
}

/// Test that collecting the last set ends the game and announces the winner.
#[test]
fn test_last_set_ends_game() {
    let game = start(human_config(3, 3), RecordingDisplay::new());
    let player = PlayerId(0);
    assert!(wait_until(|| game.handle.phase() == DealerPhase::RoundActive));

    claim(&game.handle, player, [0, 1, 2]);

    let outcome = game.thread.join().unwrap();
    assert_eq!(outcome.winners(), &[player]);
    assert!(outcome.is_winner(player));
    assert_eq!(outcome.scores()[player], 1);
    assert_eq!(game.display.winners(), Some(vec![player]));
    assert_eq!(game.handle.phase(), DealerPhase::Terminated);
}

/// Test that an expired countdown returns the board to the deck and redeals.
#[test]
fn test_round_expiry_reshuffles() {
    let config = human_config(3, 6).with_turn_timeout(Duration::from_millis(40), Duration::from_millis(10));
    let game = start(config, RecordingDisplay::new());

    let display = game.display.clone();
    assert!(wait_until(|| {
        display
            .filter(|e| matches!(e, DisplayEvent::PlaceCard { .. }))
            .len()
            >= 9
    }));
    assert!(!display
        .filter(|e| matches!(e, DisplayEvent::RemoveCard { .. }))
        .is_empty());

    game.handle.request_termination();
    let outcome = game.thread.join().unwrap();
    assert!(matches!(outcome, GameOutcome::Terminated { .. }));
    assert!(game.handle.board().is_consistent());
}

/// Test that untimed rounds publish elapsed time instead of a countdown.
#[test]
fn test_untimed_round_publishes_elapsed() {
    let config = human_config(6, 6).with_turn_timeout(Duration::ZERO, Duration::ZERO);
    let game = start(config, RecordingDisplay::with_timers());

    let display = game.display.clone();
    assert!(wait_until(|| {
        display
            .filter(|e| matches!(e, DisplayEvent::Elapsed { .. }))
            .len()
            >= 3
    }));

    game.handle.request_termination();
    game.thread.join().unwrap();
    assert!(display
        .filter(|e| matches!(e, DisplayEvent::Countdown { .. }))
        .is_empty());
}

/// Test a fully automated game played to the end.
#[test]
fn test_automated_game_finishes() {
    let config = GameConfig::new(3)
        .with_table(9, 9)
        .with_features(3, 2)
        .with_turn_timeout(Duration::ZERO, Duration::ZERO)
        .with_table_delay(Duration::ZERO)
        .with_ticks(Duration::from_millis(1), Duration::from_millis(5))
        .with_freezes(Duration::from_millis(10), Duration::from_millis(10))
        .with_end_game_pause(Duration::ZERO)
        .with_ai(1.0, Duration::from_millis(3))
        .with_seed(11);
    let game = start(config, RecordingDisplay::new());

    let outcome = game.thread.join().unwrap();
    let GameOutcome::Finished { winners, scores } = &outcome else {
        panic!("expected a finished game, got {outcome:?}");
    };

    let collected: u32 = scores.values().sum();
    assert!(collected >= 1);
    assert!(!winners.is_empty());
    let best = scores.values().max().copied().unwrap();
    for &winner in winners {
        assert_eq!(scores[winner], best);
    }

    let board = game.handle.board();
    assert_eq!(board.count_cards() + 3 * collected as usize, 9);
    assert!(!FeatureOracle::new(3, 2).has_set(&board.cards_on_board()));
    assert_eq!(game.display.winners(), Some(winners.clone()));
}

/// Test that automated presses never reach the handle's human entry.
#[test]
fn test_human_entry_ignores_unknown_player() {
    let game = start(human_config(6, 6), RecordingDisplay::new());
    assert!(wait_until(|| game.handle.phase() == DealerPhase::RoundActive));

    assert_eq!(game.handle.key_pressed(PlayerId(4), SlotId(0)), TokenToggle::Rejected);
    assert_eq!(game.handle.key_pressed(PlayerId(0), SlotId(0)), TokenToggle::Placed);
    assert_eq!(game.handle.key_pressed(PlayerId(0), SlotId(0)), TokenToggle::Removed);

    game.handle.request_termination();
    game.thread.join().unwrap();
}
