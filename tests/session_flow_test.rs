//! Integration tests for the session lifecycle

use card_match::core::{
    build_deck, streak_total, FlipOutcome, Session, SessionConfig, SimpleRng,
};
use card_match::types::{
    Difficulty, FlipRejection, GameAction, SessionEvent, SessionPhase, SymbolId,
    CLEANUP_DELAY_MS, COUNTDOWN_START,
};

const A: SymbolId = SymbolId(1);
const B: SymbolId = SymbolId(2);
const C: SymbolId = SymbolId(3);
const D: SymbolId = SymbolId(4);
const E: SymbolId = SymbolId(5);

fn abcd(seed: u64) -> SessionConfig {
    SessionConfig::reference()
        .with_symbols(vec![A, B, C, D])
        .with_seed(seed)
}

fn abcde(seed: u64) -> SessionConfig {
    SessionConfig::reference()
        .with_symbols(vec![A, B, C, D, E])
        .with_seed(seed)
}

fn start_playing(config: SessionConfig) -> Session {
    let mut session = Session::new(config).unwrap();
    for _ in 0..COUNTDOWN_START {
        session.tick();
    }
    assert_eq!(session.phase(), SessionPhase::Playing);
    session.take_events();
    session
}

fn positions(session: &Session, symbol: SymbolId) -> (usize, usize) {
    let p = session.deck().positions_of(symbol);
    assert_eq!(p.len(), 2);
    (p[0], p[1])
}

fn hidden(events: Vec<SessionEvent>) -> Vec<usize> {
    events
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::Hidden { index } => Some(index),
            _ => None,
        })
        .collect()
}

#[test]
fn test_reference_deck_composition() {
    let mut rng = SimpleRng::new(2024);
    let symbols = SymbolId::reference_set();
    let deck = build_deck(&symbols, 2, &mut rng).unwrap();

    assert_eq!(deck.len(), 30);
    for s in &symbols {
        assert_eq!(deck.positions_of(*s).len(), 2, "symbol {}", s);
    }
}

#[test]
fn test_same_seed_same_deck() {
    let a = Session::new(SessionConfig::reference().with_seed(77)).unwrap();
    let b = Session::new(SessionConfig::reference().with_seed(77)).unwrap();
    assert_eq!(a.deck(), b.deck());
}

#[test]
fn test_match_mismatch_scenario() {
    let mut s = start_playing(abcd(5));
    let (a1, a2) = positions(&s, A);
    let (b1, _) = positions(&s, B);
    let (c1, _) = positions(&s, C);

    assert_eq!(s.flip(a1), FlipOutcome::Revealed);
    assert_eq!(s.flip(a2), FlipOutcome::Matched { points: 1000 });
    assert_eq!(s.combo(), 1);

    assert_eq!(s.flip(b1), FlipOutcome::Revealed);
    assert_eq!(s.flip(c1), FlipOutcome::Mismatched);
    assert_eq!(s.combo(), 0);

    // Still face up: flipping them again is ignored.
    assert_eq!(
        s.flip(b1),
        FlipOutcome::Ignored(FlipRejection::AlreadyRevealed)
    );
    assert_eq!(
        s.flip(c1),
        FlipOutcome::Ignored(FlipRejection::AlreadyRevealed)
    );

    s.advance(CLEANUP_DELAY_MS);
    assert!(s.reveal().transient().is_empty());

    // Once hidden, the same pair mismatches again.
    s.flip(b1);
    assert_eq!(s.flip(c1), FlipOutcome::Mismatched);

    assert_eq!(s.score(), 1000);
    assert_eq!(s.combo(), 0);
    let mut expected = vec![a1, a2];
    expected.sort_unstable();
    assert_eq!(s.reveal().matched_indices(), expected);
}

#[test]
fn test_mismatch_hidden_after_one_second() {
    let mut s = start_playing(abcd(6));
    let (b1, _) = positions(&s, B);
    let (c1, _) = positions(&s, C);

    s.flip(b1);
    s.flip(c1);
    s.advance(CLEANUP_DELAY_MS - 1);
    assert_eq!(s.reveal().transient(), &[b1, c1]);

    s.advance(1);
    assert!(s.reveal().transient().is_empty());
    let events = s.take_events();
    assert!(events.contains(&SessionEvent::Hidden { index: b1 }));
    assert!(events.contains(&SessionEvent::Hidden { index: c1 }));
}

#[test]
fn test_third_card_peek() {
    let mut s = start_playing(abcd(7));
    let (b1, _) = positions(&s, B);
    let (c1, _) = positions(&s, C);
    let (d1, _) = positions(&s, D);
    let (a1, _) = positions(&s, A);

    s.flip(b1);
    s.flip(c1);
    assert_eq!(s.flip(d1), FlipOutcome::Peeked);
    assert_eq!(
        s.flip(a1),
        FlipOutcome::Ignored(FlipRejection::TooManyRevealed)
    );
    assert_eq!(s.reveal().transient(), &[b1, c1, d1]);

    // Both cleanups are due at the same instant; together they hide all three.
    s.advance(CLEANUP_DELAY_MS);
    assert!(s.reveal().transient().is_empty());
    assert_eq!(s.pending_cleanups(), 0);
}

#[test]
fn test_peek_cleanup_due_after_pair_cleanup() {
    let mut s = start_playing(abcd(15));
    let (b1, _) = positions(&s, B);
    let (c1, _) = positions(&s, C);
    let (d1, _) = positions(&s, D);

    assert_eq!(s.flip(b1), FlipOutcome::Revealed);
    assert_eq!(s.flip(c1), FlipOutcome::Mismatched);
    s.advance(500);
    assert_eq!(s.flip(d1), FlipOutcome::Peeked);
    s.take_events();

    s.advance(499);
    assert_eq!(s.reveal().transient(), &[b1, c1, d1]);

    // Pair cleanup hides only its own two cards.
    s.advance(1);
    assert_eq!(s.reveal().transient(), &[d1]);
    assert_eq!(hidden(s.take_events()), vec![b1, c1]);

    s.advance(499);
    assert_eq!(s.reveal().transient(), &[d1]);

    s.advance(1);
    assert!(s.reveal().transient().is_empty());
    assert_eq!(hidden(s.take_events()), vec![d1]);
    assert_eq!(s.pending_cleanups(), 0);
}

#[test]
fn test_old_pair_cleanup_spares_reflipped_card() {
    let mut s = start_playing(abcde(16));
    let (b1, _) = positions(&s, B);
    let (c1, _) = positions(&s, C);
    let (d1, _) = positions(&s, D);
    let (e1, _) = positions(&s, E);

    // t=0: b,c mismatch; hide due at 1000.
    s.flip(b1);
    assert_eq!(s.flip(c1), FlipOutcome::Mismatched);

    // t=500: peek d; hide-all due at 1500.
    s.advance(500);
    assert_eq!(s.flip(d1), FlipOutcome::Peeked);

    // t=1000: b,c hidden, d still up.
    s.advance(500);
    assert_eq!(s.reveal().transient(), &[d1]);

    // t=1200: e mismatches with d; hide for this d,e due at 2200.
    s.advance(200);
    assert_eq!(s.flip(e1), FlipOutcome::Mismatched);

    // t=1500: the peek cleanup hides d and e.
    s.advance(300);
    assert!(s.reveal().transient().is_empty());

    // t=1800: d flipped again.
    s.advance(300);
    assert_eq!(s.flip(d1), FlipOutcome::Revealed);

    // t=2200: the d,e cleanup belongs to the earlier flip of d and leaves it alone.
    s.take_events();
    s.advance(400);
    assert_eq!(s.reveal().transient(), &[d1]);
    assert!(hidden(s.take_events()).is_empty());
    assert_eq!(s.pending_cleanups(), 0);
}

#[test]
fn test_rejected_flips_change_nothing() {
    let mut s = start_playing(abcd(8));
    let (a1, a2) = positions(&s, A);
    s.flip(a1);
    s.flip(a2);
    s.take_events();
    let before = s.snapshot();

    assert_eq!(
        s.flip(a1),
        FlipOutcome::Ignored(FlipRejection::AlreadyMatched)
    );
    assert_eq!(s.flip(99), FlipOutcome::Ignored(FlipRejection::OutOfRange));
    assert_eq!(s.snapshot(), before);
    assert!(s.take_events().is_empty());
}

#[test]
fn test_win_with_full_streak() {
    let mut s = start_playing(abcd(9));
    let mut last = FlipOutcome::Revealed;
    for symbol in [A, B, C, D] {
        let (x, y) = positions(&s, symbol);
        s.flip(x);
        last = s.flip(y);
    }

    let total = streak_total(4);
    assert_eq!(total, 1000 + 1300 + 1600 + 1900);
    assert_eq!(last, FlipOutcome::Won { score: total });
    assert_eq!(s.phase(), SessionPhase::Won);
    assert_eq!(s.final_score(), Some(total));

    let events = s.take_events();
    assert_eq!(events.last(), Some(&SessionEvent::Won { score: total }));

    // Clock is stopped once the session is over.
    let time_left = s.time_left();
    s.advance(10_000);
    assert_eq!(s.time_left(), time_left);
    assert_eq!(s.flip(0), FlipOutcome::Ignored(FlipRejection::NotPlaying));
}

#[test]
fn test_time_runs_out() {
    let mut s = start_playing(abcd(10).with_difficulty(Difficulty::Hard));
    let (a1, a2) = positions(&s, A);
    s.flip(a1);
    s.flip(a2);

    for _ in 0..59 {
        s.tick();
    }
    assert_eq!(s.phase(), SessionPhase::Playing);
    assert_eq!(s.time_left(), 1);

    s.tick();
    assert_eq!(s.phase(), SessionPhase::Lost);
    assert_eq!(s.time_left(), 0);
    assert_eq!(s.final_score(), Some(1000));

    let events = s.take_events();
    assert_eq!(events.last(), Some(&SessionEvent::Lost { score: 1000 }));
    assert_eq!(
        events.iter().filter(|e| matches!(e, SessionEvent::Lost { .. })).count(),
        1
    );
}

#[test]
fn test_pause_freezes_clock() {
    let mut s = start_playing(abcd(11).with_difficulty(Difficulty::Normal));
    s.tick();
    assert_eq!(s.time_left(), 119);

    assert!(s.apply_action(GameAction::TogglePause));
    for _ in 0..500 {
        s.tick();
    }
    assert_eq!(s.time_left(), 119);
    assert_eq!(s.phase(), SessionPhase::Paused);

    assert!(s.apply_action(GameAction::TogglePause));
    s.tick();
    assert_eq!(s.time_left(), 118);
}

#[test]
fn test_reset_mid_mismatch() {
    let mut s = start_playing(abcd(12));
    let (a1, a2) = positions(&s, A);
    let (b1, _) = positions(&s, B);
    let (c1, _) = positions(&s, C);
    s.flip(a1);
    s.flip(a2);
    s.flip(b1);
    s.flip(c1);

    s.reset();
    assert_eq!(s.phase(), SessionPhase::Countdown { remaining: 3 });
    assert_eq!(s.score(), 0);
    assert_eq!(s.combo(), 0);
    assert_eq!(s.reveal().matched_count(), 0);
    assert!(s.reveal().transient().is_empty());
    assert_eq!(s.deck().len(), 8);

    // The cancelled cleanup never fires into the new session.
    for _ in 0..COUNTDOWN_START {
        s.tick();
    }
    let (x, _) = positions(&s, A);
    s.flip(x);
    s.advance(CLEANUP_DELAY_MS * 3);
    assert_eq!(s.reveal().transient(), &[x]);
}

#[test]
fn test_reset_from_terminal_states() {
    let mut s = start_playing(abcd(13).with_difficulty(Difficulty::Hard));
    for _ in 0..60 {
        s.tick();
    }
    assert_eq!(s.phase(), SessionPhase::Lost);

    assert!(s.apply_action(GameAction::Start(Difficulty::Easy)));
    assert_eq!(s.phase(), SessionPhase::Countdown { remaining: 3 });
    assert_eq!(s.time_left(), 180);
    assert_eq!(s.final_score(), None);

    let events = s.take_events();
    assert_eq!(events.last(), Some(&SessionEvent::Reset { generation: 1 }));
}

#[test]
fn test_countdown_events() {
    let mut s = Session::new(abcd(14)).unwrap();
    for _ in 0..COUNTDOWN_START {
        s.tick();
    }
    let events = s.take_events();
    assert_eq!(
        events,
        vec![
            SessionEvent::CountdownTick { remaining: 2 },
            SessionEvent::CountdownTick { remaining: 1 },
            SessionEvent::CountdownTick { remaining: 0 },
            SessionEvent::Started { time_limit: 180 },
        ]
    );
}
