//! End-to-end sessions through the public `Engine` surface, asserting on
//! the exact event lines the wire format promises.

use matchbook::codec::event_to_line;
use matchbook::{Command, Engine, EventType, Side};

fn to_lines(engine: &mut Engine, cmds: &[Command]) -> Vec<String> {
    engine
        .apply_all(cmds)
        .unwrap()
        .iter()
        .map(event_to_line)
        .collect()
}

/// A short session covering accept, rest, trade, complete, cancel and a
/// cancel rejection, pinned to its exact line output. This is the
/// bit-exactness contract: if any of these strings change, recorded logs
/// stop replaying.
#[test]
fn session_event_lines_are_bit_exact() {
    let mut engine = Engine::new();
    let lines = to_lines(
        &mut engine,
        &[
            Command::add_limit(1, Side::Sell, 100, 10),
            Command::add_limit(2, Side::Buy, 150, 4),
            Command::cancel(1),
            Command::cancel(1),
        ],
    );

    let expected = [
        "type=order_accepted id=1 seq=1 side=sell px=100 qty=10 rem=0 maker=0 maker_seq=0 taker=0 taker_seq=0 tpx=0 tq=0 reason=accepted",
        "type=order_resting id=1 seq=1 side=sell px=100 qty=10 rem=10 maker=0 maker_seq=0 taker=0 taker_seq=0 tpx=0 tq=0 reason=resting",
        "type=order_accepted id=2 seq=2 side=buy px=150 qty=4 rem=0 maker=0 maker_seq=0 taker=0 taker_seq=0 tpx=0 tq=0 reason=accepted",
        "type=trade id=0 seq=0 side=buy px=0 qty=0 rem=0 maker=1 maker_seq=1 taker=2 taker_seq=2 tpx=100 tq=4 reason=trade",
        "type=order_completed id=2 seq=2 side=buy px=150 qty=4 rem=0 maker=0 maker_seq=0 taker=0 taker_seq=0 tpx=0 tq=0 reason=filled",
        "type=order_cancelled id=1 seq=1 side=sell px=100 qty=6 rem=0 maker=0 maker_seq=0 taker=0 taker_seq=0 tpx=0 tq=0 reason=cancelled",
        "type=cancel_rejected id=1 seq=0 side=buy px=0 qty=0 rem=0 maker=0 maker_seq=0 taker=0 taker_seq=0 tpx=0 tq=0 reason=not_found",
    ];
    assert_eq!(lines, expected);
}

/// A drained maker's completion line sits directly after its trade line.
#[test]
fn maker_completion_follows_its_trade() {
    let mut engine = Engine::new();
    engine
        .apply(&Command::add_limit(10, Side::Sell, 100, 5))
        .unwrap();
    engine
        .apply(&Command::add_limit(11, Side::Sell, 100, 5))
        .unwrap();

    let events = engine
        .apply(&Command::add_limit(20, Side::Buy, 100, 6))
        .unwrap();
    let kinds: Vec<EventType> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            EventType::OrderAccepted,
            EventType::Trade,
            EventType::MakerCompleted,
            EventType::Trade,
            EventType::OrderCompleted,
        ]
    );
    assert_eq!(events[2].id, 10);
    assert_eq!(events[2].qty, 0);
    assert_eq!(events[2].remaining_qty, 0);
}

/// Accepted seqs over a mixed stream (rejections, cancels, full fills) are
/// exactly 1, 2, 3, … with no gaps and no reuse.
#[test]
fn accepted_seqs_form_gap_free_prefix() {
    let mut engine = Engine::new();
    let events = engine
        .apply_all(&[
            Command::add_limit(1, Side::Sell, 100, 5),
            Command::add_limit(1, Side::Sell, 100, 5), // duplicate, no seq
            Command::add_limit(0, Side::Buy, 100, 5),  // invalid, no seq
            Command::add_limit(2, Side::Buy, 100, 5),  // full fill
            Command::cancel(2),                        // not found, no seq
            Command::add_limit(3, Side::Buy, 90, 1),
            Command::cancel(3),
            Command::add_limit(4, Side::Sell, 200, 1),
        ])
        .unwrap();

    let seqs: Vec<u64> = events
        .iter()
        .filter(|e| e.event_type == EventType::OrderAccepted)
        .map(|e| e.seq)
        .collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);
}

/// The multi-level sweep scenario, checked through the engine facade.
#[test]
fn multi_level_sweep_trades_in_price_order() {
    let mut engine = Engine::new();
    let events = engine
        .apply_all(&[
            Command::add_limit(1, Side::Sell, 100, 3),
            Command::add_limit(2, Side::Sell, 105, 4),
            Command::add_limit(3, Side::Sell, 110, 5),
            Command::add_limit(9, Side::Buy, 110, 10),
        ])
        .unwrap();

    let trades: Vec<(u64, u64, i64, i64)> = events
        .iter()
        .filter(|e| e.event_type == EventType::Trade)
        .map(|e| (e.maker_id, e.taker_id, e.trade_price_ticks, e.trade_qty))
        .collect();
    assert_eq!(trades, vec![(1, 9, 100, 3), (2, 9, 105, 4), (3, 9, 110, 3)]);

    let book = engine.book();
    assert_eq!(book.ids_at(Side::Sell, 110), vec![3]);
    assert_eq!(book.total_qty_at(Side::Sell, 110), 2);
    assert_eq!(book.best_ask(), Some(110));
}

/// Partial fill rests the remainder at the taker's own limit.
#[test]
fn leftover_rests_at_taker_limit() {
    let mut engine = Engine::new();
    engine
        .apply_all(&[
            Command::add_limit(1, Side::Sell, 100, 5),
            Command::add_limit(2, Side::Sell, 105, 4),
            Command::add_limit(9, Side::Buy, 110, 12),
        ])
        .unwrap();

    let book = engine.book();
    assert!(!book.has(1));
    assert!(!book.has(2));
    assert_eq!(book.best_bid(), Some(110));
    assert_eq!(book.total_qty_at(Side::Buy, 110), 3);
}

#[test]
fn invalid_adds_leave_no_state() {
    let mut engine = Engine::new();
    let events = engine
        .apply_all(&[
            Command::add_limit(0, Side::Buy, 10_000, 100),
            Command::add_limit(1, Side::Buy, 0, 100),
            Command::add_limit(1, Side::Buy, 10_000, 0),
        ])
        .unwrap();

    assert_eq!(events.len(), 3);
    assert!(
        events
            .iter()
            .all(|e| e.event_type == EventType::OrderRejected)
    );
    assert_eq!(engine.book().live_count(), 0);
}
