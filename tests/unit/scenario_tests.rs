//! End-to-end matching scenarios, pinning exact event streams and post
//! states.

use matchbook_rs::prelude::*;

use crate::common::{kinds, limit, market, recording_book, stop};

#[test]
fn simple_cross_partial_maker() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 10.0, 100.0)).unwrap();
    book.add(limit(2, Side::Buy, 4.0, 100.0)).unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        kinds(&events),
        vec!["open:1", "fill:2", "change:1", "trade:2"]
    );

    let trade = events[3].trade().unwrap();
    assert_eq!(trade.price, 100.0);
    assert_eq!(trade.volume, 4.0);
    assert_eq!(trade.maker_orders.len(), 1);
    assert_eq!(trade.maker_orders[0].id, OrderId(1));
    assert_eq!(trade.taker_order.id, OrderId(2));

    let resting = book.find(&limit(1, Side::Sell, 10.0, 100.0)).unwrap();
    assert_eq!(resting.volume, 10.0);
    assert_eq!(resting.filled, 4.0);
    assert_eq!(book.top_of_book(), [0.0, 0.0, 100.0, 6.0]);
}

#[test]
fn walk_two_levels_accumulates_vwap() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    book.add(limit(2, Side::Sell, 5.0, 101.0)).unwrap();
    book.add(limit(3, Side::Buy, 6.0, 101.0)).unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        kinds(&events),
        vec![
            "open:1", "open:2", "change:3", "fill:1", "fill:3", "change:2", "trade:3"
        ]
    );

    let trade = events[6].trade().unwrap();
    assert_eq!(trade.price, 100.5);
    assert_eq!(trade.volume, 6.0);
    assert_eq!(trade.maker_orders.len(), 2);

    // SELL 2@101 left resting
    let resting = book.find(&limit(2, Side::Sell, 5.0, 101.0)).unwrap();
    assert_eq!(resting.remaining(), 2.0);
    assert_eq!(book.top_of_book(), [0.0, 0.0, 101.0, 2.0]);
    assert_eq!(book.depth(), (0, 1));
}

#[test]
fn fok_rejection_restores_the_book() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    book.add(limit(2, Side::Buy, 5.0, 100.0).with_flag(OrderFlag::FillOrKill))
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["open:1", "cancel:2"]);

    let resting = book.find(&limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    assert_eq!(resting.filled, 0.0);
    assert!(book.find(&limit(2, Side::Buy, 5.0, 100.0)).is_none());
    assert_eq!(book.top_of_book(), [0.0, 0.0, 100.0, 3.0]);
}

#[test]
fn aon_partial_rejection_leaves_both_makers() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    book.add(limit(2, Side::Sell, 2.0, 100.0)).unwrap();
    book.add(limit(3, Side::Buy, 6.0, 100.0).with_flag(OrderFlag::AllOrNone))
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["open:1", "open:2", "cancel:3"]);

    assert_eq!(
        book.find(&limit(1, Side::Sell, 3.0, 100.0)).unwrap().filled,
        0.0
    );
    assert_eq!(
        book.find(&limit(2, Side::Sell, 2.0, 100.0)).unwrap().filled,
        0.0
    );
    assert_eq!(book.top_of_book(), [0.0, 0.0, 100.0, 5.0]);
}

#[test]
fn stop_triggers_on_target_fill_with_retimestamp() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 5.0, 100.0)).unwrap();
    book.add(stop(2, Side::Buy, 5.0, 105.0, 1)).unwrap();
    book.add(limit(3, Side::Buy, 5.0, 100.0).with_timestamp(3))
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        kinds(&events),
        vec!["open:1", "fill:3", "fill:1", "trade:3", "cancel:2"],
        "expected the 1-3 trade, then the triggered stop re-entering",
    );

    let trade = events[3].trade().unwrap();
    assert_eq!(trade.volume, 5.0);
    assert_eq!(trade.price, 100.0);

    // the stop re-entered as a market order stamped with the trigger time
    let reentered = events[4].order().unwrap();
    assert_eq!(reentered.id, OrderId(2));
    assert_eq!(reentered.order_type, OrderType::Market);
    assert_eq!(reentered.volume, 5.0);
    assert_eq!(reentered.price, 105.0);
    assert_eq!(reentered.timestamp, 3);
    assert_eq!(book.depth(), (0, 0));
}

#[test]
fn ioc_partial_executes_then_cancels_remainder() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    book.add(limit(2, Side::Buy, 5.0, 100.0).with_flag(OrderFlag::ImmediateOrCancel))
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        kinds(&events),
        vec!["open:1", "change:2", "fill:1", "trade:2", "cancel:2"]
    );

    let trade = events[3].trade().unwrap();
    assert_eq!(trade.volume, 3.0);
    assert_eq!(trade.price, 100.0);

    assert_eq!(book.depth(), (0, 0));
    assert_eq!(book.top_of_book(), [0.0, 0.0, f64::INFINITY, 0.0]);
}

#[test]
fn ioc_with_no_liquidity_rests() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Buy, 5.0, 99.0).with_flag(OrderFlag::ImmediateOrCancel))
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(kinds(&events), vec!["open:1"]);
    assert_eq!(book.top_of_book(), [99.0, 5.0, f64::INFINITY, 0.0]);
}

#[test]
fn rejection_is_atomic_against_a_deep_book() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    book.add(limit(2, Side::Sell, 4.0, 101.0)).unwrap();
    book.add(limit(3, Side::Sell, 5.0, 102.0)).unwrap();
    book.add(limit(4, Side::Buy, 2.0, 99.0)).unwrap();

    let before = book.snapshot();
    let before_events = events.lock().unwrap().len();

    book.add(limit(5, Side::Buy, 50.0, 102.0).with_flag(OrderFlag::AllOrNone))
        .unwrap();

    let after = book.snapshot();
    assert_eq!(before.bids, after.bids);
    assert_eq!(before.asks, after.asks);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), before_events + 1);
    assert_eq!(
        kinds(&events).last().map(String::as_str),
        Some("cancel:5")
    );
}

#[test]
fn market_order_sweeps_the_far_side() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    book.add(limit(2, Side::Sell, 3.0, 102.0)).unwrap();
    book.add(limit(3, Side::Buy, 4.0, 99.0)).unwrap();
    book.add(market(4, Side::Buy, 8.0)).unwrap();

    let events = events.lock().unwrap();
    // the market taker consumes both ask levels, trades its fills and
    // cancels the unfillable remainder
    let trade = events.iter().find_map(Event::trade).unwrap();
    assert_eq!(trade.volume, 6.0);
    assert_eq!(trade.price, 101.0);
    assert_eq!(trade.maker_orders.len(), 2);
    assert_eq!(
        kinds(&events).last().map(String::as_str),
        Some("cancel:4")
    );

    // the bid side is untouched
    assert_eq!(book.top_of_book(), [99.0, 4.0, f64::INFINITY, 0.0]);
}

#[test]
fn identical_inputs_replay_to_identical_event_streams() {
    let run = || {
        let (mut book, events) = recording_book();
        book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
        book.add(limit(2, Side::Sell, 5.0, 101.0)).unwrap();
        book.add(stop(3, Side::Buy, 2.0, 103.0, 2)).unwrap();
        book.add(limit(4, Side::Buy, 6.0, 101.0)).unwrap();
        book.add(limit(5, Side::Buy, 2.0, 99.0)).unwrap();
        book.add(market(6, Side::Sell, 4.0)).unwrap();
        let stream = events.lock().unwrap().clone();
        stream
    };

    let first = run();
    let second = run();

    // the comparison covers full event payloads, trade ids included
    assert_eq!(first, second);

    let trade_ids: Vec<_> = first
        .iter()
        .filter_map(Event::trade)
        .map(|trade| trade.id)
        .collect();
    assert!(trade_ids.len() >= 2);
    let second_ids: Vec<_> = second
        .iter()
        .filter_map(Event::trade)
        .map(|trade| trade.id)
        .collect();
    assert_eq!(trade_ids, second_ids);
}

#[test]
fn fok_executes_fully_when_liquidity_suffices() {
    let (mut book, events) = recording_book();
    book.add(limit(1, Side::Sell, 3.0, 100.0)).unwrap();
    book.add(limit(2, Side::Sell, 4.0, 101.0)).unwrap();
    book.add(limit(3, Side::Buy, 7.0, 101.0).with_flag(OrderFlag::FillOrKill))
        .unwrap();

    let events = events.lock().unwrap();
    let trade = events.iter().find_map(Event::trade).unwrap();
    assert_eq!(trade.volume, 7.0);
    assert_eq!(book.depth(), (0, 0));
}
