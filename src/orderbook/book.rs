//! Core order book state and depth queries.
//!
//! The book keeps, per side, a sorted sequence of active prices and a map
//! from price to [`PriceLevel`]. Bids are sorted ascending with the best
//! bid last; asks ascending with the best ask first. A price appears in
//! its sequence only while the level holds at least one resting order; a
//! level that still carries armed stop orders survives in the map, out of
//! the sequence, until those stops fire or the price becomes active again.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use uuid::Uuid;

use super::collector::Collector;
use super::event::EventSink;
use super::instrument::{ExchangeId, Instrument};
use super::order::{Order, OrderId, Side};
use super::price_level::{PriceKey, PriceLevel};

/// A single-instrument limit order book with price-time priority matching.
///
/// Each `add`, `cancel` or `change` call is one transaction: its side
/// effects are staged in the collector and either committed (flushing the
/// event stream to the sink) or reverted atomically. The book is a
/// single-owner structure; every operation takes `&mut self` and runs to
/// completion before returning.
pub struct OrderBook {
    pub(super) instrument: Instrument,
    pub(super) exchange: ExchangeId,
    pub(super) collector: Collector,

    /// Active bid prices, ascending; best bid last.
    pub(super) buy_levels: Vec<f64>,
    /// Active ask prices, ascending; best ask first.
    pub(super) sell_levels: Vec<f64>,

    pub(super) buys: HashMap<PriceKey, PriceLevel>,
    pub(super) sells: HashMap<PriceKey, PriceLevel>,

    /// Resting-order index: id to (price, side), kept exact across
    /// commits, cancels and reverts. Stop routing resolves targets here.
    pub(super) order_locations: HashMap<OrderId, (f64, Side)>,
}

impl OrderBook {
    /// Create a book for `instrument` with no venue tag and no sink.
    pub fn new(instrument: Instrument) -> Self {
        Self::with_exchange(instrument, ExchangeId::none())
    }

    /// Create a book tagged with a venue.
    pub fn with_exchange(instrument: Instrument, exchange: ExchangeId) -> Self {
        // trade ids are derived from the instrument so identical inputs
        // replay to identical event streams
        let trade_namespace = Uuid::new_v5(&Uuid::NAMESPACE_OID, instrument.name().as_bytes());
        Self {
            instrument,
            exchange,
            collector: Collector::new(trade_namespace),
            buy_levels: Vec::new(),
            sell_levels: Vec::new(),
            buys: HashMap::new(),
            sells: HashMap::new(),
            order_locations: HashMap::new(),
        }
    }

    /// Create a book with the event sink installed.
    pub fn with_callback(instrument: Instrument, exchange: ExchangeId, sink: EventSink) -> Self {
        let mut book = Self::with_exchange(instrument, exchange);
        book.collector.set_callback(sink);
        book
    }

    /// Install or replace the event sink. Must be called before the first
    /// operation whose events should be observed.
    pub fn set_callback(&mut self, sink: EventSink) {
        self.collector.set_callback(sink);
    }

    /// The instrument this book trades.
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// The venue tag.
    pub fn exchange(&self) -> &ExchangeId {
        &self.exchange
    }

    /// Drop all resting orders, stop orders and staged state. The sink is
    /// kept.
    pub fn reset(&mut self) {
        self.buy_levels.clear();
        self.sell_levels.clear();
        self.buys.clear();
        self.sells.clear();
        self.order_locations.clear();
        self.collector.clear();
    }

    /// `[best_bid_price, best_bid_volume, best_ask_price, best_ask_volume]`.
    ///
    /// An empty bid side reports `(0, 0)`; an empty ask side reports
    /// `(+inf, 0)`.
    pub fn top_of_book(&self) -> [f64; 4] {
        let (bid_price, bid_volume) = match self.buy_levels.last() {
            Some(&price) => (price, self.level_volume(Side::Buy, price)),
            None => (0.0, 0.0),
        };
        let (ask_price, ask_volume) = match self.sell_levels.first() {
            Some(&price) => (price, self.level_volume(Side::Sell, price)),
            None => (f64::INFINITY, 0.0),
        };
        [bid_price, bid_volume, ask_price, ask_volume]
    }

    /// Top of book keyed by side, as `(price, volume)` pairs.
    pub fn top_of_book_map(&self) -> HashMap<Side, (f64, f64)> {
        let [bid_price, bid_volume, ask_price, ask_volume] = self.top_of_book();
        HashMap::from([
            (Side::Buy, (bid_price, bid_volume)),
            (Side::Sell, (ask_price, ask_volume)),
        ])
    }

    /// Best ask price minus best bid price.
    pub fn spread(&self) -> f64 {
        let [bid_price, _, ask_price, _] = self.top_of_book();
        ask_price - bid_price
    }

    /// The `depth`-th level from the top of each side, as
    /// `[bid_price, bid_volume, ask_price, ask_volume]`, with the same
    /// empty-side defaults as [`OrderBook::top_of_book`].
    pub fn level(&self, depth: usize) -> [f64; 4] {
        let bid_count = self.buy_levels.len();
        let (bid_price, bid_volume) = if depth < bid_count {
            let price = self.buy_levels[bid_count - depth - 1];
            (price, self.level_volume(Side::Buy, price))
        } else {
            (0.0, 0.0)
        };
        let (ask_price, ask_volume) = match self.sell_levels.get(depth) {
            Some(&price) => (price, self.level_volume(Side::Sell, price)),
            None => (f64::INFINITY, 0.0),
        };
        [bid_price, bid_volume, ask_price, ask_volume]
    }

    /// The price levels at an exact price, as `(bid_level, ask_level)`.
    pub fn level_at_price(&self, price: f64) -> (Option<&PriceLevel>, Option<&PriceLevel>) {
        let key = PriceKey::new(price);
        let bid = self
            .price_active(Side::Buy, price)
            .then(|| self.buys.get(&key))
            .flatten();
        let ask = self
            .price_active(Side::Sell, price)
            .then(|| self.sells.get(&key))
            .flatten();
        (bid, ask)
    }

    /// The first `count` levels of each side, flattened as alternating
    /// `price, volume` pairs: `(bids, asks)`.
    pub fn levels(&self, count: usize) -> (Vec<f64>, Vec<f64>) {
        let mut bids = Vec::with_capacity(count * 2);
        let mut asks = Vec::with_capacity(count * 2);
        for depth in 0..count {
            let [bid_price, bid_volume, ask_price, ask_volume] = self.level(depth);
            bids.push(bid_price);
            bids.push(bid_volume);
            asks.push(ask_price);
            asks.push(ask_volume);
        }
        (bids, asks)
    }

    /// The first `count` levels of each side keyed by side, as
    /// `(price, volume)` pairs.
    pub fn levels_map(&self, count: usize) -> HashMap<Side, Vec<(f64, f64)>> {
        let mut bids = Vec::with_capacity(count);
        let mut asks = Vec::with_capacity(count);
        for depth in 0..count {
            let [bid_price, bid_volume, ask_price, ask_volume] = self.level(depth);
            bids.push((bid_price, bid_volume));
            asks.push((ask_price, ask_volume));
        }
        HashMap::from([(Side::Buy, bids), (Side::Sell, asks)])
    }

    /// Number of active price levels on each side, as `(bids, asks)`.
    pub fn depth(&self) -> (usize, usize) {
        (self.buy_levels.len(), self.sell_levels.len())
    }

    /// Non-destructive lookup of a resting order by side, price and id.
    pub fn find(&self, order: &Order) -> Option<&Order> {
        if !self.price_active(order.side, order.price) {
            return None;
        }
        self.side_map(order.side)
            .get(&PriceKey::new(order.price))
            .and_then(|level| level.find(order.id))
    }

    pub(super) fn side_map(&self, side: Side) -> &HashMap<PriceKey, PriceLevel> {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    pub(super) fn side_map_mut(&mut self, side: Side) -> &mut HashMap<PriceKey, PriceLevel> {
        match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        }
    }

    pub(super) fn side_levels(&self, side: Side) -> &Vec<f64> {
        match side {
            Side::Buy => &self.buy_levels,
            Side::Sell => &self.sell_levels,
        }
    }

    /// Whether a price is in the active sequence for a side.
    pub(super) fn price_active(&self, side: Side, price: f64) -> bool {
        self.side_levels(side)
            .iter()
            .any(|p| p.to_bits() == price.to_bits())
    }

    fn level_volume(&self, side: Side, price: f64) -> f64 {
        self.side_map(side)
            .get(&PriceKey::new(price))
            .map(PriceLevel::volume)
            .unwrap_or(0.0)
    }

    /// Place `price` in the ascending sequence; true iff it was absent.
    pub(super) fn insort(levels: &mut Vec<f64>, price: f64) -> bool {
        match levels.binary_search_by(|p| p.total_cmp(&price)) {
            Ok(_) => false,
            Err(index) => {
                levels.insert(index, price);
                true
            }
        }
    }

    /// Remove `price` from a side's sequence and destroy the level unless
    /// it still carries armed stop orders.
    pub(super) fn retire_price(&mut self, side: Side, price: f64) {
        let key = PriceKey::new(price);
        let levels = match side {
            Side::Buy => &mut self.buy_levels,
            Side::Sell => &mut self.sell_levels,
        };
        if let Some(index) = levels.iter().position(|p| p.to_bits() == price.to_bits()) {
            levels.remove(index);
        }
        let destroy = self
            .side_map(side)
            .get(&key)
            .is_some_and(PriceLevel::is_empty);
        if destroy {
            self.side_map_mut(side).remove(&key);
        }
    }
}

impl Serialize for OrderBook {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.snapshot().serialize(serializer)
    }
}

impl fmt::Display for OrderBook {
    /// Render the top five levels per side: asks stacked above a rule,
    /// bids below, prices aligned.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} @ {}", self.instrument, self.exchange)?;
        for &price in self.sell_levels.iter().take(5).rev() {
            writeln!(
                f,
                "\t\t{}\t\t{}",
                price,
                self.level_volume(Side::Sell, price)
            )?;
        }
        writeln!(f, "-----------------------------------------------------")?;
        for &price in self.buy_levels.iter().rev().take(5) {
            writeln!(f, "{}\t\t{}", self.level_volume(Side::Buy, price), price)?;
        }
        Ok(())
    }
}
