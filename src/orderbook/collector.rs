//! Transactional event collector.
//!
//! All side effects of one `add`/`cancel`/`change` call are staged here:
//! lifecycle events queue up in push order, maker fills feed the VWAP
//! accumulator, and every price level touched during matching is recorded
//! so the book can finalize or roll back its staging. `commit` drains the
//! queue to the sink in insertion order; `revert` discards everything and
//! never invokes the sink.

use std::collections::VecDeque;
use tracing::trace;
use uuid::Uuid;

use super::error::OrderBookError;
use super::event::{Event, EventSink, Trade};
use super::order::{Order, OrderId, Side};
use super::price_level::PriceKey;
use crate::utils::UuidGenerator;

/// Level bookkeeping handed back to the book when a transaction ends.
///
/// `touched` lists every level that staged mutations this transaction,
/// `cleared` the subset whose FIFO was exhausted, and `departed` the ids
/// of maker orders that left the book.
#[derive(Debug, Default)]
pub(super) struct TxnLevels {
    pub(super) touched: Vec<(Side, PriceKey)>,
    pub(super) cleared: Vec<(Side, PriceKey)>,
    pub(super) departed: Vec<OrderId>,
}

/// Stages lifecycle events and per-transaction accumulation for one book.
///
/// A collector is created with its book and reused across transactions;
/// its state is reset at every commit, revert and clear.
pub(super) struct Collector {
    sink: Option<EventSink>,
    events: VecDeque<Event>,
    price: f64,
    volume: f64,
    makers: Vec<Order>,
    taker: Option<Order>,
    touched: Vec<(Side, PriceKey)>,
    cleared: Vec<(Side, PriceKey)>,
    departed: Vec<OrderId>,
    trade_ids: UuidGenerator,
}

impl Collector {
    /// Create a collector whose trade ids are UUIDv5 values derived from
    /// `namespace` and a counter. Identically-seeded collectors emit
    /// identical id sequences, keeping the event stream reproducible.
    pub(super) fn new(namespace: Uuid) -> Self {
        Self::with_callback(namespace, None)
    }

    pub(super) fn with_callback(namespace: Uuid, sink: Option<EventSink>) -> Self {
        Self {
            sink,
            events: VecDeque::new(),
            price: 0.0,
            volume: 0.0,
            makers: Vec::new(),
            taker: None,
            touched: Vec::new(),
            cleared: Vec::new(),
            departed: Vec::new(),
            trade_ids: UuidGenerator::new(namespace),
        }
    }

    pub(super) fn set_callback(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    /// Running volume-weighted average price across accumulated maker
    /// fills in the current transaction.
    pub(super) fn vwap(&self) -> f64 {
        self.price
    }

    /// Total maker volume accumulated in the current transaction.
    pub(super) fn accumulated_volume(&self) -> f64 {
        self.volume
    }

    /// The taker a trade was synthesized for, if any.
    pub(super) fn taker(&self) -> Option<&Order> {
        self.taker.as_ref()
    }

    /// Number of opposite-side levels exhausted so far; the book uses this
    /// as the index offset when scanning for the next best level.
    pub(super) fn cleared_levels(&self) -> usize {
        self.cleared.len()
    }

    pub(super) fn push_open(&mut self, order: &Order) {
        self.events.push_back(Event::Open(order.clone()));
    }

    /// Stage a FILL. `accumulate` carries the volume this maker executed
    /// in the current transaction; taker-side fills pass `None`.
    pub(super) fn push_fill(&mut self, order: &Order, accumulate: Option<f64>) {
        if let Some(quantity) = accumulate {
            self.accumulate(order, quantity);
        }
        self.events.push_back(Event::Fill(order.clone()));
    }

    /// Stage a CHANGE, accumulating like [`Collector::push_fill`].
    pub(super) fn push_change(&mut self, order: &Order, accumulate: Option<f64>) {
        if let Some(quantity) = accumulate {
            self.accumulate(order, quantity);
        }
        self.events.push_back(Event::Change(order.clone()));
    }

    pub(super) fn push_cancel(&mut self, order: &Order) {
        self.events.push_back(Event::Cancel(order.clone()));
    }

    /// Synthesize the TRADE event for the in-flight taker.
    ///
    /// The caller guarantees at least one maker participated and
    /// `0 < taker.filled <= taker.volume`; violations are fatal.
    pub(super) fn push_trade(&mut self, taker: &Order) -> Result<(), OrderBookError> {
        if self.makers.is_empty() {
            return Err(OrderBookError::MissingMakers { order_id: taker.id });
        }
        if taker.filled <= 0.0 {
            return Err(OrderBookError::EmptyFill { order_id: taker.id });
        }
        if self.volume > taker.volume {
            return Err(OrderBookError::AccumulationOverflow {
                accumulated: self.volume,
                taker_volume: taker.volume,
            });
        }

        let trade = Trade {
            id: self.trade_ids.next(),
            timestamp: taker.timestamp,
            price: self.price,
            volume: self.volume,
            maker_orders: self.makers.clone(),
            taker_order: taker.clone(),
        };
        trace!("staging {trade}");
        self.events.push_back(Event::Trade(trade));
        self.taker = Some(taker.clone());
        Ok(())
    }

    fn accumulate(&mut self, order: &Order, quantity: f64) {
        let total = self.volume + quantity;
        self.price = if total > 0.0 {
            (self.price * self.volume + order.price * quantity) / total
        } else {
            0.0
        };
        self.volume = total;
        self.makers.push(order.clone());
    }

    /// Record that a level staged mutations this transaction.
    pub(super) fn stage_level(&mut self, side: Side, key: PriceKey) {
        if !self.touched.contains(&(side, key)) {
            self.touched.push((side, key));
        }
    }

    /// Record an exhausted level; returns the running cleared count.
    pub(super) fn clear_level(&mut self, side: Side, key: PriceKey) -> usize {
        self.cleared.push((side, key));
        self.cleared.len()
    }

    /// Record a maker order that left the book this transaction.
    pub(super) fn mark_departed(&mut self, id: OrderId) {
        self.departed.push(id);
    }

    /// Flush staged events to the sink in insertion order and reset.
    /// Returns the level bookkeeping so the book can finalize staging.
    pub(super) fn commit(&mut self) -> TxnLevels {
        while let Some(event) = self.events.pop_front() {
            if let Some(sink) = &self.sink {
                sink(&event);
            }
        }
        let levels = TxnLevels {
            touched: std::mem::take(&mut self.touched),
            cleared: std::mem::take(&mut self.cleared),
            departed: std::mem::take(&mut self.departed),
        };
        self.reset();
        levels
    }

    /// Discard staged events and reset. The sink is never invoked; the
    /// departed list is dropped because the makers are being restored.
    pub(super) fn revert(&mut self) -> TxnLevels {
        self.events.clear();
        let levels = TxnLevels {
            touched: std::mem::take(&mut self.touched),
            cleared: std::mem::take(&mut self.cleared),
            departed: Vec::new(),
        };
        self.reset();
        levels
    }

    /// Drop any stale transaction state.
    pub(super) fn clear(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.events.clear();
        self.price = 0.0;
        self.volume = 0.0;
        self.makers.clear();
        self.taker = None;
        self.touched.clear();
        self.cleared.clear();
        self.departed.clear();
    }

    #[cfg(test)]
    pub(super) fn pending_events(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    pub(super) fn staged_events(&self) -> Vec<Event> {
        self.events.iter().cloned().collect()
    }
}
