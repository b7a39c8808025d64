//! The matching engine: order ingestion, residual dispatch and stop
//! triggering.
//!
//! `add` walks the opposite side from the best level while the taker's
//! effective price crosses it, delegating per-level matching to
//! [`PriceLevel::cross`]. What happens to the remainder is decided by the
//! taker's type and contingency flag: rest it, cancel it, or revert the
//! whole transaction so the book is restored as if the order never
//! arrived. Rejections always commit so their CANCEL is observable.

use tracing::trace;

use super::book::OrderBook;
use super::error::OrderBookError;
use super::order::{Order, OrderFlag, OrderId, OrderType, Side};
use super::price_level::{CrossOutcome, PriceKey, PriceLevel};

impl OrderBook {
    /// Submit an order.
    ///
    /// All side effects are delivered through the sink before this
    /// returns. Returns the order id on success; errors indicate
    /// invariant violations, after which the book should be treated as
    /// poisoned.
    pub fn add(&mut self, order: Order) -> Result<OrderId, OrderBookError> {
        trace!("adding {order}");
        if order.order_type == OrderType::Stop {
            return self.add_stop(order);
        }

        let id = order.id;
        let mut taker = order;
        let entry_filled = taker.filled;
        let timestamp = taker.timestamp;
        let match_price = taker.match_price();
        let mut secondaries: Vec<Order> = Vec::new();

        loop {
            let cleared = self.collector.cleared_levels();
            let Some(top) = self.best_opposite(taker.side, cleared) else {
                break;
            };
            let crosses = match taker.side {
                Side::Buy => match_price >= top,
                Side::Sell => match_price <= top,
            };
            if !crosses {
                break;
            }

            let opposite = taker.side.opposite();
            let key = PriceKey::new(top);
            self.collector.stage_level(opposite, key);
            let level = match opposite {
                Side::Buy => self.buys.get_mut(&key),
                Side::Sell => self.sells.get_mut(&key),
            }
            .ok_or(OrderBookError::OutOfSync {
                side: opposite,
                price: top,
            })?;

            match level.cross(&mut taker, &mut self.collector, &mut secondaries)? {
                CrossOutcome::Exhausted => {
                    self.collector.clear_level(opposite, key);
                }
                CrossOutcome::Done => {
                    if level.order_count() == 0 {
                        self.collector.clear_level(opposite, key);
                    }
                    break;
                }
            }
        }

        if taker.filled < taker.volume {
            match taker.order_type {
                OrderType::Market => match taker.flag {
                    OrderFlag::AllOrNone | OrderFlag::FillOrKill => {
                        self.revert_transaction();
                        taker.filled = entry_filled;
                        self.collector.push_cancel(&taker);
                        self.commit_transaction();
                    }
                    _ => {
                        if taker.filled > 0.0 {
                            self.collector.push_trade(&taker)?;
                        }
                        self.collector.push_cancel(&taker);
                        self.commit_transaction();
                        self.run_secondaries(timestamp, secondaries)?;
                    }
                },
                _ => match (taker.flag, taker.filled > 0.0) {
                    (OrderFlag::FillOrKill | OrderFlag::AllOrNone, true) => {
                        self.revert_transaction();
                        taker.filled = entry_filled;
                        self.collector.push_cancel(&taker);
                        self.commit_transaction();
                    }
                    (OrderFlag::ImmediateOrCancel, true) => {
                        self.collector.push_trade(&taker)?;
                        self.collector.push_cancel(&taker);
                        self.commit_transaction();
                        self.run_secondaries(timestamp, secondaries)?;
                    }
                    _ => {
                        // no fill under any flag, or a plain limit residual:
                        // the order rests on its own side
                        self.commit_transaction();
                        self.rest_order(taker);
                        self.commit_transaction();
                        self.run_secondaries(timestamp, secondaries)?;
                    }
                },
            }
        } else {
            self.commit_transaction();
            self.run_secondaries(timestamp, secondaries)?;
        }

        self.collector.clear();
        Ok(id)
    }

    /// Arm a stop order on the level where its target rests. No events.
    fn add_stop(&mut self, order: Order) -> Result<OrderId, OrderBookError> {
        let id = order.id;
        let Some(target) = order.stop_target else {
            return Err(OrderBookError::InvalidStopTarget {
                order_id: id,
                target: None,
            });
        };
        let missing = OrderBookError::InvalidStopTarget {
            order_id: id,
            target: Some(target),
        };
        let Some(&(price, side)) = self.order_locations.get(&target) else {
            return Err(missing);
        };
        let key = PriceKey::new(price);
        let Some(level) = self.side_map_mut(side).get_mut(&key) else {
            return Err(missing);
        };
        trace!("arming stop {id} on {side} level {price} (target {target})");
        level.add_stop(order);
        self.collector.clear();
        Ok(id)
    }

    /// Best opposite price after skipping levels already exhausted in the
    /// current transaction.
    fn best_opposite(&self, taker_side: Side, cleared: usize) -> Option<f64> {
        match taker_side {
            Side::Buy => self.sell_levels.get(cleared).copied(),
            Side::Sell => {
                let count = self.buy_levels.len();
                (count > cleared).then(|| self.buy_levels[count - cleared - 1])
            }
        }
    }

    /// Rest an order on its own side, creating the level if absent, and
    /// stage its OPEN (or CHANGE for a known id).
    pub(super) fn rest_order(&mut self, order: Order) {
        let Self {
            buy_levels,
            sell_levels,
            buys,
            sells,
            collector,
            order_locations,
            ..
        } = self;
        let (levels, prices) = match order.side {
            Side::Buy => (buy_levels, buys),
            Side::Sell => (sell_levels, sells),
        };
        let key = PriceKey::new(order.price);
        if Self::insort(levels, order.price) {
            // a level armed with stops may already exist off-sequence
            prices
                .entry(key)
                .or_insert_with(|| PriceLevel::new(order.price));
        }
        order_locations.insert(order.id, (order.price, order.side));
        if let Some(level) = prices.get_mut(&key) {
            level.add(order, collector);
        }
    }

    /// Flush the collector to the sink and finalize level staging:
    /// touched levels drop their snapshots, exhausted levels leave the
    /// book, departed makers leave the location index.
    pub(super) fn commit_transaction(&mut self) {
        let txn = self.collector.commit();
        for &(side, key) in &txn.touched {
            if let Some(level) = self.side_map_mut(side).get_mut(&key) {
                level.commit();
            }
        }
        for &(side, key) in &txn.cleared {
            self.retire_price(side, key.price());
        }
        for id in &txn.departed {
            self.order_locations.remove(id);
        }
    }

    /// Roll back the transaction: staged events are dropped unseen and
    /// every touched level restores its snapshot.
    pub(super) fn revert_transaction(&mut self) {
        let txn = self.collector.revert();
        for &(side, key) in &txn.touched {
            if let Some(level) = self.side_map_mut(side).get_mut(&key) {
                level.revert();
            }
        }
    }

    /// Re-enter triggered stop orders, re-stamped to the triggering
    /// order's timestamp and converted to their live market form.
    /// Cascades run to completion inside the current call.
    fn run_secondaries(
        &mut self,
        timestamp: u64,
        secondaries: Vec<Order>,
    ) -> Result<(), OrderBookError> {
        for mut secondary in secondaries {
            secondary.timestamp = timestamp;
            if secondary.order_type == OrderType::Stop {
                trace!("triggering stop {}", secondary.id);
                secondary.order_type = OrderType::Market;
                secondary.stop_target = None;
            }
            self.add(secondary)?;
        }
        Ok(())
    }
}
