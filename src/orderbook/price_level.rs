//! A single price level: FIFO custody of resting orders, the stop orders
//! armed on it, and the kernel that crosses a taker against it.
//!
//! Every mutation made while matching goes through a staging snapshot taken
//! at the first touch of each transaction, so the level can be restored
//! bit-for-bit when a contingency flag forces the book to revert.

use std::collections::VecDeque;

use super::collector::Collector;
use super::error::OrderBookError;
use super::order::{Order, OrderFlag, OrderId, OrderType};

/// Hashable key for an `f64` price. Prices that reach a level are finite
/// by construction (market orders never rest), so bit equality coincides
/// with numeric equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct PriceKey(u64);

impl PriceKey {
    pub(super) fn new(price: f64) -> Self {
        Self(price.to_bits())
    }

    pub(super) fn price(self) -> f64 {
        f64::from_bits(self.0)
    }
}

/// Outcome of crossing a taker against one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CrossOutcome {
    /// Stop walking: the taker is satisfied, was a stop, or the
    /// transaction must abort.
    Done,
    /// The FIFO emptied with taker volume left; advance to the next level.
    Exhausted,
}

#[derive(Debug, Clone)]
struct Staged {
    orders: VecDeque<Order>,
    stop_orders: Vec<Order>,
}

/// The set of resting orders at one exact price on one side, in strict
/// arrival order, plus the stop orders whose targets rest here.
#[derive(Debug)]
pub struct PriceLevel {
    price: f64,
    orders: VecDeque<Order>,
    stop_orders: Vec<Order>,
    staged: Option<Staged>,
}

impl PriceLevel {
    pub(super) fn new(price: f64) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            stop_orders: Vec::new(),
            staged: None,
        }
    }

    /// The price shared by every resting order at this level.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Number of resting (non-stop) orders.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Total unfilled volume across resting orders.
    pub fn volume(&self) -> f64 {
        self.orders.iter().map(Order::remaining).sum()
    }

    /// Resting orders in FIFO order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Number of stop orders armed on this level.
    pub fn stop_count(&self) -> usize {
        self.stop_orders.len()
    }

    /// A level with neither resting nor stop orders is destroyed.
    pub(super) fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.stop_orders.is_empty()
    }

    /// Rest an order at this level.
    ///
    /// Stop orders join the stop list silently. A known id stages CHANGE
    /// and replaces the stored record; a new id is appended and stages
    /// OPEN.
    pub(super) fn add(&mut self, order: Order, collector: &mut Collector) {
        if order.order_type == OrderType::Stop {
            self.add_stop(order);
            return;
        }
        if let Some(existing) = self.orders.iter_mut().find(|o| o.id == order.id) {
            collector.push_change(&order, None);
            *existing = order;
        } else {
            collector.push_open(&order);
            self.orders.push_back(order);
        }
    }

    /// Arm a stop order on this level without emitting events.
    pub(super) fn add_stop(&mut self, order: Order) {
        self.stop_orders.push(order);
    }

    /// Re-seat an order during snapshot restore; no events.
    pub(super) fn restore(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    /// The resting order with the given id, if present.
    pub fn find(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Remove a resting order, staging its CANCEL. Returns the removed
    /// record, or `None` when the id is not resting here.
    pub(super) fn remove(&mut self, id: OrderId, collector: &mut Collector) -> Option<Order> {
        let position = self.orders.iter().position(|o| o.id == id)?;
        let order = self.orders.remove(position)?;
        collector.push_cancel(&order);
        Some(order)
    }

    /// Snapshot the level at the first touch of a transaction.
    pub(super) fn stage(&mut self) {
        if self.staged.is_none() {
            self.staged = Some(Staged {
                orders: self.orders.clone(),
                stop_orders: self.stop_orders.clone(),
            });
        }
    }

    /// Discard the staging snapshot; mutations become permanent.
    pub(super) fn commit(&mut self) {
        self.staged = None;
    }

    /// Restore the level to its pre-transaction state.
    pub(super) fn revert(&mut self) {
        if let Some(staged) = self.staged.take() {
            self.orders = staged.orders;
            self.stop_orders = staged.stop_orders;
        }
    }

    /// Drop all resting and stop orders along with any staging.
    #[allow(dead_code)]
    pub(super) fn clear(&mut self) {
        self.orders.clear();
        self.stop_orders.clear();
        self.staged = None;
    }

    /// Cross a taker against this level's FIFO.
    ///
    /// Pops makers in arrival order, staging events into the collector,
    /// until the taker is satisfied or the FIFO empties. Any stop orders
    /// armed here move into `secondaries` for the book to trigger after
    /// commit; a revert restores them from the staging snapshot.
    pub(super) fn cross(
        &mut self,
        taker: &mut Order,
        collector: &mut Collector,
        secondaries: &mut Vec<Order>,
    ) -> Result<CrossOutcome, OrderBookError> {
        if taker.order_type == OrderType::Stop {
            self.add_stop(taker.clone());
            return Ok(CrossOutcome::Done);
        }

        self.stage();

        if taker.filled >= taker.volume {
            if taker.filled > taker.volume {
                return Err(OrderBookError::Corrupt {
                    message: format!("taker {} filled beyond its volume", taker.id),
                });
            }
            secondaries.append(&mut self.stop_orders);
            return Ok(CrossOutcome::Done);
        }

        while taker.filled < taker.volume {
            let Some(mut maker) = self.orders.pop_front() else {
                break;
            };
            let to_fill = taker.volume - taker.filled;
            let maker_remaining = maker.volume - maker.filled;

            if maker_remaining > to_fill {
                if matches!(maker.flag, OrderFlag::FillOrKill | OrderFlag::AllOrNone) {
                    // the maker cannot partial-fill; kill it and keep going
                    collector.push_cancel(&maker);
                    collector.mark_departed(maker.id);
                    continue;
                }
                maker.filled += to_fill;
                taker.filled = taker.volume;
                collector.push_fill(taker, None);
                collector.push_change(&maker, Some(to_fill));
                if maker.flag == OrderFlag::ImmediateOrCancel {
                    collector.push_cancel(&maker);
                    collector.mark_departed(maker.id);
                } else {
                    self.orders.push_front(maker);
                }
            } else if maker_remaining < to_fill {
                taker.filled += maker_remaining;
                if taker.flag == OrderFlag::AllOrNone {
                    // the taker cannot be satisfied here; the book reverts
                    self.orders.push_front(maker);
                    secondaries.append(&mut self.stop_orders);
                    return Ok(CrossOutcome::Done);
                }
                maker.filled = maker.volume;
                collector.push_change(taker, None);
                collector.push_fill(&maker, Some(maker_remaining));
                collector.mark_departed(maker.id);
            } else {
                // exactly equal; assign outright so neither side can
                // drift past its volume in floating point
                maker.filled = maker.volume;
                taker.filled = taker.volume;
                collector.push_fill(taker, None);
                collector.push_fill(&maker, Some(maker_remaining));
                collector.mark_departed(maker.id);
            }
        }

        if taker.filled >= taker.volume {
            if taker.filled > taker.volume {
                return Err(OrderBookError::Corrupt {
                    message: format!("taker {} filled beyond its volume", taker.id),
                });
            }
            collector.push_trade(taker)?;
            secondaries.append(&mut self.stop_orders);
            return Ok(CrossOutcome::Done);
        }

        secondaries.append(&mut self.stop_orders);
        Ok(CrossOutcome::Exhausted)
    }
}
