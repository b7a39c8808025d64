//! Cancellation and modification of resting orders.

use tracing::trace;

use super::book::OrderBook;
use super::error::OrderBookError;
use super::order::{Order, Side};
use super::price_level::PriceKey;

impl OrderBook {
    /// Cancel a resting order.
    ///
    /// Emits CANCEL through the sink on success. Cancelling a terminal
    /// order is an idempotent no-op. An unknown price is a fatal
    /// out-of-sync error: the caller's view has diverged from the book.
    pub fn cancel(&mut self, order: &Order) -> Result<(), OrderBookError> {
        trace!("cancelling {order}");
        self.remove_resting(order)
    }

    /// Cancel-and-replace: removes the resting order and emits CANCEL.
    ///
    /// The caller completes the replacement by re-adding the amended
    /// order, whose own OPEN is emitted by that `add`. No OPEN is
    /// synthesized here.
    pub fn change(&mut self, order: &Order) -> Result<(), OrderBookError> {
        trace!("changing {order}");
        self.remove_resting(order)
    }

    fn remove_resting(&mut self, order: &Order) -> Result<(), OrderBookError> {
        if order.is_filled() {
            return Ok(());
        }
        if !self.price_active(order.side, order.price) {
            return Err(OrderBookError::OutOfSync {
                side: order.side,
                price: order.price,
            });
        }

        let key = PriceKey::new(order.price);
        let Self {
            buys,
            sells,
            collector,
            order_locations,
            ..
        } = self;
        let prices = match order.side {
            Side::Buy => buys,
            Side::Sell => sells,
        };
        let Some(level) = prices.get_mut(&key) else {
            return Err(OrderBookError::OutOfSync {
                side: order.side,
                price: order.price,
            });
        };

        if level.remove(order.id, collector).is_none() {
            // already gone: cancelled earlier, idempotent
            return Ok(());
        }
        order_locations.remove(&order.id);

        let emptied = level.order_count() == 0;
        if emptied {
            self.retire_price(order.side, order.price);
        }
        self.commit_transaction();
        self.collector.clear();
        Ok(())
    }
}
