//! Lazy traversal over the book's resting orders.

use super::book::OrderBook;
use super::order::{Order, Side};
use super::price_level::PriceKey;

/// Iterator over every resting order: asks ascending from the best ask,
/// then bids descending from the best bid, FIFO within each level.
pub struct RestingOrders<'a> {
    inner: Box<dyn Iterator<Item = &'a Order> + 'a>,
}

impl<'a> Iterator for RestingOrders<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl OrderBook {
    /// In-order traversal of resting orders.
    pub fn iter(&self) -> RestingOrders<'_> {
        let asks = self
            .sell_levels
            .iter()
            .filter_map(move |&price| self.sells.get(&PriceKey::new(price)))
            .flat_map(|level| level.orders());
        let bids = self
            .buy_levels
            .iter()
            .rev()
            .filter_map(move |&price| self.buys.get(&PriceKey::new(price)))
            .flat_map(|level| level.orders());
        RestingOrders {
            inner: Box::new(asks.chain(bids)),
        }
    }

    /// Resting orders on one side only, best price first.
    pub fn iter_side(&self, side: Side) -> RestingOrders<'_> {
        let inner: Box<dyn Iterator<Item = &Order>> = match side {
            Side::Sell => Box::new(
                self.sell_levels
                    .iter()
                    .filter_map(move |&price| self.sells.get(&PriceKey::new(price)))
                    .flat_map(|level| level.orders()),
            ),
            Side::Buy => Box::new(
                self.buy_levels
                    .iter()
                    .rev()
                    .filter_map(move |&price| self.buys.get(&PriceKey::new(price)))
                    .flat_map(|level| level.orders()),
            ),
        };
        RestingOrders { inner }
    }
}
