//! Order model: sides, order types, contingency flags and the order record
//! itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::instrument::{ExchangeId, Instrument};
use crate::utils::current_time_millis;

/// Which side of the book an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid side.
    Buy,
    /// Ask side.
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// The kind of order submitted to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Rests at its price if not immediately matched.
    Limit,
    /// Matches at any opposing price; never rests.
    Market,
    /// Armed on the level where its target rests; becomes a live market
    /// order once that level trades.
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Stop => write!(f, "STOP"),
        }
    }
}

/// Contingency flag constraining how an order may execute.
///
/// Flags that cannot be honored surface as a committed CANCEL event, not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderFlag {
    /// No contingency.
    None,
    /// Execute the full volume immediately or cancel.
    FillOrKill,
    /// Execute the full volume (possibly across levels) or cancel;
    /// partial execution is reverted.
    AllOrNone,
    /// Execute whatever is immediately available, cancel the remainder.
    ImmediateOrCancel,
}

impl fmt::Display for OrderFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderFlag::None => write!(f, "NONE"),
            OrderFlag::FillOrKill => write!(f, "FOK"),
            OrderFlag::AllOrNone => write!(f, "AON"),
            OrderFlag::ImmediateOrCancel => write!(f, "IOC"),
        }
    }
}

/// Stable, caller-assigned order identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single order as seen by the book.
///
/// Orders are produced by the caller with their invariants already
/// validated: `0 <= filled <= volume`, stop orders carry a `stop_target`
/// referencing a resting non-stop order, and limit prices are finite.
/// An order is terminal once `filled == volume` or a CANCEL event has been
/// committed against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Stable identifier.
    pub id: OrderId,
    /// Submission time in milliseconds since the Unix epoch. Triggered
    /// stop orders are re-stamped with the triggering order's timestamp.
    pub timestamp: u64,
    /// Buy or sell.
    pub side: Side,
    /// Limit, market or stop.
    pub order_type: OrderType,
    /// Contingency flag.
    pub flag: OrderFlag,
    /// Limit price. For a market order with a flag this is the protective
    /// ceiling (buy) or floor (sell); with `OrderFlag::None` it is ignored
    /// and the order matches at any price.
    pub price: f64,
    /// Total volume.
    pub volume: f64,
    /// Volume executed so far.
    pub filled: f64,
    /// Instrument this order trades.
    pub instrument: Instrument,
    /// Venue tag.
    pub exchange: ExchangeId,
    /// For stop orders, the id of the watched resting order.
    pub stop_target: Option<OrderId>,
}

impl Order {
    /// Create a limit order stamped with the current time.
    pub fn limit(id: OrderId, side: Side, volume: f64, price: f64, instrument: Instrument) -> Self {
        Self {
            id,
            timestamp: current_time_millis(),
            side,
            order_type: OrderType::Limit,
            flag: OrderFlag::None,
            price,
            volume,
            filled: 0.0,
            instrument,
            exchange: ExchangeId::none(),
            stop_target: None,
        }
    }

    /// Create a market order stamped with the current time.
    ///
    /// The price is only meaningful combined with a contingency flag,
    /// where it acts as a protective bound; pass `0.0` otherwise.
    pub fn market(
        id: OrderId,
        side: Side,
        volume: f64,
        price: f64,
        instrument: Instrument,
    ) -> Self {
        Self {
            order_type: OrderType::Market,
            ..Self::limit(id, side, volume, price, instrument)
        }
    }

    /// Create a stop order watching `target`. Once the level where the
    /// target rests trades, this order re-enters the book as a live
    /// market order.
    pub fn stop(
        id: OrderId,
        side: Side,
        volume: f64,
        price: f64,
        target: OrderId,
        instrument: Instrument,
    ) -> Self {
        Self {
            order_type: OrderType::Stop,
            stop_target: Some(target),
            ..Self::limit(id, side, volume, price, instrument)
        }
    }

    /// Replace the contingency flag.
    pub fn with_flag(mut self, flag: OrderFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Replace the timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Replace the venue tag.
    pub fn with_exchange(mut self, exchange: ExchangeId) -> Self {
        self.exchange = exchange;
        self
    }

    /// Unfilled volume.
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.volume - self.filled
    }

    /// Whether the order has executed completely.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled >= self.volume
    }

    /// The price this order matches at: infinite for an unprotected market
    /// order, the order price otherwise.
    #[inline]
    pub(crate) fn match_price(&self) -> f64 {
        match (self.order_type, self.flag) {
            (OrderType::Market, OrderFlag::None) => match self.side {
                Side::Buy => f64::INFINITY,
                Side::Sell => f64::NEG_INFINITY,
            },
            _ => self.price,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order(id={}, {} {} {}@{}, flag={}, filled={}, instrument={}, exchange={})",
            self.id,
            self.side,
            self.order_type,
            self.volume,
            self.price,
            self.flag,
            self.filled,
            self.instrument,
            self.exchange
        )
    }
}
