//! Lifecycle events emitted by the book and the trade record.
//!
//! Events carry snapshots of order state taken at emit time; a subscriber
//! must treat the snapshot as the committed state at the moment of the
//! callback. An order that becomes terminal through a fill is released by
//! its price level and is not addressable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::order::Order;

/// A completed execution: one taker matched against one or more makers
/// within a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade identifier.
    pub id: Uuid,
    /// Timestamp of the taker order, in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Volume-weighted average execution price across the makers.
    pub price: f64,
    /// Total volume executed against the makers.
    pub volume: f64,
    /// The resting orders consumed, in execution order.
    pub maker_orders: Vec<Order>,
    /// The incoming order.
    pub taker_order: Order,
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade({}@{}, makers={}, taker={})",
            self.volume,
            self.price,
            self.maker_orders.len(),
            self.taker_order.id
        )
    }
}

/// A single order-lifecycle event, delivered to the sink in commit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// An order started resting on the book.
    Open(Order),
    /// An order left the book without completing (rejection, explicit
    /// cancel, or an unfillable remainder).
    Cancel(Order),
    /// An order's filled volume changed while it remains addressable.
    Change(Order),
    /// An order executed; the snapshot shows its post-fill state.
    Fill(Order),
    /// A synthesized trade summarizing one taker transaction.
    Trade(Trade),
}

impl Event {
    /// The order snapshot this event carries, if any.
    pub fn order(&self) -> Option<&Order> {
        match self {
            Event::Open(order)
            | Event::Cancel(order)
            | Event::Change(order)
            | Event::Fill(order) => Some(order),
            Event::Trade(_) => None,
        }
    }

    /// The trade record this event carries, if any.
    pub fn trade(&self) -> Option<&Trade> {
        match self {
            Event::Trade(trade) => Some(trade),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Open(order) => write!(f, "OPEN {order}"),
            Event::Cancel(order) => write!(f, "CANCEL {order}"),
            Event::Change(order) => write!(f, "CHANGE {order}"),
            Event::Fill(order) => write!(f, "FILL {order}"),
            Event::Trade(trade) => write!(f, "TRADE {trade}"),
        }
    }
}

/// Subscriber callback invoked once per committed event.
///
/// The sink must not re-enter the book; cascading activity (for example
/// stop triggering) is handled inside the current call after commit.
pub type EventSink = Arc<dyn Fn(&Event) + Send + Sync>;
