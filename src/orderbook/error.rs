//! Order book error types.
//!
//! Only invariant violations surface as errors; a rejected order (an
//! unhonorable FOK/AON/IOC flag) is reported in-band as a committed CANCEL
//! event, and cancelling a terminal order is a silent no-op.

use std::fmt;

use super::order::{OrderId, Side};

/// Fatal errors raised by the book. After any of these the book state
/// should be treated as undefined.
#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// A cancel or change referenced a price with no active level; the
    /// caller's view of the book has diverged from the book itself.
    OutOfSync {
        /// Side the operation addressed.
        side: Side,
        /// Price that has no active level.
        price: f64,
    },

    /// A trade was synthesized with no participating maker orders.
    MissingMakers {
        /// The taker order id.
        order_id: OrderId,
    },

    /// A trade was synthesized for a taker with no executed volume.
    EmptyFill {
        /// The taker order id.
        order_id: OrderId,
    },

    /// The accumulated maker volume exceeds the taker's total volume.
    AccumulationOverflow {
        /// Volume accumulated across maker fills.
        accumulated: f64,
        /// The taker's total volume.
        taker_volume: f64,
    },

    /// A stop order did not reference a resting non-stop order.
    InvalidStopTarget {
        /// The stop order id.
        order_id: OrderId,
        /// The target it referenced, if any.
        target: Option<OrderId>,
    },

    /// Internal bookkeeping produced an impossible state (e.g. an order
    /// filled beyond its volume).
    Corrupt {
        /// Description of the inconsistency.
        message: String,
    },

    /// Error while serializing snapshot or event data.
    SerializationError {
        /// Underlying error message.
        message: String,
    },

    /// Error while deserializing snapshot or event data.
    DeserializationError {
        /// Underlying error message.
        message: String,
    },

    /// Snapshot integrity check failed.
    ChecksumMismatch {
        /// Expected checksum value.
        expected: String,
        /// Actual checksum value.
        actual: String,
    },

    /// Operation not permitted in the current state.
    InvalidOperation {
        /// Description of the error.
        message: String,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::OutOfSync { side, price } => {
                write!(f, "order book out of sync: no {side} level at {price}")
            }
            OrderBookError::MissingMakers { order_id } => {
                write!(f, "trade for order {order_id} has no maker orders")
            }
            OrderBookError::EmptyFill { order_id } => {
                write!(f, "trade for order {order_id} has no executed volume")
            }
            OrderBookError::AccumulationOverflow {
                accumulated,
                taker_volume,
            } => {
                write!(
                    f,
                    "accumulated volume {accumulated} exceeds taker volume {taker_volume}"
                )
            }
            OrderBookError::InvalidStopTarget { order_id, target } => match target {
                Some(target) => write!(
                    f,
                    "stop order {order_id} targets {target}, which is not resting"
                ),
                None => write!(f, "stop order {order_id} has no target"),
            },
            OrderBookError::Corrupt { message } => {
                write!(f, "order book is corrupt: {message}")
            }
            OrderBookError::SerializationError { message } => {
                write!(f, "serialization error: {message}")
            }
            OrderBookError::DeserializationError { message } => {
                write!(f, "deserialization error: {message}")
            }
            OrderBookError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "checksum mismatch: expected {expected}, but computed {actual}"
                )
            }
            OrderBookError::InvalidOperation { message } => {
                write!(f, "invalid operation: {message}")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
