//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use matchbook_rs::prelude::*;
//! ```

// Core book types
pub use crate::orderbook::{OrderBook, OrderBookError};

// Order model
pub use crate::orderbook::{Order, OrderFlag, OrderId, OrderType, Side};

// Events and the sink
pub use crate::orderbook::{Event, EventSink, Trade};

// Identifiers
pub use crate::orderbook::{ExchangeId, Instrument};

// Depth and traversal
pub use crate::orderbook::{PriceLevel, RestingOrders};

// Serialization and snapshots
pub use crate::orderbook::{
    EventSerializer, JsonEventSerializer, LevelSnapshot, OrderBookSnapshot,
    OrderBookSnapshotPackage, SerializationError,
};

// Utility functions
pub use crate::utils::current_time_millis;
