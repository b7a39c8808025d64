//! Order book implementation: price levels, transactional event
//! collection and the matching engine.

mod book;
mod collector;
mod error;
mod event;
mod instrument;
mod iterators;
mod matching;
mod operations;
mod order;
mod price_level;
mod serialization;
mod snapshot;

mod tests;

pub use book::OrderBook;
pub use error::OrderBookError;
pub use event::{Event, EventSink, Trade};
pub use instrument::{ExchangeId, Instrument};
pub use iterators::RestingOrders;
pub use order::{Order, OrderFlag, OrderId, OrderType, Side};
pub use price_level::PriceLevel;
pub use serialization::{EventSerializer, JsonEventSerializer, SerializationError};
pub use snapshot::{
    LevelSnapshot, OrderBookSnapshot, OrderBookSnapshotPackage, SNAPSHOT_FORMAT_VERSION,
};
