//! # Transactional Price-Time Matching Engine
//!
//! A single-instrument limit order book with price-time priority matching,
//! written around one idea: every order submission is a transaction. All
//! side effects — fills, cancels, opens, the synthesized trade — are staged
//! in a collector and either committed, flushing a deterministic event
//! stream to the subscriber, or reverted so the book is restored exactly as
//! if the order had never arrived.
//!
//! ## Key Features
//!
//! - **Price-time priority**: strict FIFO within a level, best price
//!   across levels; two resting orders at the same price always fill in
//!   arrival order.
//! - **Order types**: limit, market (optionally price-protected), and stop
//!   orders armed on the level where their target rests.
//! - **Contingency flags**: fill-or-kill, all-or-none and
//!   immediate-or-cancel, honored on both the taker and maker side.
//!   Unhonorable flags surface as a committed CANCEL event, never as an
//!   error — and any partial execution is rolled back atomically.
//! - **Deterministic event stream**: five lifecycle events (open, change,
//!   fill, cancel, trade) delivered to the sink in commit order; identical
//!   inputs produce identical streams.
//! - **Transactional price levels**: each level snapshots itself at the
//!   first touch of a transaction, so a revert is a bit-for-bit
//!   restoration.
//! - **Snapshots**: checksummed point-in-time captures of the book that
//!   can be validated and restored.
//!
//! ## Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use matchbook_rs::prelude::*;
//!
//! let events = Arc::new(Mutex::new(Vec::new()));
//! let sink = {
//!     let events = events.clone();
//!     Arc::new(move |event: &Event| events.lock().unwrap().push(event.clone()))
//! };
//!
//! let mut book = OrderBook::new(Instrument::new("X"));
//! book.set_callback(sink);
//!
//! let instrument = Instrument::new("X");
//! book.add(Order::limit(OrderId(1), Side::Sell, 10.0, 100.0, instrument.clone())).unwrap();
//! book.add(Order::limit(OrderId(2), Side::Buy, 4.0, 100.0, instrument)).unwrap();
//!
//! // OPEN(1), FILL(2), CHANGE(1), TRADE
//! assert_eq!(events.lock().unwrap().len(), 4);
//! assert_eq!(book.top_of_book(), [0.0, 0.0, 100.0, 6.0]);
//! ```
//!
//! ## Concurrency model
//!
//! The book is single-threaded cooperative. Every operation takes
//! `&mut self`, runs to completion, and delivers its events before
//! returning. The sink must not re-enter the book; cascading effects such
//! as stop triggering are handled inside the current call after commit.

pub mod orderbook;

pub mod prelude;
mod utils;

pub use orderbook::{
    Event, EventSerializer, EventSink, ExchangeId, Instrument, JsonEventSerializer, LevelSnapshot,
    Order, OrderBook, OrderBookError, OrderBookSnapshot, OrderBookSnapshotPackage, OrderFlag,
    OrderId, OrderType, PriceLevel, RestingOrders, SNAPSHOT_FORMAT_VERSION, SerializationError,
    Side, Trade,
};
pub use utils::current_time_millis;
