//! Point-in-time snapshots of the book, with checksummed packaging.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::book::OrderBook;
use super::error::OrderBookError;
use super::instrument::{ExchangeId, Instrument};
use super::order::{Order, Side};
use super::price_level::PriceKey;
use crate::utils::current_time_millis;

/// One price level as captured in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    /// The level price.
    pub price: f64,
    /// Total unfilled volume at the level.
    pub volume: f64,
    /// Resting orders in FIFO order.
    pub orders: Vec<Order>,
}

/// A snapshot of the order book state at a specific point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// The instrument this book trades.
    pub instrument: Instrument,
    /// The venue tag.
    pub exchange: ExchangeId,
    /// When the snapshot was created (milliseconds since epoch).
    pub timestamp: u64,
    /// Bid levels, best first.
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels, best first.
    pub asks: Vec<LevelSnapshot>,
}

impl OrderBookSnapshot {
    /// Best bid as `(price, volume)`.
    pub fn best_bid(&self) -> Option<(f64, f64)> {
        self.bids.first().map(|level| (level.price, level.volume))
    }

    /// Best ask as `(price, volume)`.
    pub fn best_ask(&self) -> Option<(f64, f64)> {
        self.asks.first().map(|level| (level.price, level.volume))
    }

    /// Midpoint of best bid and best ask.
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    /// Total resting volume on the bid side.
    pub fn total_bid_volume(&self) -> f64 {
        self.bids.iter().map(|level| level.volume).sum()
    }

    /// Total resting volume on the ask side.
    pub fn total_ask_volume(&self) -> f64 {
        self.asks.iter().map(|level| level.volume).sum()
    }
}

/// Format version used for checksum-enabled order book snapshots.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Wrapper providing integrity validation for [`OrderBookSnapshot`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookSnapshotPackage {
    /// Version of the snapshot schema for forward compatibility.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: OrderBookSnapshot,
    /// Hex-encoded SHA-256 checksum of the serialized snapshot.
    pub checksum: String,
}

impl OrderBookSnapshotPackage {
    /// Package a snapshot, computing its checksum.
    pub fn new(snapshot: OrderBookSnapshot) -> Result<Self, OrderBookError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(Self {
            version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serialize the package to JSON.
    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string(self).map_err(|error| OrderBookError::SerializationError {
            message: error.to_string(),
        })
    }

    /// Deserialize a package from JSON.
    pub fn from_json(data: &str) -> Result<Self, OrderBookError> {
        serde_json::from_str(data).map_err(|error| OrderBookError::DeserializationError {
            message: error.to_string(),
        })
    }

    /// Validate the version and checksum.
    pub fn validate(&self) -> Result<(), OrderBookError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(OrderBookError::InvalidOperation {
                message: format!(
                    "unsupported snapshot version: {} (expected {})",
                    self.version, SNAPSHOT_FORMAT_VERSION
                ),
            });
        }
        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(OrderBookError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }
        Ok(())
    }

    /// Consume the package, returning the validated snapshot.
    pub fn into_snapshot(self) -> Result<OrderBookSnapshot, OrderBookError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &OrderBookSnapshot) -> Result<String, OrderBookError> {
        let payload =
            serde_json::to_vec(snapshot).map_err(|error| OrderBookError::SerializationError {
                message: error.to_string(),
            })?;
        let mut hasher = Sha256::new();
        hasher.update(payload);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl OrderBook {
    /// Capture the current book state. Stop orders are not part of the
    /// market-data view and are not included.
    pub fn snapshot(&self) -> OrderBookSnapshot {
        let capture = |side: Side, prices: Vec<f64>| -> Vec<LevelSnapshot> {
            prices
                .into_iter()
                .filter_map(|price| {
                    self.side_map(side).get(&PriceKey::new(price)).map(|level| {
                        LevelSnapshot {
                            price,
                            volume: level.volume(),
                            orders: level.orders().cloned().collect(),
                        }
                    })
                })
                .collect()
        };
        let bids: Vec<f64> = self.buy_levels.iter().rev().copied().collect();
        let asks: Vec<f64> = self.sell_levels.clone();
        OrderBookSnapshot {
            instrument: self.instrument.clone(),
            exchange: self.exchange.clone(),
            timestamp: current_time_millis(),
            bids: capture(Side::Buy, bids),
            asks: capture(Side::Sell, asks),
        }
    }

    /// Rebuild a book from a snapshot. Orders return to their levels in
    /// the captured FIFO order; no events are emitted and no sink is
    /// installed.
    pub fn from_snapshot(snapshot: &OrderBookSnapshot) -> Self {
        let mut book = OrderBook::with_exchange(
            snapshot.instrument.clone(),
            snapshot.exchange.clone(),
        );
        for level in snapshot.asks.iter().chain(snapshot.bids.iter()) {
            for order in &level.orders {
                book.restore_resting(order.clone());
            }
        }
        book
    }

    fn restore_resting(&mut self, order: Order) {
        let key = PriceKey::new(order.price);
        let side = order.side;
        let price = order.price;
        {
            let levels = match side {
                Side::Buy => &mut self.buy_levels,
                Side::Sell => &mut self.sell_levels,
            };
            Self::insort(levels, price);
        }
        self.order_locations.insert(order.id, (price, side));
        self.side_map_mut(side)
            .entry(key)
            .or_insert_with(|| super::price_level::PriceLevel::new(price))
            .restore(order);
    }
}
