//! Instrument and exchange identifiers.
//!
//! Plain value types used to tag books, orders and events. They carry no
//! behavior beyond equality, hashing and display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable instrument identifier (e.g. `"BTC-USD"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    name: String,
}

impl Instrument {
    /// Create an instrument identifier from its symbol name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The symbol name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Instrument {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A trading venue identifier.
///
/// Books that are not tied to a particular venue use [`ExchangeId::none`],
/// which displays as `"-"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeId {
    name: String,
}

impl ExchangeId {
    /// Create a venue identifier from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The placeholder venue for books with no exchange association.
    pub fn none() -> Self {
        Self {
            name: String::new(),
        }
    }

    /// The venue name; empty for [`ExchangeId::none`].
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl From<&str> for ExchangeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
