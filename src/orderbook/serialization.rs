//! Pluggable serialization for lifecycle events.
//!
//! The core never serializes events on its own; downstream components
//! translate them to wire formats through the [`EventSerializer`] trait.
//! [`JsonEventSerializer`] is the built-in human-readable implementation.

use super::event::Event;

/// Errors that can occur during event serialization or deserialization.
#[derive(Debug)]
pub struct SerializationError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event serialization error: {}", self.message)
    }
}

impl std::error::Error for SerializationError {}

/// A pluggable serializer for order book events.
///
/// Implementations convert [`Event`] values to and from byte buffers; the
/// format is an implementation detail, allowing publishers and consumers
/// to negotiate the most efficient representation.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn EventSerializer>`.
pub trait EventSerializer: Send + Sync + std::fmt::Debug {
    /// Serialize an [`Event`] into a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if the event cannot be serialized.
    fn serialize_event(&self, event: &Event) -> Result<Vec<u8>, SerializationError>;

    /// Deserialize an [`Event`] from a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if the bytes are malformed or
    /// incompatible with the expected format.
    fn deserialize_event(&self, data: &[u8]) -> Result<Event, SerializationError>;

    /// MIME-like content type identifier for this format, e.g.
    /// `"application/json"`.
    #[must_use]
    fn content_type(&self) -> &'static str;
}

/// JSON event serializer using `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEventSerializer;

impl JsonEventSerializer {
    /// Create a new JSON event serializer.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl EventSerializer for JsonEventSerializer {
    fn serialize_event(&self, event: &Event) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(event).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }

    fn deserialize_event(&self, data: &[u8]) -> Result<Event, SerializationError> {
        serde_json::from_slice(data).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }

    #[inline]
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
