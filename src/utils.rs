//! Small shared utilities.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Deterministic UUID source: each call produces the v5 UUID of a
/// per-instance namespace and a monotonically increasing counter, so a
/// given generator always yields the same sequence of ids.
#[derive(Debug)]
pub(crate) struct UuidGenerator {
    namespace: Uuid,
    counter: AtomicU64,
}

impl UuidGenerator {
    pub(crate) fn new(namespace: Uuid) -> Self {
        Self {
            namespace,
            counter: AtomicU64::new(0),
        }
    }

    pub(crate) fn next(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Uuid::new_v5(&self.namespace, &n.to_be_bytes())
    }
}
