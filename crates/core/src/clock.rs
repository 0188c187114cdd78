//! Time abstraction
//!
//! Wall-clock time enters the pipeline in exactly one place: the pending
//! order timeout in the decision engine. Everything else runs on event time.
//! Behind this port the engine is fully deterministic under replay.

use crate::events::TimestampMs;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" for the decision engine.
///
/// Shared by reference (`Arc<dyn Clock>`) so a test harness can hold the
/// same clock it hands to the engine.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> TimestampMs;
}

/// Real system clock for production use.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for tests and replay.
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: TimestampMs) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, ts_ms: TimestampMs) {
        self.now_ms.store(ts_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now_ms.load(Ordering::Relaxed)
    }
}
