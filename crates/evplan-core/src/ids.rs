//! Plan id generation.
//!
//! Ids are creation timestamps in epoch milliseconds, which keeps them
//! readable and roughly sortable. Two plans created within the same
//! millisecond would collide, so [`MonotonicIds`] never hands out an id less
//! than or equal to the previous one.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Source of unique plan ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;
}

/// Clock-based ids that are strictly increasing within one generator.
#[derive(Debug, Default)]
pub struct MonotonicIds {
    last: AtomicI64,
}

impl MonotonicIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose first id is greater than `floor`.
    ///
    /// Seed with the largest stored id so that a clock that moved backwards
    /// cannot reissue an existing id.
    pub fn starting_after(floor: i64) -> Self {
        Self {
            last: AtomicI64::new(floor),
        }
    }

    fn issue(&self, now_ms: i64) -> i64 {
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_ms.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now_ms.max(prev.saturating_add(1))
    }
}

impl IdGenerator for MonotonicIds {
    fn next_id(&self) -> i64 {
        self.issue(Utc::now().timestamp_millis())
    }
}
