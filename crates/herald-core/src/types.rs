use chrono::Utc;
use serde::{Deserialize, Serialize};

// =============================================================================
// Newtype Wrappers - Temporal
// =============================================================================

/// Unix timestamp in seconds since epoch, read from the wall clock.
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Seconds elapsed between `self` and `now`. Never negative.
    pub fn age_secs_at(&self, now: Timestamp) -> u64 {
        (now.0 - self.0).max(0) as u64
    }

    /// Seconds elapsed since `self` on the wall clock.
    pub fn age_secs(&self) -> u64 {
        self.age_secs_at(Timestamp::now())
    }

    /// A timestamp `secs` seconds after `self`.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
