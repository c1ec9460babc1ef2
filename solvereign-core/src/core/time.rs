// solvereign-core/src/core/time.rs
// ============================================================================
// Module: Solvereign Timestamps
// Description: Deterministic, serializable timestamp type used across the governance core.
// Purpose: Keep time arithmetic (TTL, freeze windows) out of ambient wall-clock calls.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! All durable timestamps in Solvereign are Unix seconds wrapped in
//! [`Timestamp`]. Callers supply "now" explicitly (from the server's clock
//! source) rather than having core logic call into `SystemTime::now()`
//! directly, which keeps state-machine transitions deterministic and testable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Unix-epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Builds a timestamp from Unix seconds.
    #[must_use]
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the underlying Unix seconds.
    #[must_use]
    pub const fn unix_seconds(self) -> i64 {
        self.0
    }

    /// Returns `self + seconds`, saturating on overflow.
    #[must_use]
    pub fn plus_seconds(self, seconds: i64) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Returns `self + hours`, saturating on overflow.
    #[must_use]
    pub fn plus_hours(self, hours: i64) -> Self {
        self.plus_seconds(hours.saturating_mul(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;

    #[test]
    fn plus_hours_adds_seconds() {
        let t = Timestamp::from_unix_seconds(0);
        assert_eq!(t.plus_hours(12).unix_seconds(), 12 * 3600);
    }

    #[test]
    fn ordering_reflects_wall_clock_order() {
        let earlier = Timestamp::from_unix_seconds(10);
        let later = Timestamp::from_unix_seconds(20);
        assert!(earlier < later);
    }
}
