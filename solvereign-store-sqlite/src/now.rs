// solvereign-store-sqlite/src/now.rs
// ============================================================================
// Module: Wall Clock
// Description: The store's one wall-clock read, used only for columns the
//   trait signatures don't let a caller supply explicitly.
// Purpose: Keep SystemTime::now() out of every other module in this crate.
// Dependencies: std
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Returns the current Unix time in seconds, saturating at zero if the
/// system clock is somehow set before the epoch.
pub(crate) fn unix_now_seconds() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default().try_into().unwrap_or(i64::MAX)
}
