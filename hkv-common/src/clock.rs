//! Wall-clock helpers shared by the engine, server, and sweeper.
//!
//! Expiration is defined in absolute epoch seconds (spec data model), not a
//! monotonic clock, since TTLs are meant to survive being read back by a
//! client on another host.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time as epoch seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
