use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, zero if the clock sits before it.
pub(crate) fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
