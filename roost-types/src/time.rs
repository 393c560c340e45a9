//! Wall-clock timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as seconds since the Unix epoch, at microsecond resolution.
///
/// Creation and modification times, completion times and page cursors all
/// use this representation.
pub fn now() -> f64 {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or(0);
    micros as f64 / 1_000_000.0
}
