//! Fractional position allocation.
//!
//! Positions are `f64` keys; inserting between two neighbours only needs one
//! new key. The key is drawn from the middle 80% of the gap so that repeated
//! insertions at the same edge shrink the gap by at most 10x per step
//! instead of converging onto the boundary.

use rand::Rng;

/// Lower bound of the random fraction of the gap.
pub const MIN_FRACTION: f64 = 0.1;

/// Upper bound of the random fraction of the gap.
pub const MAX_FRACTION: f64 = 0.9;

/// Half-width of the gap extrapolated past either end of a list.
pub const EDGE_GAP: f64 = 2.0;

/// Allocate a position inside `(low, high)` using the thread RNG.
///
/// `low <= high` is the caller's responsibility. Equal bounds return that
/// value.
pub fn allocate(low: f64, high: f64) -> f64 {
    allocate_with(&mut rand::thread_rng(), low, high)
}

/// Allocate a position inside `(low, high)` using the given RNG.
pub fn allocate_with<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    debug_assert!(low <= high, "allocate called with low > high");
    let fraction = rng.gen_range(MIN_FRACTION..=MAX_FRACTION);
    low + fraction * (high - low)
}

/// Position for a new last member of a list whose current maximum is `max`.
///
/// An empty list starts at 0.
pub fn append_position(max: Option<f64>) -> f64 {
    append_position_with(&mut rand::thread_rng(), max)
}

/// [`append_position`] with an explicit RNG.
pub fn append_position_with<R: Rng + ?Sized>(rng: &mut R, max: Option<f64>) -> f64 {
    match max {
        Some(max) => allocate_with(rng, max, max + EDGE_GAP),
        None => 0.0,
    }
}
