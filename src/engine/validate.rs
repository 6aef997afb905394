//! Post-draw validation: a streaming (Welford) mean/variance pass over the
//! finished grid, emitting a non-fatal [`CheckWarning`] if the empirical
//! statistics drift outside tolerance. No value is ever rejected because of
//! this check; it only annotates an already-valid draw.

use crate::error::CheckWarning;
use crate::schema::Grid;

const TOLERANCE: f64 = 5.0;

/// Computes the empirical mean and standard deviation of the `nx x ny`
/// window of `grid` and returns a warning if either exceeds the tolerance
/// in absolute value.
pub fn validate(grid: &Grid, nx: usize, ny: usize) -> Option<CheckWarning> {
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;
    let mut count = 0.0f64;

    for j in 1..=ny as i64 {
        for i in 1..=nx as i64 {
            count += 1.0;
            let x = grid.get(i, j);
            let delta = x - mean;
            mean += delta / count;
            let delta2 = x - mean;
            m2 += delta * delta2;
        }
    }

    let variance = if count > 1.0 { m2 / (count - 1.0) } else { 0.0 };
    let stdev = variance.sqrt();

    if mean.abs() > TOLERANCE || stdev.abs() > TOLERANCE {
        Some(CheckWarning { mean, stdev, bound: TOLERANCE })
    } else {
        None
    }
}
