//! This module provides mathematical utilities and physical constants for the
//! dispersion pipeline.
//!
//! It contains the fixed Casimir-Polder quadrature data, numerical thresholds,
//! and small geometry helpers shared by the coordination-number estimator, the
//! EEQ solver, and both energy terms.

/// Physical constants, counting-function parameters, and quadrature weights.
pub mod constants;

use self::constants::DISTANCE_FLOOR;

/// Euclidean distance between two points, floored at [`DISTANCE_FLOOR`].
///
/// The floor keeps divisions well defined when two padding atoms coincide at
/// the origin; masked terms involving such pairs are multiplied by zero
/// downstream, so the floored value never reaches the output.
#[inline]
pub fn floored_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d2 = (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2);
    d2.sqrt().max(DISTANCE_FLOOR)
}

/// Multiplicative 0/1 weight selecting real (non-padding) atoms.
#[inline]
pub fn real_mask(atomic_number: u8) -> f64 {
    if atomic_number != 0 { 1.0 } else { 0.0 }
}

/// Multiplicative 0/1 weight selecting distances inside a cutoff radius.
#[inline]
pub fn within_cutoff(distance: f64, cutoff: f64) -> f64 {
    if distance <= cutoff { 1.0 } else { 0.0 }
}

/// Polynomial switching function tapering smoothly from 1 to 0 over
/// `[on, off]`.
///
/// Below `on` the weight is exactly 1, beyond `off` exactly 0; in between it
/// follows the C^1-continuous cubic `1 - x^2 (3 - 2x)`.
#[inline]
pub fn taper(distance: f64, on: f64, off: f64) -> f64 {
    if distance <= on {
        1.0
    } else if distance >= off {
        0.0
    } else {
        let x = (distance - on) / (off - on);
        1.0 - x * x * (3.0 - 2.0 * x)
    }
}
