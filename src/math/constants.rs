//! This module defines the physical constants and fixed quadrature data used
//! throughout the dispersion pipeline.
//!
//! All quantities are in Hartree atomic units. The Casimir-Polder grid and
//! its trapezoidal weights are shared by every element's tabulated reference
//! polarizabilities and must stay consistent with the reference database.

/// Steepness of the erf counting function used for coordination numbers.
pub const CN_STEEPNESS: f64 = 7.5;

/// Prefactor of the electronegativity correction in the D4 coordination
/// number (Eq. 6 of the D4 paper).
pub const CN_K4: f64 = 4.10451;

/// Shift of the electronegativity correction in the D4 coordination number.
pub const CN_K5: f64 = 19.08857;

/// Width of the electronegativity correction in the D4 coordination number,
/// 2 * 11.28174^2.
pub const CN_K6: f64 = 2.0 * 11.28174 * 11.28174;

/// Smooth upper bound applied to coordination numbers entering the EEQ
/// charge model.
pub const CN_EEQ_MAX: f64 = 8.0;

/// 3 / pi, the prefactor of the Casimir-Polder integral for C6 coefficients.
pub const THREE_OVER_PI: f64 = 3.0 / std::f64::consts::PI;

/// sqrt(2 / pi), entering the Gaussian self-interaction on the EEQ diagonal.
pub const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;

/// Exponent of the zero-damping function in the three-body (ATM) term.
pub const ATM_ALPHA: f64 = 16.0;

/// Distance floor in Bohr. Pair distances are clamped from below at this
/// value so coincident padding atoms never divide by zero; any such pair is
/// nulled by its mask anyway.
pub const DISTANCE_FLOOR: f64 = 1e-12;

/// Number of imaginary-frequency samples in the Casimir-Polder quadrature.
pub const N_FREQ: usize = 23;

/// Trapezoidal weights of the 23-point Casimir-Polder quadrature, including
/// the global 1/2 of the trapezoid rule. `C6 = (3/pi) * sum_k w_k *
/// alpha_A(iw_k) * alpha_B(iw_k)` with these weights.
pub const CASIMIR_POLDER_WEIGHTS: [f64; N_FREQ] = [
    0.0249995, 0.0499995, 0.0750000, 0.1000000, 0.1000000, 0.1000000, 0.1000000, 0.1000000,
    0.1000000, 0.1000000, 0.1000000, 0.1500000, 0.2000000, 0.2000000, 0.2000000, 0.2000000,
    0.3500000, 0.5000000, 0.7500000, 1.0000000, 1.7500000, 2.5000000, 1.2500000,
];
