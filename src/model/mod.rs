//! This module implements the D4 dispersion reference model.
//!
//! Each element carries a handful of tabulated reference states sampled from
//! known molecular environments. The model interpolates over them with
//! smooth Gaussian weights in the coordination number and a continuous
//! charge-scaling function in the partial charge, producing effective atomic
//! polarizabilities. Pairwise C6 coefficients follow from Casimir-Polder
//! quadrature over the shared imaginary-frequency grid, and C8 and the
//! reference radius derive from tabulated r4r2 expectation-value factors.
//! The weighting never dispatches to a discrete nearest reference state; the
//! only exception is the underflow fallback, which is logged as a
//! non-fatal numerical-degeneracy warning.

use crate::error::D4Error;
use crate::math::constants::{CASIMIR_POLDER_WEIGHTS, N_FREQ, THREE_OVER_PI};
use crate::math::real_mask;
use crate::params::ReferenceDatabase;
use tracing::warn;

/// Selects which tabulated reference-charge set feeds the charge scaling.
///
/// Both variants share the interpolation machinery and downstream
/// interfaces; they differ only in the reference partial charges the
/// scaling function is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelVariant {
    /// Reference charges from the standard (EEQ-derived) set.
    #[default]
    Standard,
    /// Reference charges from the alternative set.
    Alternative,
}

/// The D4 dispersion reference model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct D4Model {
    /// Maximum charge-scaling height for partial-charge extrapolation.
    pub ga: f64,
    /// Charge-scaling steepness for partial-charge extrapolation.
    pub gc: f64,
    /// Gaussian weighting factor for coordination-number interpolation.
    pub wf: f64,
    /// Reference-charge set selection.
    pub variant: ModelVariant,
}

impl Default for D4Model {
    fn default() -> Self {
        Self {
            ga: 3.0,
            gc: 2.0,
            wf: 6.0,
            variant: ModelVariant::Standard,
        }
    }
}

/// Derived dispersion coefficients for every atom pair of one structure row.
///
/// Symmetric matrices stored densely; entries involving padding atoms are
/// zero (c6, c8) or inert (r0).
#[derive(Debug, Clone, PartialEq)]
pub struct PairCoefficients {
    /// Dipole-dipole coefficients C6(A, B) in Hartree * Bohr^6.
    pub c6: Vec<Vec<f64>>,
    /// Dipole-quadrupole coefficients C8(A, B) in Hartree * Bohr^8.
    pub c8: Vec<Vec<f64>>,
    /// Pairwise reference radii R0(A, B) in Bohr.
    pub r0: Vec<Vec<f64>>,
}

impl D4Model {
    /// Sets the reference-charge variant, consuming and returning the model.
    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Computes normalized reference-state weights for every atom.
    ///
    /// The weight of state `r` of atom `i` is a stack of `ngw` Gaussians in
    /// `CN_i - CN_ref`, normalized over the atom's states, multiplied by the
    /// continuous charge-scaling function evaluated at the atom's partial
    /// charge. Padding atoms receive an empty weight vector.
    ///
    /// When every Gaussian underflows (an atom far outside its tabulated CN
    /// range), the weight collapses onto the state with the highest
    /// reference CN and a warning is emitted; this keeps the normalization
    /// well defined without changing the smooth regime.
    pub fn weight_references(
        &self,
        numbers: &[u8],
        cn: &[f64],
        charges: &[f64],
        db: &ReferenceDatabase,
    ) -> Result<Vec<Vec<f64>>, D4Error> {
        let n = numbers.len();
        if cn.len() != n {
            return Err(D4Error::ShapeMismatch {
                expected: n,
                found: cn.len(),
            });
        }
        if charges.len() != n {
            return Err(D4Error::ShapeMismatch {
                expected: n,
                found: charges.len(),
            });
        }

        let mut weights = Vec::with_capacity(n);
        for i in 0..n {
            if numbers[i] == 0 {
                weights.push(Vec::new());
                continue;
            }
            let record = db.element(numbers[i])?;

            let mut gw: Vec<f64> = record
                .refs
                .iter()
                .map(|state| {
                    let dcn2 = (cn[i] - state.cn).powi(2);
                    (1..=state.ngw)
                        .map(|g| (-(g as f64) * self.wf * dcn2).exp())
                        .sum::<f64>()
                })
                .collect();

            let norm: f64 = gw.iter().sum();
            if norm < f64::MIN_POSITIVE || !norm.is_finite() {
                warn!(
                    atom = i,
                    element = numbers[i],
                    cn = cn[i],
                    "reference-state weights underflowed; falling back to the CN-nearest state"
                );
                let nearest = nearest_by_max_cn(record.refs.iter().map(|s| s.cn));
                for (r, value) in gw.iter_mut().enumerate() {
                    *value = if r == nearest { 1.0 } else { 0.0 };
                }
            } else {
                for value in gw.iter_mut() {
                    *value /= norm;
                }
            }

            for (state, value) in record.refs.iter().zip(gw.iter_mut()) {
                let q_ref = match self.variant {
                    ModelVariant::Standard => state.q,
                    ModelVariant::Alternative => state.q_alt,
                };
                *value *= zeta(
                    self.ga,
                    record.gam * self.gc,
                    q_ref + record.zeff,
                    charges[i] + record.zeff,
                );
            }

            weights.push(gw);
        }
        Ok(weights)
    }

    /// Weight-sums the tabulated polarizability samples into one effective
    /// dynamic polarizability per atom. Padding atoms yield all zeros.
    pub fn effective_polarizabilities(
        &self,
        numbers: &[u8],
        weights: &[Vec<f64>],
        db: &ReferenceDatabase,
    ) -> Result<Vec<[f64; N_FREQ]>, D4Error> {
        let mut alpha = vec![[0.0; N_FREQ]; numbers.len()];
        for (i, &z) in numbers.iter().enumerate() {
            if z == 0 {
                continue;
            }
            let record = db.element(z)?;
            for (state, &w) in record.refs.iter().zip(&weights[i]) {
                for k in 0..N_FREQ {
                    alpha[i][k] += w * state.alpha[k];
                }
            }
        }
        Ok(alpha)
    }

    /// Derives all pair coefficients (C6, C8, R0) for one structure row from
    /// coordination numbers and partial charges.
    ///
    /// C6 is the Casimir-Polder quadrature of the product of effective
    /// polarizabilities; C8 and R0 follow from the tabulated r4r2 factors.
    /// Rows and columns of padding atoms are zero in C6/C8.
    ///
    /// # Arguments
    ///
    /// * `numbers` - Atomic numbers of the structure row, zero marking
    ///   padding slots.
    /// * `cn` - D4-variant coordination numbers, aligned with `numbers`.
    /// * `charges` - EEQ partial charges, aligned with `numbers`.
    /// * `db` - The reference database holding the tabulated states.
    ///
    /// # Returns
    ///
    /// A `Result` containing the dense symmetric `PairCoefficients` matrices
    /// on success, or a `D4Error` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`D4Error::ShapeMismatch`] on inconsistent input lengths, or
    /// [`D4Error::UnknownElement`] if a real atom lacks tabulated data.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::{default_reference, D4Model};
    ///
    /// let db = default_reference();
    /// let coeffs = D4Model::default()
    ///     .pair_coefficients(&[6, 8], &[1.0, 1.0], &[0.1, -0.1], db)
    ///     .unwrap();
    ///
    /// assert!(coeffs.c6[0][1] > 0.0);
    /// assert_eq!(coeffs.c6[0][1], coeffs.c6[1][0]);
    /// ```
    pub fn pair_coefficients(
        &self,
        numbers: &[u8],
        cn: &[f64],
        charges: &[f64],
        db: &ReferenceDatabase,
    ) -> Result<PairCoefficients, D4Error> {
        let n = numbers.len();
        let weights = self.weight_references(numbers, cn, charges, db)?;
        let alpha = self.effective_polarizabilities(numbers, &weights, db)?;

        let mut r4r2 = vec![0.0; n];
        for (i, &z) in numbers.iter().enumerate() {
            if z != 0 {
                r4r2[i] = db.element(z)?.r4r2;
            }
        }

        let mut c6 = vec![vec![0.0; n]; n];
        let mut c8 = vec![vec![0.0; n]; n];
        let mut r0 = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let mask = real_mask(numbers[i]) * real_mask(numbers[j]);
                let mut integral = 0.0;
                for k in 0..N_FREQ {
                    integral += CASIMIR_POLDER_WEIGHTS[k] * alpha[i][k] * alpha[j][k];
                }
                let c6_ij = mask * THREE_OVER_PI * integral;
                let qq = 3.0 * r4r2[i] * r4r2[j];
                c6[i][j] = c6_ij;
                c6[j][i] = c6_ij;
                c8[i][j] = c6_ij * qq;
                c8[j][i] = c6_ij * qq;
                r0[i][j] = qq.sqrt();
                r0[j][i] = qq.sqrt();
            }
        }

        Ok(PairCoefficients { c6, c8, r0 })
    }
}

/// Index of the reference state with the highest reference CN.
fn nearest_by_max_cn(cns: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_cn = f64::NEG_INFINITY;
    for (r, cn) in cns.enumerate() {
        if cn > best_cn {
            best_cn = cn;
            best = r;
        }
    }
    best
}

/// Continuous charge-scaling function of the D4 model.
///
/// For non-positive effective charge the scaling saturates at `exp(a)`; the
/// physically reachable domain (`q + z_eff > 0`) is smooth.
fn zeta(a: f64, gam: f64, q_ref: f64, q_mod: f64) -> f64 {
    if q_mod <= 0.0 {
        a.exp()
    } else {
        (a * (1.0 - (gam * (1.0 - q_ref / q_mod)).exp())).exp()
    }
}
