//! This module implements the core `EeqSolver` for electronegativity
//! equilibration.
//!
//! The solver assembles, per structure, a symmetric linear system over the
//! unknown partial charges plus one Lagrange multiplier enforcing the
//! total-charge constraint, and solves it directly with an LU factorization.
//! Padding atoms are decoupled through identity rows so they resolve to
//! exactly zero charge without perturbing the real subsystem.

use crate::error::D4Error;
use crate::math::constants::SQRT_2_OVER_PI;
use crate::math::{floored_distance, real_mask};
use crate::params::ReferenceDatabase;
use crate::solver::options::SolverOptions;
use faer::{Col, Mat, prelude::*};
use libm::erf;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// The result of an EEQ charge solve for one structure.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeResult {
    /// Partial charges, aligned with the input atoms; exactly zero at
    /// padding positions.
    pub charges: Vec<f64>,
    /// The equilibrated electronegativity (the Lagrange multiplier of the
    /// total-charge constraint).
    pub potential: f64,
}

/// The electronegativity-equilibration charge solver.
///
/// Holds a reference to the tabulated EEQ parameters and the numerical
/// options. The solve itself is stateless; one solver instance can serve any
/// number of structures.
pub struct EeqSolver<'p> {
    parameters: &'p ReferenceDatabase,
    options: SolverOptions,
}

impl<'p> EeqSolver<'p> {
    /// Creates a new `EeqSolver` with default options.
    ///
    /// # Arguments
    ///
    /// * `parameters` - A reference to the `ReferenceDatabase` containing the
    ///   per-element EEQ parameters.
    ///
    /// # Returns
    ///
    /// A new `EeqSolver` instance with default `SolverOptions`.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::{default_reference, EeqSolver};
    ///
    /// let db = default_reference();
    /// let solver = EeqSolver::new(db);
    /// ```
    pub fn new(parameters: &'p ReferenceDatabase) -> Self {
        Self {
            parameters,
            options: SolverOptions::default(),
        }
    }

    /// Configures the solver with custom options.
    ///
    /// This method allows setting non-default numerical parameters such as
    /// diagonal regularization and the constraint tolerance. It consumes the
    /// solver and returns a new instance with the updated options.
    ///
    /// # Arguments
    ///
    /// * `options` - The `SolverOptions` to apply to the solver.
    ///
    /// # Returns
    ///
    /// A new `EeqSolver` instance with the specified options.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::{default_reference, EeqSolver, SolverOptions};
    ///
    /// let db = default_reference();
    /// let options = SolverOptions {
    ///     regularization: 1e-10,
    ///     ..Default::default()
    /// };
    /// let solver = EeqSolver::new(db).with_options(options);
    /// ```
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Solves the EEQ system for one (possibly padded) structure row.
    ///
    /// The method assembles the constrained linear system over the partial
    /// charges plus one Lagrange multiplier and solves it directly with an LU
    /// factorization. The solved charges satisfy
    /// `sum(charges) == total_charge` to the configured tolerance, with
    /// padding atoms contributing exactly zero.
    ///
    /// # Arguments
    ///
    /// * `numbers` - Atomic numbers of the structure row, zero marking
    ///   padding slots.
    /// * `cn` - Coordination numbers from the EEQ variant of the estimator,
    ///   aligned with `numbers`.
    /// * `positions` - Cartesian coordinates in Bohr, aligned with `numbers`.
    /// * `total_charge` - The total charge the solved charges must sum to.
    ///
    /// # Returns
    ///
    /// A `Result` containing a `ChargeResult` with the per-atom charges and
    /// the equilibrated potential on success, or a `D4Error` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`D4Error::ShapeMismatch`] on inconsistent input lengths,
    /// [`D4Error::NoAtoms`] if no real atom is present, and
    /// [`D4Error::SingularSystem`] if the factorization fails, the solution
    /// is non-finite, or the charge-sum constraint is violated.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::{default_reference, CnOptions, EeqSolver};
    /// use d4disp::ncoord::coordination_number;
    ///
    /// let db = default_reference();
    /// let numbers = [8, 1, 1];
    /// let positions = [
    ///     [0.0, 0.0, 0.2226],
    ///     [0.0, 1.43047, -0.8904],
    ///     [0.0, -1.43047, -0.8904],
    /// ];
    ///
    /// let cn = coordination_number(&numbers, &positions, db, &CnOptions::eeq()).unwrap();
    /// let result = EeqSolver::new(db).solve(&numbers, &cn, &positions, 0.0).unwrap();
    ///
    /// assert_eq!(result.charges.len(), 3);
    /// let sum: f64 = result.charges.iter().sum();
    /// assert!(sum.abs() < 1e-10);
    /// ```
    pub fn solve(
        &self,
        numbers: &[u8],
        cn: &[f64],
        positions: &[[f64; 3]],
        total_charge: f64,
    ) -> Result<ChargeResult, D4Error> {
        let n = numbers.len();
        if positions.len() != n {
            return Err(D4Error::ShapeMismatch {
                expected: n,
                found: positions.len(),
            });
        }
        if cn.len() != n {
            return Err(D4Error::ShapeMismatch {
                expected: n,
                found: cn.len(),
            });
        }
        if numbers.iter().all(|&z| z == 0) {
            return Err(D4Error::NoAtoms);
        }

        let (matrix, rhs) = self.build_system(numbers, cn, positions, total_charge)?;

        let solve_result = panic::catch_unwind(AssertUnwindSafe(|| {
            matrix.partial_piv_lu().solve(&rhs)
        }));

        let solution = match solve_result {
            Ok(sol) => sol,
            Err(_) => {
                return Err(D4Error::SingularSystem(
                    "LU factorization panicked; the EEQ matrix is likely singular".to_string(),
                ));
            }
        };

        if solution.as_ref().iter().any(|value| !value.is_finite()) {
            return Err(D4Error::SingularSystem(
                "EEQ solution contains non-finite entries".to_string(),
            ));
        }

        let charges: Vec<f64> = (0..n).map(|i| real_mask(numbers[i]) * solution[i]).collect();
        let potential = solution[n];

        let charge_sum: f64 = charges.iter().sum();
        let violation = (charge_sum - total_charge).abs();
        if violation > self.options.constraint_tolerance {
            return Err(D4Error::SingularSystem(format!(
                "total-charge constraint violated by {:.3e}; the EEQ matrix is rank-deficient",
                violation
            )));
        }

        debug!(
            atoms = n,
            charge_sum, potential, "EEQ charge solve converged"
        );

        Ok(ChargeResult { charges, potential })
    }

    /// Assembles the constrained EEQ linear system.
    ///
    /// Layout: indices `0..n` are atoms, index `n` is the Lagrange
    /// multiplier. Real atoms get hardness plus Gaussian self-interaction on
    /// the diagonal and the erf-damped Coulomb kernel off the diagonal;
    /// padding atoms get identity rows with zero right-hand side.
    fn build_system(
        &self,
        numbers: &[u8],
        cn: &[f64],
        positions: &[[f64; 3]],
        total_charge: f64,
    ) -> Result<(Mat<f64>, Col<f64>), D4Error> {
        let n = numbers.len();
        let size = n + 1;

        let mut matrix = Mat::zeros(size, size);
        let mut rhs = Col::zeros(size);

        let mut rad = vec![0.0; n];
        for (i, &z) in numbers.iter().enumerate() {
            if z == 0 {
                matrix[(i, i)] = 1.0;
                continue;
            }
            let eeq = self.parameters.element(z)?.eeq;
            rad[i] = eeq.rad;
            matrix[(i, i)] =
                eeq.eta + SQRT_2_OVER_PI / eeq.rad + self.options.regularization;
            rhs[i] = -(eeq.chi - eeq.kcn * cn[i].max(0.0).sqrt());
            matrix[(i, size - 1)] = 1.0;
            matrix[(size - 1, i)] = 1.0;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let mask = real_mask(numbers[i]) * real_mask(numbers[j]);
                let r = floored_distance(positions[i], positions[j]);
                let gamma = 1.0 / (rad[i] * rad[i] + rad[j] * rad[j]).max(1e-300).sqrt();
                let kernel = mask * erf(gamma * r) / r;
                matrix[(i, j)] = kernel;
                matrix[(j, i)] = kernel;
            }
        }

        rhs[size - 1] = total_charge;
        Ok((matrix, rhs))
    }
}
