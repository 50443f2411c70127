//! This module defines configuration options for the EEQ charge solver.

/// Configuration parameters for the electronegativity-equilibration solve.
///
/// The EEQ system is linear, so there is no iteration to configure; the
/// options control numerical safeguards around the direct solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Diagonal regularization added to every real atom's hardness.
    ///
    /// A small jitter (e.g. 1e-12) can stabilize marginally conditioned
    /// systems. It must stay well below the constraint tolerance scale so it
    /// cannot mask genuine rank deficiency.
    pub regularization: f64,
    /// Tolerance on the solved total-charge constraint.
    ///
    /// After the solve, the sum of real-atom charges must match the
    /// requested total charge to within this value; otherwise the solve is
    /// reported as singular.
    pub constraint_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            regularization: 0.0,
            constraint_tolerance: 1.0e-10,
        }
    }
}
