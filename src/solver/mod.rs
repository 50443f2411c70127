//! This module contains the electronegativity-equilibration (EEQ) charge
//! solver.
//!
//! It includes the `EeqSolver` implementation and `SolverOptions` for
//! configuring the numerical safeguards of the constrained linear solve.

mod implementation;
mod options;

pub use implementation::{ChargeResult, EeqSolver};
pub use options::SolverOptions;
