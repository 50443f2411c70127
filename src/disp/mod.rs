//! This module assembles the full dispersion-energy pipeline.
//!
//! For every structure of a (padded) batch: coordination numbers feed the
//! EEQ charge solve, charges and the D4 coordination numbers feed the
//! reference model's pair coefficients, and the damped two-body plus
//! three-body terms accumulate the per-atom energies. Batch members are
//! processed in parallel; within each member every stage uses the same
//! multiplicative masking, so padding atoms come out with exactly zero
//! energy and real atoms are unaffected by padding.

mod threebody;
mod twobody;

pub use threebody::threebody_energy;
pub use twobody::twobody_energy;

use crate::damping::DampingParams;
use crate::error::D4Error;
use crate::model::D4Model;
use crate::ncoord::{CnOptions, CnVariant, CutoffMode, coordination_number};
use crate::params::ReferenceDatabase;
use crate::solver::{EeqSolver, SolverOptions};
use crate::types::{Structure, pad};
use rayon::prelude::*;

/// Real-space cutoff radii of the pipeline, in Bohr.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoffs {
    /// Coordination-number cutoff.
    pub cn: f64,
    /// Two-body dispersion cutoff.
    pub disp2: f64,
    /// Per-leg three-body dispersion cutoff.
    pub disp3: f64,
    /// Hard zero or smooth taper at the cutoff boundary.
    pub mode: CutoffMode,
}

impl Default for Cutoffs {
    fn default() -> Self {
        Self {
            cn: 30.0,
            disp2: 60.0,
            disp3: 40.0,
            mode: CutoffMode::Hard,
        }
    }
}

/// The DFT-D4 dispersion-energy calculator.
///
/// Wires the coordination-number estimator, the EEQ charge solver, the
/// reference model, and both energy terms into one entry point. The
/// reference database is injected by reference; model, cutoffs, and solver
/// options are configurable through the builder methods.
///
/// # Examples
///
/// ```
/// use d4disp::{DispersionCalculator, Structure, default_functionals, default_reference};
///
/// let db = default_reference();
/// let params = default_functionals().resolve("tpssh").unwrap();
///
/// let h2 = Structure::new(
///     vec![1, 1],
///     vec![[0.0, 0.0, 0.0], [1.4, 0.0, 0.0]],
/// );
///
/// let energies = DispersionCalculator::new(db).energies(&[h2], &params).unwrap();
/// assert_eq!(energies[0].len(), 2);
/// ```
pub struct DispersionCalculator<'p> {
    db: &'p ReferenceDatabase,
    model: D4Model,
    cutoffs: Cutoffs,
    solver_options: SolverOptions,
}

impl<'p> DispersionCalculator<'p> {
    /// Creates a new `DispersionCalculator` with the default model, cutoffs,
    /// and solver options.
    ///
    /// # Arguments
    ///
    /// * `db` - A reference to the `ReferenceDatabase` backing every stage of
    ///   the pipeline.
    ///
    /// # Returns
    ///
    /// A new `DispersionCalculator` instance with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::{default_reference, DispersionCalculator};
    ///
    /// let db = default_reference();
    /// let calculator = DispersionCalculator::new(db);
    /// ```
    pub fn new(db: &'p ReferenceDatabase) -> Self {
        Self {
            db,
            model: D4Model::default(),
            cutoffs: Cutoffs::default(),
            solver_options: SolverOptions::default(),
        }
    }

    /// Replaces the reference model.
    ///
    /// # Arguments
    ///
    /// * `model` - The `D4Model` controlling reference weighting and charge
    ///   scaling.
    ///
    /// # Returns
    ///
    /// A new `DispersionCalculator` instance with the specified model.
    pub fn with_model(mut self, model: D4Model) -> Self {
        self.model = model;
        self
    }

    /// Replaces the cutoff configuration.
    ///
    /// # Arguments
    ///
    /// * `cutoffs` - The real-space `Cutoffs` to apply to all pipeline
    ///   stages.
    ///
    /// # Returns
    ///
    /// A new `DispersionCalculator` instance with the specified cutoffs.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::{default_reference, Cutoffs, DispersionCalculator};
    ///
    /// let db = default_reference();
    /// let cutoffs = Cutoffs {
    ///     disp3: 25.0,
    ///     ..Default::default()
    /// };
    /// let calculator = DispersionCalculator::new(db).with_cutoffs(cutoffs);
    /// ```
    pub fn with_cutoffs(mut self, cutoffs: Cutoffs) -> Self {
        self.cutoffs = cutoffs;
        self
    }

    /// Replaces the EEQ solver options.
    ///
    /// # Arguments
    ///
    /// * `options` - The `SolverOptions` forwarded to the charge solve of
    ///   every structure.
    ///
    /// # Returns
    ///
    /// A new `DispersionCalculator` instance with the specified solver
    /// options.
    pub fn with_solver_options(mut self, options: SolverOptions) -> Self {
        self.solver_options = options;
        self
    }

    /// Computes per-atom dispersion energies for a batch of structures.
    ///
    /// The batch is padded to its maximum atom count; the result has one row
    /// per structure with that padded length, and zeros at padding
    /// positions. Shape and element-coverage errors surface before any
    /// computation; a failed EEQ solve aborts the affected structure's whole
    /// energy computation (no partial result).
    ///
    /// # Arguments
    ///
    /// * `structures` - The batch of structures; members may differ in atom
    ///   count.
    /// * `params` - The damping parameters of the target functional.
    ///
    /// # Returns
    ///
    /// A `Result` containing one row of per-atom energies (Hartree) per
    /// structure on success, or a `D4Error` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`D4Error::NoAtoms`] for an empty batch,
    /// [`D4Error::UnknownElement`] if any real atom lacks tabulated data, and
    /// [`D4Error::SingularSystem`] if a structure's EEQ solve fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use d4disp::{default_functionals, default_reference, DispersionCalculator, Structure};
    ///
    /// let db = default_reference();
    /// let params = default_functionals().resolve("pbe0").unwrap();
    ///
    /// let h2 = Structure::new(vec![1, 1], vec![[0.0, 0.0, 0.0], [1.4, 0.0, 0.0]]);
    /// let rows = DispersionCalculator::new(db).energies(&[h2], &params).unwrap();
    ///
    /// assert_eq!(rows.len(), 1);
    /// assert!(rows[0].iter().sum::<f64>() < 0.0);
    /// ```
    pub fn energies(
        &self,
        structures: &[Structure],
        params: &DampingParams,
    ) -> Result<Vec<Vec<f64>>, D4Error> {
        let batch = pad(structures)?;
        for row in &batch {
            self.db.check_coverage(&row.numbers)?;
        }

        batch
            .par_iter()
            .map(|row| self.structure_energy(row, params))
            .collect()
    }

    /// Computes total dispersion energies, one scalar per structure.
    ///
    /// # Arguments
    ///
    /// * `structures` - The batch of structures; members may differ in atom
    ///   count.
    /// * `params` - The damping parameters of the target functional.
    ///
    /// # Returns
    ///
    /// A `Result` containing one total energy (Hartree) per structure on
    /// success, or a `D4Error` on failure.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`Self::energies`].
    pub fn total_energies(
        &self,
        structures: &[Structure],
        params: &DampingParams,
    ) -> Result<Vec<f64>, D4Error> {
        Ok(self
            .energies(structures, params)?
            .iter()
            .map(|row| row.iter().sum())
            .collect())
    }

    /// Runs the full pipeline for one padded structure row.
    fn structure_energy(
        &self,
        structure: &Structure,
        params: &DampingParams,
    ) -> Result<Vec<f64>, D4Error> {
        let numbers = &structure.numbers;
        let positions = &structure.positions;

        let mut cn_eeq_options = CnOptions::eeq();
        cn_eeq_options.cutoff = self.cutoffs.cn;
        cn_eeq_options.mode = self.cutoffs.mode;
        let cn_eeq = coordination_number(numbers, positions, self.db, &cn_eeq_options)?;

        let charges = EeqSolver::new(self.db)
            .with_options(self.solver_options)
            .solve(numbers, &cn_eeq, positions, structure.total_charge)?
            .charges;

        let cn_options = CnOptions {
            variant: CnVariant::D4,
            cutoff: self.cutoffs.cn,
            mode: self.cutoffs.mode,
            ..CnOptions::d4()
        };
        let cn = coordination_number(numbers, positions, self.db, &cn_options)?;

        let coefficients = self
            .model
            .pair_coefficients(numbers, &cn, &charges, self.db)?;

        let mut energies = twobody_energy(
            numbers,
            positions,
            &coefficients,
            params,
            self.cutoffs.disp2,
            self.cutoffs.mode,
        );
        let e3 = threebody_energy(
            numbers,
            positions,
            &coefficients,
            params,
            self.cutoffs.disp3,
            self.cutoffs.mode,
        );
        for (e, e3) in energies.iter_mut().zip(e3) {
            *e += e3;
        }
        Ok(energies)
    }
}

/// Computes per-atom dispersion energies with the embedded reference
/// database and default model and cutoffs.
///
/// Convenience wrapper over [`DispersionCalculator`] for the common case.
///
/// # Arguments
///
/// * `structures` - The batch of structures; members may differ in atom
///   count.
/// * `params` - The damping parameters of the target functional.
///
/// # Returns
///
/// A `Result` containing one row of per-atom energies (Hartree) per
/// structure on success, or a `D4Error` on failure.
///
/// # Examples
///
/// ```
/// use d4disp::{default_functionals, dispersion_energy, Structure};
///
/// let params = default_functionals().resolve("tpssh").unwrap();
/// let h2 = Structure::new(vec![1, 1], vec![[0.0, 0.0, 0.0], [1.4, 0.0, 0.0]]);
///
/// let rows = dispersion_energy(&[h2], &params).unwrap();
/// assert_eq!(rows[0].len(), 2);
/// ```
pub fn dispersion_energy(
    structures: &[Structure],
    params: &DampingParams,
) -> Result<Vec<Vec<f64>>, D4Error> {
    DispersionCalculator::new(crate::default_reference()).energies(structures, params)
}
