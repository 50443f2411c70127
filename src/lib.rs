//! DFT-D4 dispersion-energy correction for molecular structures.
//!
//! The pipeline turns atomic numbers, positions (Bohr), and a total charge
//! into per-atom dispersion energies (Hartree): smooth coordination numbers,
//! an electronegativity-equilibration partial-charge solve, charge- and
//! CN-dependent interpolation over tabulated reference polarizabilities, and
//! Becke-Johnson damped two-body plus Axilrod-Teller-Muto three-body energy
//! assembly. Batches of variable-size structures are zero-padded to a
//! rectangle; padding atoms are nulled by multiplicative masks at every
//! stage, never by control-flow exclusion, so the whole pipeline stays a
//! smooth function of the positions.

pub mod damping;
pub mod disp;
pub mod error;
pub mod math;
pub mod model;
pub mod ncoord;
pub mod params;
pub mod solver;
pub mod types;

pub use damping::{DampingParams, FunctionalTable};
pub use disp::{Cutoffs, DispersionCalculator, dispersion_energy};
pub use error::D4Error;
pub use model::{D4Model, ModelVariant};
pub use ncoord::{CnOptions, CnVariant, CutoffMode};
pub use params::ReferenceDatabase;
pub use solver::{EeqSolver, SolverOptions};
pub use types::{Structure, pad};

use std::sync::OnceLock;

static DEFAULT_REFERENCE: OnceLock<ReferenceDatabase> = OnceLock::new();
static DEFAULT_FUNCTIONALS: OnceLock<FunctionalTable> = OnceLock::new();

/// Returns the embedded reference database, parsed on first use.
pub fn default_reference() -> &'static ReferenceDatabase {
    DEFAULT_REFERENCE.get_or_init(|| {
        const REFERENCE_TOML: &str = include_str!("../resources/d4.reference.toml");
        ReferenceDatabase::load_from_str(REFERENCE_TOML)
            .expect("Failed to parse embedded reference database. This is a library bug.")
    })
}

/// Returns the embedded functional-to-damping-parameter table, parsed on
/// first use.
pub fn default_functionals() -> &'static FunctionalTable {
    DEFAULT_FUNCTIONALS.get_or_init(|| {
        const DAMPING_TOML: &str = include_str!("../resources/damping.toml");
        FunctionalTable::load_from_str(DAMPING_TOML)
            .expect("Failed to parse embedded damping parameters. This is a library bug.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reference_is_cached() {
        let db1 = default_reference();
        assert!(db1.elements.contains_key(&6), "Carbon (6) should be present");
        assert!(db1.elements.contains_key(&16), "Sulfur (16) should be present");

        let db2 = default_reference();
        assert_eq!(
            db1 as *const _, db2 as *const _,
            "Subsequent calls should return a cached reference"
        );
    }

    #[test]
    fn test_default_reference_state_counts() {
        let db = default_reference();
        assert_eq!(db.element(1).unwrap().refs.len(), 2);
        assert_eq!(db.element(6).unwrap().refs.len(), 7);
        assert_eq!(db.element(16).unwrap().refs.len(), 3);
    }

    #[test]
    fn test_default_functionals_cover_common_sets() {
        let table = default_functionals();
        for name in ["pbe", "pbe0", "b3lyp", "tpss", "tpssh", "revpbe"] {
            assert!(table.resolve(name).is_ok(), "missing functional: {name}");
        }
    }
}
