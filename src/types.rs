//! This module defines the core input types of the dispersion pipeline.
//!
//! A [`Structure`] is one molecule: atomic numbers, Cartesian positions in
//! Bohr, and a total charge. Batches of structures are padded to a common
//! atom count with the sentinel atomic number 0; every stage of the pipeline
//! derives its real/padding mask from that sentinel, so padded rows flow
//! through the same arithmetic as real atoms and come out exactly zero.

use crate::error::D4Error;

/// Atomic number used to mark padding positions in a batched structure.
pub const PADDING: u8 = 0;

/// A single molecular structure in Hartree atomic units.
///
/// Positions are in Bohr. Atomic number 0 marks a padding atom; padding atoms
/// are inert at every stage of the pipeline and always receive zero
/// coordination number, zero partial charge, and zero energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    /// Atomic numbers, one per atom; 0 is the padding sentinel.
    pub numbers: Vec<u8>,
    /// Cartesian positions in Bohr, aligned with `numbers`.
    pub positions: Vec<[f64; 3]>,
    /// Total charge of the structure in elementary charges.
    pub total_charge: f64,
}

impl Structure {
    /// Creates a neutral structure from atomic numbers and positions.
    pub fn new(numbers: Vec<u8>, positions: Vec<[f64; 3]>) -> Self {
        Self {
            numbers,
            positions,
            total_charge: 0.0,
        }
    }

    /// Sets the total charge, consuming and returning the structure.
    pub fn with_charge(mut self, total_charge: f64) -> Self {
        self.total_charge = total_charge;
        self
    }

    /// Number of atom slots, padding included.
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Whether the structure has no atom slots at all.
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Number of real (non-padding) atoms.
    pub fn num_real(&self) -> usize {
        self.numbers.iter().filter(|&&z| z != PADDING).count()
    }

    /// Checks that numbers and positions agree in length and that at least
    /// one real atom is present.
    pub fn validate(&self) -> Result<(), D4Error> {
        if self.numbers.len() != self.positions.len() {
            return Err(D4Error::ShapeMismatch {
                expected: self.numbers.len(),
                found: self.positions.len(),
            });
        }
        if self.num_real() == 0 {
            return Err(D4Error::NoAtoms);
        }
        Ok(())
    }

    /// Returns a copy padded with inert atoms up to `n` slots.
    ///
    /// Padding atoms carry atomic number 0 and sit at the origin; masking
    /// keeps them decoupled from the real subsystem regardless of position.
    pub fn padded_to(&self, n: usize) -> Self {
        let mut numbers = self.numbers.clone();
        let mut positions = self.positions.clone();
        numbers.resize(n, PADDING);
        positions.resize(n, [0.0; 3]);
        Self {
            numbers,
            positions,
            total_charge: self.total_charge,
        }
    }
}

/// Pads every structure of a batch to the batch's maximum atom count.
///
/// The result is rectangular: all rows share the same length, and the
/// real/padding mask of each row is derivable from its atomic numbers. Each
/// input structure is validated first, so shape errors surface before any
/// computation starts.
pub fn pad(structures: &[Structure]) -> Result<Vec<Structure>, D4Error> {
    if structures.is_empty() {
        return Err(D4Error::NoAtoms);
    }
    for s in structures {
        s.validate()?;
    }
    let nmax = structures.iter().map(Structure::len).max().unwrap_or(0);
    Ok(structures.iter().map(|s| s.padded_to(nmax)).collect())
}
