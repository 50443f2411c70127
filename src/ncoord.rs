//! This module implements the fractional coordination-number estimator.
//!
//! The coordination number of an atom is a smooth count of its neighbors: an
//! erf-based counting function of the pair distance scaled by the summed
//! covalent radii, accumulated over all other real atoms inside a cutoff.
//! Two variants exist: the plain count feeding the EEQ charge model, and the
//! D4 count which additionally weighs each pair by an electronegativity
//! difference factor. Self-pairs, padding pairs, and beyond-cutoff pairs
//! contribute exactly zero through multiplicative weights, never through
//! control-flow skips, so the estimator stays smooth everywhere.

use crate::error::D4Error;
use crate::math::constants::{CN_EEQ_MAX, CN_K4, CN_K5, CN_K6, CN_STEEPNESS, DISTANCE_FLOOR};
use crate::math::{floored_distance, real_mask, taper, within_cutoff};
use crate::params::ReferenceDatabase;
use libm::erf;
use std::collections::HashMap;

/// Selects the counting-function variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CnVariant {
    /// Plain erf count with a smooth maximum-CN cap, as used by the EEQ
    /// charge model.
    Eeq,
    /// Erf count scaled by the electronegativity-difference factor, as used
    /// by the dispersion reference model.
    #[default]
    D4,
}

/// Cutoff handling shared by the coordination number and both energy terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutoffMode {
    /// Contributions beyond the cutoff are exactly zero.
    #[default]
    Hard,
    /// Contributions taper smoothly to zero over the outer 20% of the
    /// cutoff radius.
    Taper,
}

impl CutoffMode {
    /// Multiplicative cutoff weight for a pair distance.
    #[inline]
    pub fn weight(self, distance: f64, cutoff: f64) -> f64 {
        match self {
            CutoffMode::Hard => within_cutoff(distance, cutoff),
            CutoffMode::Taper => taper(distance, 0.8 * cutoff, cutoff),
        }
    }
}

/// Configuration of the coordination-number estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct CnOptions {
    /// Counting-function variant.
    pub variant: CnVariant,
    /// Real-space cutoff in Bohr.
    pub cutoff: f64,
    /// Cutoff handling.
    pub mode: CutoffMode,
    /// Per-element covalent-radius overrides in Bohr; elements absent from
    /// the map use the tabulated radii.
    pub rcov_overrides: HashMap<u8, f64>,
    /// Smooth upper bound on the coordination number; `None` leaves the sum
    /// unbounded.
    pub max_cn: Option<f64>,
}

impl Default for CnOptions {
    fn default() -> Self {
        Self::d4()
    }
}

impl CnOptions {
    /// Options for the D4 dispersion-model coordination number.
    pub fn d4() -> Self {
        Self {
            variant: CnVariant::D4,
            cutoff: 30.0,
            mode: CutoffMode::Hard,
            rcov_overrides: HashMap::new(),
            max_cn: None,
        }
    }

    /// Options for the coordination number feeding the EEQ charge model.
    pub fn eeq() -> Self {
        Self {
            variant: CnVariant::Eeq,
            cutoff: 25.0,
            mode: CutoffMode::Hard,
            rcov_overrides: HashMap::new(),
            max_cn: Some(CN_EEQ_MAX),
        }
    }
}

/// Erf counting function: ~1 at bonding distance, ~0 past the cutoff,
/// monotonically decreasing in between.
#[inline]
fn erf_count(distance: f64, rc: f64) -> f64 {
    0.5 * (1.0 + erf(-CN_STEEPNESS * (distance / rc.max(DISTANCE_FLOOR) - 1.0)))
}

/// Electronegativity-difference factor of the D4 coordination number.
#[inline]
fn en_factor(en_i: f64, en_j: f64) -> f64 {
    let diff = (en_i - en_j).abs();
    CN_K4 * (-(diff + CN_K5).powi(2) / CN_K6).exp()
}

/// Smooth cap bounding the coordination number from above.
///
/// Exactly zero at zero; for large inputs it saturates at the asymptote
/// `ln(1 + e^max_cn)`, which overshoots `max_cn` by `ln(1 + e^-max_cn)`
/// (about 3.4e-4 for the EEQ bound of 8).
#[inline]
fn capped(cn: f64, max_cn: f64) -> f64 {
    (1.0 + max_cn.exp()).ln() - (1.0 + (max_cn - cn).exp()).ln()
}

/// Computes per-atom coordination numbers for one (possibly padded)
/// structure row.
///
/// Padding atoms receive exactly zero. The result is a continuous function
/// of all positions over the whole non-coincident domain.
///
/// # Arguments
///
/// * `numbers` - Atomic numbers of the structure row, zero marking padding
///   slots.
/// * `positions` - Cartesian coordinates in Bohr, aligned with `numbers`.
/// * `db` - The reference database providing covalent radii and
///   electronegativities.
/// * `options` - Variant, cutoff, and cap configuration.
///
/// # Returns
///
/// A `Result` containing one coordination number per atom on success, or a
/// `D4Error` on failure.
///
/// # Errors
///
/// Returns [`D4Error::ShapeMismatch`] if `numbers` and `positions` disagree
/// in length, or [`D4Error::UnknownElement`] if a real atom is outside the
/// tabulated coverage.
///
/// # Examples
///
/// ```
/// use d4disp::{default_reference, CnOptions};
/// use d4disp::ncoord::coordination_number;
///
/// let db = default_reference();
/// let numbers = [1, 1];
/// let positions = [[0.0, 0.0, 0.0], [1.4, 0.0, 0.0]];
///
/// let cn = coordination_number(&numbers, &positions, db, &CnOptions::eeq()).unwrap();
/// assert_eq!(cn.len(), 2);
/// assert!(cn[0] > 0.5);
/// ```
pub fn coordination_number(
    numbers: &[u8],
    positions: &[[f64; 3]],
    db: &ReferenceDatabase,
    options: &CnOptions,
) -> Result<Vec<f64>, D4Error> {
    if numbers.len() != positions.len() {
        return Err(D4Error::ShapeMismatch {
            expected: numbers.len(),
            found: positions.len(),
        });
    }
    db.check_coverage(numbers)?;

    let n = numbers.len();
    let mut rcov = vec![0.0; n];
    let mut en = vec![0.0; n];
    for (i, &z) in numbers.iter().enumerate() {
        if z != 0 {
            let record = db.element(z)?;
            rcov[i] = options.rcov_overrides.get(&z).copied().unwrap_or(record.rcov);
            en[i] = record.en;
        }
    }

    let mut cn = vec![0.0; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let mask = real_mask(numbers[i]) * real_mask(numbers[j]);
            let r = floored_distance(positions[i], positions[j]);
            let w_cut = options.mode.weight(r, options.cutoff);
            let den = match options.variant {
                CnVariant::Eeq => 1.0,
                CnVariant::D4 => en_factor(en[i], en[j]),
            };
            let count = mask * w_cut * den * erf_count(r, rcov[i] + rcov[j]);
            cn[i] += count;
            cn[j] += count;
        }
    }

    if let Some(max_cn) = options.max_cn {
        for (value, &z) in cn.iter_mut().zip(numbers) {
            *value = real_mask(z) * capped(*value, max_cn);
        }
    }

    Ok(cn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_reference;

    #[test]
    fn test_erf_count_limits() {
        // deep inside the bond the count saturates near 1
        assert!(erf_count(0.1, 2.0) > 0.999);
        // far outside it vanishes
        assert!(erf_count(10.0, 2.0) < 1e-12);
        // monotone decrease
        let mut prev = 1.0;
        for i in 1..60 {
            let value = erf_count(0.2 * i as f64, 2.0);
            assert!(value <= prev);
            prev = value;
        }
    }

    #[test]
    fn test_capped_limits() {
        assert!(capped(0.0, CN_EEQ_MAX).abs() < 1e-15);
        // the saturation value is ln(1 + e^max_cn), a hair above max_cn
        let asymptote = (1.0 + CN_EEQ_MAX.exp()).ln();
        let saturated = capped(100.0, CN_EEQ_MAX);
        assert!(saturated <= asymptote + 1e-12, "saturated = {saturated}");
        assert!(saturated > CN_EEQ_MAX, "saturated = {saturated}");
        assert!((saturated - asymptote).abs() < 1e-12);
        assert!(capped(2.0, CN_EEQ_MAX) <= 2.0);
    }

    #[test]
    fn test_capped_is_monotone_and_bounded() {
        let bound = (1.0 + CN_EEQ_MAX.exp()).ln();
        let mut prev = 0.0;
        for i in 1..200 {
            let value = capped(0.1 * i as f64, CN_EEQ_MAX);
            assert!(value >= prev);
            assert!(value <= bound);
            prev = value;
        }
    }

    #[test]
    fn test_h2_coordination_number() {
        let db = default_reference();
        let numbers = [1u8, 1];
        let positions = [[0.0, 0.0, 0.0], [1.4, 0.0, 0.0]];
        let cn = coordination_number(&numbers, &positions, db, &CnOptions::eeq()).unwrap();
        assert!((cn[0] - cn[1]).abs() < 1e-14);
        // near the H2 equilibrium distance each atom counts roughly one bond
        assert!(cn[0] > 0.7 && cn[0] < 1.2, "cn = {}", cn[0]);
    }

    #[test]
    fn test_padding_atoms_are_inert() {
        let db = default_reference();
        let numbers = [1u8, 1];
        let positions = [[0.0, 0.0, 0.0], [1.4, 0.0, 0.0]];
        let cn = coordination_number(&numbers, &positions, db, &CnOptions::d4()).unwrap();

        let numbers_padded = [1u8, 1, 0, 0];
        let positions_padded = [[0.0, 0.0, 0.0], [1.4, 0.0, 0.0], [0.0; 3], [0.0; 3]];
        let cn_padded =
            coordination_number(&numbers_padded, &positions_padded, db, &CnOptions::d4()).unwrap();

        assert!((cn[0] - cn_padded[0]).abs() < 1e-15);
        assert!((cn[1] - cn_padded[1]).abs() < 1e-15);
        assert_eq!(cn_padded[2], 0.0);
        assert_eq!(cn_padded[3], 0.0);
    }

    #[test]
    fn test_isolated_atom_has_zero_cn() {
        let db = default_reference();
        let cn =
            coordination_number(&[6], &[[0.0; 3]], db, &CnOptions::d4()).unwrap();
        assert_eq!(cn[0], 0.0);
    }

    #[test]
    fn test_out_of_cutoff_pair() {
        let db = default_reference();
        let numbers = [1u8, 1];
        let positions = [[0.0, 0.0, 0.0], [50.0, 0.0, 0.0]];
        let cn = coordination_number(&numbers, &positions, db, &CnOptions::d4()).unwrap();
        assert_eq!(cn[0], 0.0);
        assert_eq!(cn[1], 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let db = default_reference();
        let result = coordination_number(&[1, 1], &[[0.0; 3]], db, &CnOptions::d4());
        assert!(matches!(result, Err(D4Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_rcov_override_changes_count() {
        let db = default_reference();
        let numbers = [1u8, 1];
        let positions = [[0.0, 0.0, 0.0], [2.2, 0.0, 0.0]];
        let base = coordination_number(&numbers, &positions, db, &CnOptions::d4()).unwrap();
        let mut options = CnOptions::d4();
        options.rcov_overrides.insert(1, 2.0);
        let widened = coordination_number(&numbers, &positions, db, &options).unwrap();
        assert!(widened[0] > base[0]);
    }
}
