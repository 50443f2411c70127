//! Rational (Becke-Johnson) damped two-body dispersion energy.

use crate::damping::DampingParams;
use crate::math::{floored_distance, real_mask};
use crate::model::PairCoefficients;
use crate::ncoord::CutoffMode;

/// Accumulates the two-body dispersion energy per atom.
///
/// Each unordered pair of real atoms inside the cutoff contributes
/// `-s6 C6 / (R^6 + Rc^6) - s8 C8 / (R^8 + Rc^8)` with the critical radius
/// `Rc = a1 R0 + a2`, split half-and-half between its two atoms. Padding
/// pairs carry zero coefficients and a zero mask, so they contribute exactly
/// nothing.
pub fn twobody_energy(
    numbers: &[u8],
    positions: &[[f64; 3]],
    coefficients: &PairCoefficients,
    params: &DampingParams,
    cutoff: f64,
    mode: CutoffMode,
) -> Vec<f64> {
    let n = numbers.len();
    let mut energies = vec![0.0; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let mask = real_mask(numbers[i]) * real_mask(numbers[j]);
            let r = floored_distance(positions[i], positions[j]);
            let w_cut = mode.weight(r, cutoff);

            let rc = params.critical_radius(coefficients.r0[i][j]);
            let r2 = r * r;
            let r6 = r2 * r2 * r2;
            let r8 = r6 * r2;
            let rc2 = rc * rc;
            let rc6 = rc2 * rc2 * rc2;
            let rc8 = rc6 * rc2;

            let pair = -params.s6 * coefficients.c6[i][j] / (r6 + rc6)
                - params.s8 * coefficients.c8[i][j] / (r8 + rc8);
            let e = mask * w_cut * pair;

            energies[i] += 0.5 * e;
            energies[j] += 0.5 * e;
        }
    }

    energies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_reference;
    use crate::model::D4Model;
    use crate::ncoord::CutoffMode;

    fn tpssh() -> DampingParams {
        DampingParams {
            s6: 1.0,
            s8: 1.85897750,
            s9: 1.0,
            a1: 0.44286966,
            a2: 4.60230534,
        }
    }

    fn pair_setup(r: f64) -> (Vec<u8>, Vec<[f64; 3]>, PairCoefficients) {
        let db = default_reference();
        let numbers = vec![6u8, 6];
        let positions = vec![[0.0; 3], [r, 0.0, 0.0]];
        let coefficients = D4Model::default()
            .pair_coefficients(&numbers, &[1.0, 1.0], &[0.0, 0.0], db)
            .unwrap();
        (numbers, positions, coefficients)
    }

    #[test]
    fn test_pair_energy_is_attractive_and_split_evenly() {
        let (numbers, positions, coefficients) = pair_setup(5.0);
        let energies = twobody_energy(
            &numbers,
            &positions,
            &coefficients,
            &tpssh(),
            60.0,
            CutoffMode::Hard,
        );
        assert!(energies[0] < 0.0);
        assert!((energies[0] - energies[1]).abs() < 1e-15);
    }

    #[test]
    fn test_energy_decays_with_distance() {
        let (numbers, _, coefficients) = pair_setup(5.0);
        let near = twobody_energy(
            &numbers,
            &[[0.0; 3], [5.0, 0.0, 0.0]],
            &coefficients,
            &tpssh(),
            60.0,
            CutoffMode::Hard,
        );
        let far = twobody_energy(
            &numbers,
            &[[0.0; 3], [10.0, 0.0, 0.0]],
            &coefficients,
            &tpssh(),
            60.0,
            CutoffMode::Hard,
        );
        assert!(near[0] < far[0]);
        assert!(far[0] < 0.0);
    }

    #[test]
    fn test_beyond_cutoff_is_exactly_zero() {
        let (numbers, _, coefficients) = pair_setup(5.0);
        let energies = twobody_energy(
            &numbers,
            &[[0.0; 3], [70.0, 0.0, 0.0]],
            &coefficients,
            &tpssh(),
            60.0,
            CutoffMode::Hard,
        );
        assert_eq!(energies, vec![0.0, 0.0]);
    }

    #[test]
    fn test_taper_matches_hard_inside_switch_region() {
        let (numbers, positions, coefficients) = pair_setup(5.0);
        let hard = twobody_energy(
            &numbers,
            &positions,
            &coefficients,
            &tpssh(),
            60.0,
            CutoffMode::Hard,
        );
        let tapered = twobody_energy(
            &numbers,
            &positions,
            &coefficients,
            &tpssh(),
            60.0,
            CutoffMode::Taper,
        );
        // 5 Bohr is far below the 48 Bohr switch onset
        assert!((hard[0] - tapered[0]).abs() < 1e-15);
    }
}
