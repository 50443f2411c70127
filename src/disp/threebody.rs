//! Axilrod-Teller-Muto three-body dispersion energy.

use crate::damping::DampingParams;
use crate::math::constants::ATM_ALPHA;
use crate::math::{floored_distance, real_mask};
use crate::model::PairCoefficients;
use crate::ncoord::CutoffMode;

/// Accumulates the three-body (ATM) dispersion energy per atom.
///
/// Every unordered triple of real atoms whose three legs all lie inside the
/// cutoff contributes `-s9 C9 (0.375 s / r^5 + 1 / r^3) f_damp`, where
/// `C9 = -sqrt(C6_AB C6_BC C6_CA)`, `r` is the product of the three leg
/// lengths, and `s` is the law-of-cosines expansion of the triangle's
/// angular factor. The contribution is split equally among the triple's
/// three atoms. `s9 == 0` disables the term exactly.
pub fn threebody_energy(
    numbers: &[u8],
    positions: &[[f64; 3]],
    coefficients: &PairCoefficients,
    params: &DampingParams,
    cutoff: f64,
    mode: CutoffMode,
) -> Vec<f64> {
    let n = numbers.len();
    let mut energies = vec![0.0; n];
    if params.s9 == 0.0 {
        return energies;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let r_ij = floored_distance(positions[i], positions[j]);
                let r_jk = floored_distance(positions[j], positions[k]);
                let r_ik = floored_distance(positions[i], positions[k]);

                let weight = real_mask(numbers[i])
                    * real_mask(numbers[j])
                    * real_mask(numbers[k])
                    * mode.weight(r_ij, cutoff)
                    * mode.weight(r_jk, cutoff)
                    * mode.weight(r_ik, cutoff);
                if weight == 0.0 {
                    continue;
                }

                let c9 = -(coefficients.c6[i][j]
                    * coefficients.c6[j][k]
                    * coefficients.c6[i][k])
                    .sqrt();

                let rc = params.critical_radius(coefficients.r0[i][j])
                    * params.critical_radius(coefficients.r0[j][k])
                    * params.critical_radius(coefficients.r0[i][k]);

                let r2_ij = r_ij * r_ij;
                let r2_jk = r_jk * r_jk;
                let r2_ik = r_ik * r_ik;

                let r1 = r_ij * r_jk * r_ik;
                let r3 = r1 * r1 * r1;
                let r5 = r3 * r1 * r1;

                let s = (r2_ij + r2_jk - r2_ik)
                    * (r2_ij + r2_ik - r2_jk)
                    * (r2_ik + r2_jk - r2_ij);
                let angular = 0.375 * s / r5 + 1.0 / r3;

                let fdamp = 1.0 / (1.0 + 6.0 * (rc / r1).powf(ATM_ALPHA / 3.0));

                let e = weight * (-params.s9) * c9 * angular * fdamp;
                let share = e / 3.0;
                energies[i] += share;
                energies[j] += share;
                energies[k] += share;
            }
        }
    }

    energies
}
