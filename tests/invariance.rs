mod common;

use common::{thiazole_like, tpssh, water};
use d4disp::{
    CnOptions, D4Model, DampingParams, DispersionCalculator, EeqSolver, Structure, default_reference,
    disp::{threebody_energy, twobody_energy},
    ncoord::{CutoffMode, coordination_number},
};

fn rotate_z(p: [f64; 3], angle: f64) -> [f64; 3] {
    let (s, c) = angle.sin_cos();
    [c * p[0] - s * p[1], s * p[0] + c * p[1], p[2]]
}

#[test]
fn test_permutation_invariance() {
    let db = default_reference();
    let calculator = DispersionCalculator::new(db);
    let params = tpssh();

    let original = thiazole_like();
    let base = calculator.energies(&[original.clone()], &params).unwrap();

    // reverse the atom ordering, numbers and positions together
    let permuted = Structure::new(
        original.numbers.iter().rev().copied().collect(),
        original.positions.iter().rev().copied().collect(),
    );
    let swapped = calculator.energies(&[permuted], &params).unwrap();

    let n = original.len();
    for i in 0..n {
        let delta = (base[0][i] - swapped[0][n - 1 - i]).abs();
        assert!(delta < 1e-12, "atom {i} changed by {delta}");
    }
}

#[test]
fn test_rigid_motion_invariance() {
    let db = default_reference();
    let calculator = DispersionCalculator::new(db);
    let params = tpssh();

    let original = thiazole_like();
    let base = calculator.energies(&[original.clone()], &params).unwrap();

    let moved = Structure::new(
        original.numbers.clone(),
        original
            .positions
            .iter()
            .map(|&p| {
                let r = rotate_z(p, 0.7);
                [r[0] + 11.0, r[1] - 3.5, r[2] + 2.25]
            })
            .collect(),
    );
    let transformed = calculator.energies(&[moved], &params).unwrap();

    for i in 0..original.len() {
        let delta = (base[0][i] - transformed[0][i]).abs();
        assert!(delta < 1e-10, "atom {i} changed by {delta}");
    }
}

#[test]
fn test_charge_sum_invariant() {
    let db = default_reference();
    let structure = thiazole_like();

    for total in [0.0, 1.0, -1.0] {
        let cn = coordination_number(
            &structure.numbers,
            &structure.positions,
            db,
            &CnOptions::eeq(),
        )
        .unwrap();
        let result = EeqSolver::new(db)
            .solve(&structure.numbers, &cn, &structure.positions, total)
            .unwrap();
        let sum: f64 = result.charges.iter().sum();
        assert!((sum - total).abs() <= 1e-10, "sum = {sum}, want {total}");
    }
}

#[test]
fn test_s9_zero_equals_twobody_only() {
    let db = default_reference();
    let structure = thiazole_like();
    let params = DampingParams { s9: 0.0, ..tpssh() };

    let pipeline = DispersionCalculator::new(db)
        .energies(&[structure.clone()], &params)
        .unwrap();

    // rebuild the two-body-only energy from the public pieces
    let cn_eeq = coordination_number(
        &structure.numbers,
        &structure.positions,
        db,
        &CnOptions::eeq(),
    )
    .unwrap();
    let charges = EeqSolver::new(db)
        .solve(&structure.numbers, &cn_eeq, &structure.positions, 0.0)
        .unwrap()
        .charges;
    let cn = coordination_number(
        &structure.numbers,
        &structure.positions,
        db,
        &CnOptions::d4(),
    )
    .unwrap();
    let coefficients = D4Model::default()
        .pair_coefficients(&structure.numbers, &cn, &charges, db)
        .unwrap();
    let twobody = twobody_energy(
        &structure.numbers,
        &structure.positions,
        &coefficients,
        &params,
        60.0,
        CutoffMode::Hard,
    );
    let threebody = threebody_energy(
        &structure.numbers,
        &structure.positions,
        &coefficients,
        &params,
        40.0,
        CutoffMode::Hard,
    );

    for i in 0..structure.len() {
        assert_eq!(threebody[i], 0.0, "s9 = 0 must zero every triple");
        assert_eq!(pipeline[0][i], twobody[i], "atom {i}");
    }
}

#[test]
fn test_padding_invariance() {
    let db = default_reference();
    let calculator = DispersionCalculator::new(db);
    let params = tpssh();

    let bare = water();
    let padded = bare.padded_to(7);

    let base = calculator.energies(&[bare], &params).unwrap();
    let grown = calculator.energies(&[padded], &params).unwrap();

    // the padded EEQ system factorizes over a larger matrix, so allow
    // round-off at the last few digits
    for i in 0..3 {
        let delta = (base[0][i] - grown[0][i]).abs();
        assert!(delta < 1e-13, "real atom {i} shifted by {delta}");
    }
    for i in 3..7 {
        assert_eq!(grown[0][i], 0.0, "padding atom {i} must stay zero");
    }
}

#[test]
fn test_energy_is_smooth_under_small_displacement() {
    let db = default_reference();
    let calculator = DispersionCalculator::new(db);
    let params = tpssh();

    let base_structure = thiazole_like();
    let base = calculator
        .total_energies(&[base_structure.clone()], &params)
        .unwrap()[0];

    let h = 1e-6;
    let mut displaced = base_structure;
    displaced.positions[0][0] += h;
    let shifted = calculator.total_energies(&[displaced], &params).unwrap()[0];

    // a continuously differentiable energy moves O(h) under an O(h)
    // displacement; a branch-induced jump would be orders larger
    assert!((shifted - base).abs() < 1e-4, "jump = {}", (shifted - base).abs());
}
