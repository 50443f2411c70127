mod common;

use common::{thiazole_like, tpssh, water, water_dimer};
use d4disp::{DispersionCalculator, default_reference, dispersion_energy};

#[test]
fn test_thiazole_reference_energies() {
    let rows = dispersion_energy(&[thiazole_like()], &tpssh()).unwrap();
    assert_eq!(rows.len(), 1);
    let energies = &rows[0];
    assert_eq!(energies.len(), 12);

    for (i, e) in energies.iter().enumerate() {
        assert!(e.is_finite(), "atom {i} energy not finite");
        assert!(e.abs() < 0.05, "atom {i} energy out of range: {e}");
    }

    // dispersion binds; the ring carbon leading the sequence sits in the
    // attractive regime
    let total: f64 = energies.iter().sum();
    assert!(total < 0.0, "total = {total}");
    assert!(energies[0] < 0.0, "first atom = {}", energies[0]);

    // the heavy sulfur end is more polarizable than any hydrogen
    let s_energy = energies[6].abs();
    for h in &energies[7..] {
        assert!(s_energy > h.abs());
    }
}

#[test]
fn test_free_function_matches_calculator() {
    let db = default_reference();
    let from_free = dispersion_energy(&[thiazole_like()], &tpssh()).unwrap();
    let from_calculator = DispersionCalculator::new(db)
        .energies(&[thiazole_like()], &tpssh())
        .unwrap();
    assert_eq!(from_free, from_calculator);
}

#[test]
fn test_dimer_binds_relative_to_monomers() {
    let db = default_reference();
    let calculator = DispersionCalculator::new(db);
    let params = tpssh();

    let monomer = calculator.total_energies(&[water()], &params).unwrap()[0];
    let dimer = calculator.total_energies(&[water_dimer()], &params).unwrap()[0];

    assert!(monomer < 0.0);
    assert!(dimer < 0.0);
    let interaction = dimer - 2.0 * monomer;
    assert!(interaction < 0.0, "interaction = {interaction}");
}

#[test]
fn test_batch_agrees_with_individual_computation() {
    let db = default_reference();
    let calculator = DispersionCalculator::new(db);
    let params = tpssh();

    // batched computation pads the monomer to the dimer's six atom slots
    let batched = calculator
        .energies(&[water_dimer(), water()], &params)
        .unwrap();
    let dimer_alone = calculator.energies(&[water_dimer()], &params).unwrap();
    let monomer_alone = calculator.energies(&[water()], &params).unwrap();

    assert_eq!(batched[0].len(), 6);
    assert_eq!(batched[1].len(), 6);

    for i in 0..6 {
        assert!((batched[0][i] - dimer_alone[0][i]).abs() < 1e-12);
    }
    for i in 0..3 {
        assert!((batched[1][i] - monomer_alone[0][i]).abs() < 1e-12);
    }
    for i in 3..6 {
        assert_eq!(batched[1][i], 0.0, "padding atom {i} must be zero");
    }
}

#[test]
fn test_charged_structure_shifts_energy() {
    let db = default_reference();
    let calculator = DispersionCalculator::new(db);
    let params = tpssh();

    let neutral = calculator.total_energies(&[thiazole_like()], &params).unwrap()[0];
    let cation = calculator
        .total_energies(&[thiazole_like().with_charge(1.0)], &params)
        .unwrap()[0];

    // removing charge shrinks the polarizabilities and weakens dispersion
    assert!(cation.abs() < neutral.abs(), "cation {cation} vs neutral {neutral}");
}
