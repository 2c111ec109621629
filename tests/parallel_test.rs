#![cfg(feature = "parallel")]

use ferric_crr::core::PricingError;
use ferric_crr::instruments::OptionContract;
use ferric_crr::pricing::{price_lattice, price_lattice_many};

#[test]
fn parallel_sweep_matches_sequential_bit_for_bit() {
    let c = OptionContract::new(15_673.64, 15_100.0, -0.00513, 0.1862, 0.5, 0.01).unwrap();
    let steps: Vec<usize> = (1..=120).chain([250, 500, 1000]).collect();

    let parallel = price_lattice_many(&c, &steps);
    for (n, px) in steps.iter().zip(parallel) {
        let sequential = price_lattice(&c, *n).unwrap();
        assert_eq!(px.unwrap().to_bits(), sequential.to_bits(), "steps={n}");
    }
}

#[test]
fn parallel_sweep_reports_per_entry_errors() {
    let c = OptionContract::new(100.0, 100.0, 0.5, 0.01, 1.0, 1.0).unwrap();
    let out = price_lattice_many(&c, &[1, 0, 5000]);
    assert!(matches!(out[0], Err(PricingError::ArbitrageViolation { .. })));
    assert_eq!(out[1], Err(PricingError::InvalidStepCount(0)));
    assert!(out[2].is_ok());
}
