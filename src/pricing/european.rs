//! Module `pricing::european`.
//!
//! Direct pricing helpers `price_closed_form`, `price_lattice` and `price_lattice_many`.
//!
//! When to use: these return bare prices for quick comparisons; use the engines in
//! [`crate::engines`] when diagnostics or arena reuse matter.
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{PricingEngine, PricingError};
use crate::engines::analytic::BlackScholesEngine;
use crate::engines::tree::BinomialTreeEngine;
use crate::instruments::OptionContract;

/// Black-Scholes value of `contract`, `as_of` years after inception.
///
/// # Errors
/// [`PricingError::NumericalDomain`] when `as_of >= expiry`.
///
/// # Examples
/// ```rust
/// use ferric_crr::instruments::OptionContract;
/// use ferric_crr::pricing::european::price_closed_form;
///
/// let call = OptionContract::new(100.0, 100.0, 0.05, 0.20, 1.0, 1.0).unwrap();
/// let px = price_closed_form(&call, 0.0).unwrap();
/// assert!(px > 10.0 && px < 11.0);
/// ```
pub fn price_closed_form(contract: &OptionContract, as_of: f64) -> Result<f64, PricingError> {
    Ok(BlackScholesEngine::as_of(as_of).price(contract)?.price)
}

/// CRR lattice value of `contract` with `steps` time steps.
///
/// Fails on arbitrage-implying lattices; build a [`BinomialTreeEngine`] directly to
/// choose a different [`crate::config::ArbitragePolicy`].
///
/// # Examples
/// ```rust
/// use ferric_crr::instruments::OptionContract;
/// use ferric_crr::pricing::european::{price_closed_form, price_lattice};
///
/// let call = OptionContract::new(100.0, 100.0, 0.05, 0.20, 1.0, 1.0).unwrap();
/// let tree = price_lattice(&call, 500).unwrap();
/// let exact = price_closed_form(&call, 0.0).unwrap();
/// assert!((tree - exact).abs() < 0.01);
/// ```
pub fn price_lattice(contract: &OptionContract, steps: usize) -> Result<f64, PricingError> {
    Ok(BinomialTreeEngine::new(steps).price(contract)?.price)
}

/// Prices `contract` independently at each step count, preserving input order.
///
/// Each entry owns its lattice; with the `parallel` feature the step counts are spread
/// across the rayon pool.
pub fn price_lattice_many(
    contract: &OptionContract,
    steps: &[usize],
) -> Vec<Result<f64, PricingError>> {
    let price_one = |&n: &usize| price_lattice(contract, n);

    #[cfg(feature = "parallel")]
    let prices = steps.par_iter().map(price_one).collect::<Vec<_>>();
    #[cfg(not(feature = "parallel"))]
    let prices = steps.iter().map(price_one).collect::<Vec<_>>();

    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many_preserves_order_and_errors() {
        let c = OptionContract::new(95.0, 100.0, 0.10, 0.25, 1.0, 1.0).unwrap();
        let out = price_lattice_many(&c, &[3, 0, 50]);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0], price_lattice(&c, 3));
        assert_eq!(out[1], Err(PricingError::InvalidStepCount(0)));
        assert_eq!(out[2], price_lattice(&c, 50));
    }

    #[test]
    fn closed_form_rejects_offset_past_expiry() {
        let c = OptionContract::new(95.0, 100.0, 0.10, 0.25, 1.0, 1.0).unwrap();
        assert!(matches!(
            price_closed_form(&c, 2.0),
            Err(PricingError::NumericalDomain(_))
        ));
    }
}
