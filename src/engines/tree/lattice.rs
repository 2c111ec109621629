//! Materialized CRR lattice: every node's underlying price and option value.
//!
//! [`CrrLattice`] stores both triangles as jagged vectors indexed `[step][level]`,
//! `level = 0..=step`, where `level` counts down moves. Only the triangular region
//! exists; there is no padding to fill or skip.
use crate::config::ArbitragePolicy;
use crate::core::PricingError;
use crate::engines::tree::binomial::LatticeParams;
use crate::instruments::OptionContract;

/// Fully populated binomial lattice for one contract at one depth.
#[derive(Debug, Clone, PartialEq)]
pub struct CrrLattice {
    params: LatticeParams,
    subscription_ratio: f64,
    asset_prices: Vec<Vec<f64>>,
    option_values: Vec<Vec<f64>>,
}

impl CrrLattice {
    /// Builds the asset-price triangle and rolls option values back through it.
    ///
    /// # Errors
    /// - Same as [`LatticeParams::new`].
    /// - [`PricingError::NumericalDomain`] when the top terminal price `spot * u^steps`
    ///   overflows; [`crate::engines::tree::BinomialTreeEngine`] still prices such depths.
    ///
    /// # Examples
    /// ```
    /// use ferric_crr::config::ArbitragePolicy;
    /// use ferric_crr::engines::tree::CrrLattice;
    /// use ferric_crr::instruments::OptionContract;
    ///
    /// let call = OptionContract::new(95.0, 100.0, 0.10, 0.25, 1.0, 1.0).unwrap();
    /// let lattice = CrrLattice::build(&call, 3, ArbitragePolicy::Fail).unwrap();
    /// assert_eq!(lattice.asset_price(0, 0), Some(95.0));
    /// assert_eq!(lattice.asset_price(4, 3), None);
    /// assert!((lattice.price() - 11.9915).abs() < 1e-4);
    /// ```
    pub fn build(
        contract: &OptionContract,
        steps: usize,
        policy: ArbitragePolicy,
    ) -> Result<Self, PricingError> {
        let params = LatticeParams::new(contract, steps, policy)?;
        let spot = contract.spot();

        let top = spot * params.up.powi(steps as i32);
        if !top.is_finite() {
            return Err(PricingError::NumericalDomain(format!(
                "top terminal price spot * u^{steps} overflows (u = {})",
                params.up
            )));
        }

        let asset_prices: Vec<Vec<f64>> = (0..=steps)
            .map(|i| {
                (0..=i)
                    .map(|j| {
                        spot * params.up.powi((i - j) as i32) * params.down.powi(j as i32)
                    })
                    .collect()
            })
            .collect();

        let mut option_values: Vec<Vec<f64>> = Vec::with_capacity(steps + 1);
        option_values.resize_with(steps + 1, Vec::new);
        option_values[steps] = asset_prices[steps]
            .iter()
            .map(|&s| contract.payoff(s))
            .collect();

        let p = params.probability;
        for i in (0..steps).rev() {
            let next = &option_values[i + 1];
            let layer: Vec<f64> = (0..=i)
                .map(|j| (p * next[j] + (1.0 - p) * next[j + 1]) * params.discount)
                .collect();
            option_values[i] = layer;
        }

        Ok(Self {
            params,
            subscription_ratio: contract.subscription_ratio(),
            asset_prices,
            option_values,
        })
    }

    /// Lattice constants used to build this tree.
    pub fn params(&self) -> &LatticeParams {
        &self.params
    }

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.params.steps
    }

    /// Underlying price after `step` steps with `level` down moves.
    pub fn asset_price(&self, level: usize, step: usize) -> Option<f64> {
        self.asset_prices.get(step)?.get(level).copied()
    }

    /// Per-unit option value at a node, before the subscription ratio.
    pub fn option_value(&self, level: usize, step: usize) -> Option<f64> {
        self.option_values.get(step)?.get(level).copied()
    }

    /// All underlying prices at `step`, highest first.
    pub fn asset_layer(&self, step: usize) -> Option<&[f64]> {
        self.asset_prices.get(step).map(Vec::as_slice)
    }

    /// All option values at `step`, highest underlying first.
    pub fn value_layer(&self, step: usize) -> Option<&[f64]> {
        self.option_values.get(step).map(Vec::as_slice)
    }

    /// Root value scaled by the subscription ratio.
    pub fn price(&self) -> f64 {
        self.option_values[0][0] * self.subscription_ratio
    }
}
