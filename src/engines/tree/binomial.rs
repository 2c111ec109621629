//! Module `engines::tree::binomial`.
//!
//! Cox-Ross-Rubinstein binomial lattice for European calls.
//!
//! References: Cox, Ross and Rubinstein (1979); Hull (11th ed.) Ch. 13, backward-induction
//! recursion around Eq. (13.10).
//!
//! Key types and purpose: `LatticeParams` holds the per-call lattice constants;
//! `BinomialTreeEngine` prices with a rolling one-dimensional buffer.
//!
//! Numerical considerations: convergence to Black-Scholes is first order in `1/steps` and
//! oscillates with the position of the strike relative to the terminal nodes. The
//! risk-neutral probability must lie in `(0, 1)`; coarse lattices with high rates and low
//! volatility violate this and are reported according to [`ArbitragePolicy`]. Long, volatile
//! lattices push the top terminal price past `f64::MAX`; the rolling engine carries values
//! per unit of the node's underlying price so the root stays finite regardless.
use crate::config::{ArbitragePolicy, PricerConfig};
use crate::core::{DiagKey, Diagnostics, PricingEngine, PricingError, PricingResult};
use crate::engines::tree::lattice::CrrLattice;
use crate::instruments::OptionContract;
use crate::math::LatticeArena;

/// Per-call CRR lattice constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeParams {
    /// Number of time steps.
    pub steps: usize,
    /// Step length in years.
    pub dt: f64,
    /// Up factor `exp(vol * sqrt(dt))`.
    pub up: f64,
    /// Down factor `1 / up`.
    pub down: f64,
    /// Risk-neutral probability of an up move.
    pub probability: f64,
    /// One-step discount factor `exp(-rate * dt)`.
    pub discount: f64,
}

impl LatticeParams {
    /// Derives lattice constants for `contract` at depth `steps`.
    ///
    /// # Errors
    /// - [`PricingError::InvalidStepCount`] when `steps == 0` or `steps > i32::MAX`.
    /// - [`PricingError::ArbitrageViolation`] when the risk-neutral probability is outside
    ///   `(0, 1)` and `policy` is [`ArbitragePolicy::Fail`].
    pub fn new(
        contract: &OptionContract,
        steps: usize,
        policy: ArbitragePolicy,
    ) -> Result<Self, PricingError> {
        if steps == 0 || steps > i32::MAX as usize {
            return Err(PricingError::InvalidStepCount(steps));
        }

        let dt = contract.expiry() / steps as f64;
        let up = (contract.volatility() * dt.sqrt()).exp();
        let down = 1.0 / up;
        let growth = (contract.rate() * dt).exp();
        let probability = (growth - down) / (up - down);

        if !(probability.is_finite() && probability > 0.0 && probability < 1.0) {
            match policy {
                ArbitragePolicy::Fail => {
                    return Err(PricingError::ArbitrageViolation {
                        probability,
                        up,
                        down,
                    });
                }
                ArbitragePolicy::Warn => {
                    tracing::warn!(
                        steps,
                        probability,
                        up,
                        down,
                        "risk-neutral probability outside (0, 1); lattice admits arbitrage"
                    );
                }
            }
        }

        Ok(Self {
            steps,
            dt,
            up,
            down,
            probability,
            discount: (-contract.rate() * dt).exp(),
        })
    }

    fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        diagnostics.insert_key(DiagKey::NumSteps, self.steps as f64);
        diagnostics.insert_key(DiagKey::U, self.up);
        diagnostics.insert_key(DiagKey::D, self.down);
        diagnostics.insert_key(DiagKey::Pu, self.probability);
        diagnostics.insert_key(DiagKey::DiscountFactor, self.discount);
        diagnostics
    }
}

/// Cox-Ross-Rubinstein binomial tree engine.
#[derive(Debug, Clone)]
pub struct BinomialTreeEngine {
    /// Number of tree steps.
    pub steps: usize,
    /// Handling of lattices whose risk-neutral probability leaves `(0, 1)`.
    pub arbitrage_policy: ArbitragePolicy,
}

impl Default for BinomialTreeEngine {
    fn default() -> Self {
        Self::from_config(&PricerConfig::default())
    }
}

impl BinomialTreeEngine {
    /// Creates a tree engine with the given number of steps, failing on arbitrage.
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            arbitrage_policy: ArbitragePolicy::Fail,
        }
    }

    /// Creates a tree engine from library configuration.
    pub fn from_config(config: &PricerConfig) -> Self {
        Self {
            steps: config.default_steps,
            arbitrage_policy: config.arbitrage_policy,
        }
    }

    /// Replaces the arbitrage policy.
    pub fn with_arbitrage_policy(mut self, policy: ArbitragePolicy) -> Self {
        self.arbitrage_policy = policy;
        self
    }

    /// Prices using a caller-owned scratch buffer instead of a fresh allocation.
    pub fn price_with_arena(
        &self,
        contract: &OptionContract,
        arena: &mut LatticeArena,
    ) -> Result<PricingResult, PricingError> {
        let params = LatticeParams::new(contract, self.steps, self.arbitrage_policy)?;
        let values = arena.values_slice(params.steps + 1);
        let unit = rollback_european_call(values, contract, &params);
        finish(contract, &params, unit)
    }

    /// Materializes the full triangular lattice at this engine's depth.
    ///
    /// Memory grows with `steps^2`; intended for inspection of small trees.
    pub fn lattice(&self, contract: &OptionContract) -> Result<CrrLattice, PricingError> {
        CrrLattice::build(contract, self.steps, self.arbitrage_policy)
    }
}

fn finish(
    contract: &OptionContract,
    params: &LatticeParams,
    unit: f64,
) -> Result<PricingResult, PricingError> {
    if !unit.is_finite() {
        return Err(PricingError::NumericalDomain(format!(
            "lattice value is not finite ({unit}) at {} steps",
            params.steps
        )));
    }
    let price = unit * contract.subscription_ratio();
    tracing::debug!(
        steps = params.steps,
        up = params.up,
        down = params.down,
        probability = params.probability,
        price,
        "crr lattice priced"
    );
    Ok(PricingResult {
        price,
        diagnostics: params.diagnostics(),
    })
}

/// Runs terminal payoff and backward induction in `values` (length `steps + 1`) and
/// returns the per-unit root value.
///
/// Slot `j` holds the node reached by `j` down moves, so at step `i` the up successor of
/// slot `j` is slot `j` and the down successor is slot `j + 1`. Updating `j` upward reads
/// only slots not yet overwritten in the current step.
///
/// Slots hold `V / S`, the option value per unit of the node's underlying price. With
/// `V_up = u * S * w_up` and `V_down = d * S * w_down` the CRR recurrence
/// `V = disc * (p * V_up + (1 - p) * V_down)` becomes
/// `w = disc * p * u * w_up + disc * (1 - p) * d * w_down`, whose weights sum to one.
/// A call's `w` lies in `[0, 1]` at every node, including nodes whose `S` overflows.
fn rollback_european_call(
    values: &mut [f64],
    contract: &OptionContract,
    params: &LatticeParams,
) -> f64 {
    let steps = params.steps;
    debug_assert!(values.len() > steps);

    // S_j = spot * exp(vol * sqrt(dt) * (steps - 2j)); max(S_j - K, 0) / S_j = max(1 - K / S_j, 0)
    let log_up = params.up.ln();
    let log_moneyness = (contract.strike() / contract.spot()).ln();
    for (j, value) in values.iter_mut().take(steps + 1).enumerate() {
        let moves = steps as f64 - 2.0 * j as f64;
        *value = (-(log_moneyness - log_up * moves).exp_m1()).max(0.0);
    }

    let up_weight = params.discount * params.probability * params.up;
    let down_weight = params.discount * (1.0 - params.probability) * params.down;

    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    let use_avx2 = is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma");

    for i in (0..steps).rev() {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if use_avx2 && i >= 3 {
                // SAFETY: avx2 and fma detected above; values.len() > i + 1.
                unsafe { backward_step_avx2(values, i, up_weight, down_weight) };
            } else {
                backward_step(values, i, up_weight, down_weight);
            }
        }
        #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
        backward_step(values, i, up_weight, down_weight);
    }

    values[0] * contract.spot()
}

/// `values[j] = w_up * values[j] + w_down * values[j + 1]` for `j` in `0..=step_index`.
#[inline(always)]
fn backward_step(values: &mut [f64], step_index: usize, w_up: f64, w_down: f64) {
    let mut j = 0;
    while j + 4 <= step_index + 1 {
        values[j] = w_up.mul_add(values[j], w_down * values[j + 1]);
        values[j + 1] = w_up.mul_add(values[j + 1], w_down * values[j + 2]);
        values[j + 2] = w_up.mul_add(values[j + 2], w_down * values[j + 3]);
        values[j + 3] = w_up.mul_add(values[j + 3], w_down * values[j + 4]);
        j += 4;
    }
    while j <= step_index {
        values[j] = w_up.mul_add(values[j], w_down * values[j + 1]);
        j += 1;
    }
}

/// AVX2+FMA form of [`backward_step`], four nodes per iteration.
///
/// Each block loads `values[j..j+4]` and `values[j+1..j+5]` before storing `values[j..j+4]`,
/// and the next block starts at `j + 4`, which has not been written yet.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[target_feature(enable = "avx2,fma")]
unsafe fn backward_step_avx2(values: &mut [f64], step_index: usize, w_up: f64, w_down: f64) {
    use std::arch::x86_64::*;

    let wu = _mm256_set1_pd(w_up);
    let wd = _mm256_set1_pd(w_down);
    let n = step_index + 1;
    let mut j = 0usize;

    while j + 4 <= n {
        unsafe {
            let v_up = _mm256_loadu_pd(values.as_ptr().add(j));
            let v_down = _mm256_loadu_pd(values.as_ptr().add(j + 1));
            let result = _mm256_fmadd_pd(wu, v_up, _mm256_mul_pd(wd, v_down));
            _mm256_storeu_pd(values.as_mut_ptr().add(j), result);
        }
        j += 4;
    }

    while j < n {
        values[j] = w_up.mul_add(values[j], w_down * values[j + 1]);
        j += 1;
    }
}

impl PricingEngine<OptionContract> for BinomialTreeEngine {
    fn name(&self) -> &'static str {
        "crr_binomial"
    }

    fn price(&self, contract: &OptionContract) -> Result<PricingResult, PricingError> {
        let params = LatticeParams::new(contract, self.steps, self.arbitrage_policy)?;
        let mut values = vec![0.0_f64; params.steps + 1];
        let unit = rollback_european_call(&mut values, contract, &params);
        finish(contract, &params, unit)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn textbook() -> OptionContract {
        OptionContract::new(95.0, 100.0, 0.10, 0.25, 1.0, 1.0).unwrap()
    }

    #[test]
    fn zero_steps_rejected_before_lattice() {
        let err = BinomialTreeEngine::new(0).price(&textbook()).unwrap_err();
        assert_eq!(err, PricingError::InvalidStepCount(0));
    }

    #[test]
    fn params_follow_crr_parameterization() {
        let p = LatticeParams::new(&textbook(), 3, ArbitragePolicy::Fail).unwrap();
        assert_relative_eq!(p.dt, 1.0 / 3.0, max_relative = 1e-15);
        assert_relative_eq!(p.up * p.down, 1.0, max_relative = 1e-15);
        assert_relative_eq!(p.up, 1.155_274_025_440_143, max_relative = 1e-14);
        assert_relative_eq!(p.probability, 0.580_987_535_818_400_8, max_relative = 1e-12);
    }

    #[test]
    fn three_step_textbook_value() {
        let res = BinomialTreeEngine::new(3).price(&textbook()).unwrap();
        assert_relative_eq!(res.price, 11.991_515_673_889_976, max_relative = 1e-12);
        assert_eq!(res.diagnostics.get("num_steps"), Some(3.0));
    }

    #[test]
    fn arbitrage_lattice_fails_by_default() {
        // r = 50%, vol = 1%, one step: growth e^0.5 exceeds the up factor.
        let c = OptionContract::new(100.0, 100.0, 0.5, 0.01, 1.0, 1.0).unwrap();
        match BinomialTreeEngine::new(1).price(&c) {
            Err(PricingError::ArbitrageViolation { probability, .. }) => {
                assert!(probability > 1.0)
            }
            other => panic!("expected arbitrage violation, got {other:?}"),
        }
    }

    #[test]
    fn arbitrage_lattice_prices_under_warn_policy() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .with_test_writer()
            .try_init();

        let c = OptionContract::new(100.0, 100.0, 0.5, 0.01, 1.0, 1.0).unwrap();
        let res = BinomialTreeEngine::new(1)
            .with_arbitrage_policy(ArbitragePolicy::Warn)
            .price(&c)
            .unwrap();
        assert!(res.price.is_finite());
        assert!(res.diagnostics.get("pu").unwrap() > 1.0);
    }

    #[test]
    fn long_dated_high_vol_price_stays_finite() {
        // vol * sqrt(T * n) passes ln(f64::MAX) - ln(spot) beyond about 5400 steps.
        let c = OptionContract::new(100.0, 100.0, 0.05, 3.0, 10.0, 1.0).unwrap();
        let exact = crate::engines::analytic::bs_call_price(100.0, 100.0, 0.05, 3.0, 10.0);
        for steps in [5_000, 6_000, 8_000] {
            let params = LatticeParams::new(&c, steps, ArbitragePolicy::Fail).unwrap();
            let top = c.spot() * (params.up.ln() * steps as f64).exp();
            assert_eq!(top.is_finite(), steps == 5_000, "steps={steps}");

            let px = BinomialTreeEngine::new(steps).price(&c).unwrap().price;
            assert!(px.is_finite() && px <= c.spot(), "steps={steps} price={px}");
            assert!((px - exact).abs() < 1e-4, "steps={steps} price={px} exact={exact}");
        }
    }

    #[test]
    fn non_finite_root_is_domain_error() {
        let c = textbook();
        let params = LatticeParams::new(&c, 3, ArbitragePolicy::Fail).unwrap();
        for bad in [f64::INFINITY, f64::NAN] {
            assert!(matches!(
                finish(&c, &params, bad),
                Err(PricingError::NumericalDomain(_))
            ));
        }
    }

    #[test]
    fn rollback_matches_scalar_reference() {
        // Covers the SIMD dispatch (i >= 3) and its scalar tail.
        let c = OptionContract::new(15_673.64, 15_100.0, -0.00513, 0.1862, 0.5, 1.0).unwrap();
        for steps in [1, 2, 3, 4, 5, 9, 64, 257] {
            let params = LatticeParams::new(&c, steps, ArbitragePolicy::Fail).unwrap();
            let mut values = vec![0.0; steps + 1];
            let rolled = rollback_european_call(&mut values, &c, &params);

            let log_up = params.up.ln();
            let log_moneyness = (c.strike() / c.spot()).ln();
            let mut w: Vec<f64> = (0..=steps)
                .map(|j| {
                    let moves = steps as f64 - 2.0 * j as f64;
                    (-(log_moneyness - log_up * moves).exp_m1()).max(0.0)
                })
                .collect();
            let w_up = params.discount * params.probability * params.up;
            let w_down = params.discount * (1.0 - params.probability) * params.down;
            for i in (0..steps).rev() {
                for j in 0..=i {
                    w[j] = w_up.mul_add(w[j], w_down * w[j + 1]);
                }
            }
            assert_eq!(rolled.to_bits(), (w[0] * c.spot()).to_bits(), "steps={steps}");
        }
    }

    #[test]
    fn arena_and_fresh_buffer_agree() {
        let c = textbook();
        let mut arena = LatticeArena::with_capacity(16);
        for steps in [200, 7, 64] {
            let engine = BinomialTreeEngine::new(steps);
            let fresh = engine.price(&c).unwrap().price;
            let reused = engine.price_with_arena(&c, &mut arena).unwrap().price;
            assert_eq!(fresh.to_bits(), reused.to_bits(), "steps={steps}");
        }
    }

    #[test]
    fn from_config_applies_both_settings() {
        let cfg = PricerConfig {
            default_steps: 42,
            arbitrage_policy: ArbitragePolicy::Warn,
        };
        let engine = BinomialTreeEngine::from_config(&cfg);
        assert_eq!(engine.steps, 42);
        assert_eq!(engine.arbitrage_policy, ArbitragePolicy::Warn);
        assert_eq!(BinomialTreeEngine::default().steps, 1000);
    }

    #[test]
    fn backward_step_unrolled_matches_naive() {
        let mut unrolled: Vec<f64> = (0..11).map(|x| (x as f64).sqrt()).collect();
        let mut naive = unrolled.clone();
        backward_step(&mut unrolled, 9, 0.55, 0.44);
        for j in 0..=9 {
            naive[j] = 0.55_f64.mul_add(naive[j], 0.44 * naive[j + 1]);
        }
        assert_eq!(unrolled, naive);
    }
}
