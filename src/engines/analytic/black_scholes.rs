//! Module `engines::analytic::black_scholes`.
//!
//! Closed-form Black-Scholes value of a European call, used as the continuous-time
//! reference the lattice engine converges to.
//!
//! References: Black and Scholes (1973); Hull (11th ed.) Ch. 15, Eq. (15.20).
//!
//! Numerical considerations: the formula is undefined at zero remaining maturity
//! (`d1` divides by `vol * sqrt(tau)`), so valuation offsets at or past expiry are
//! rejected rather than collapsed to intrinsic value.
use crate::core::{DiagKey, Diagnostics, PricingEngine, PricingError, PricingResult};
use crate::instruments::OptionContract;
use crate::math::normal_cdf;

/// Analytic Black-Scholes engine for European calls.
///
/// `as_of` shifts the valuation date forward by a year fraction; remaining maturity is
/// `expiry - as_of`.
#[derive(Debug, Clone, Default)]
pub struct BlackScholesEngine {
    /// Valuation offset in years from contract inception.
    pub as_of: f64,
}

impl BlackScholesEngine {
    /// Creates an engine valuing at inception.
    pub fn new() -> Self {
        Self { as_of: 0.0 }
    }

    /// Creates an engine valuing `as_of` years after inception.
    pub fn as_of(as_of: f64) -> Self {
        Self { as_of }
    }
}

/// Returns `(d1, d2)` for remaining maturity `tau`.
#[inline]
pub fn bs_d1_d2(spot: f64, strike: f64, rate: f64, vol: f64, tau: f64) -> (f64, f64) {
    let sig_sqrt_t = vol * tau.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * tau) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Per-unit Black-Scholes call value. Callers guarantee `tau > 0` and `vol > 0`.
#[inline]
pub fn bs_call_price(spot: f64, strike: f64, rate: f64, vol: f64, tau: f64) -> f64 {
    let (d1, d2) = bs_d1_d2(spot, strike, rate, vol, tau);
    spot * normal_cdf(d1) - strike * (-rate * tau).exp() * normal_cdf(d2)
}

impl PricingEngine<OptionContract> for BlackScholesEngine {
    fn name(&self) -> &'static str {
        "black_scholes"
    }

    fn price(&self, contract: &OptionContract) -> Result<PricingResult, PricingError> {
        if !self.as_of.is_finite() || self.as_of < 0.0 {
            return Err(PricingError::InvalidParameter(format!(
                "valuation offset must be finite and >= 0, got {}",
                self.as_of
            )));
        }

        let tau = contract.expiry() - self.as_of;
        if tau <= 0.0 {
            return Err(PricingError::NumericalDomain(format!(
                "remaining maturity must be > 0, got {tau} (expiry {}, as_of {})",
                contract.expiry(),
                self.as_of
            )));
        }

        let spot = contract.spot();
        let strike = contract.strike();
        let rate = contract.rate();
        let vol = contract.volatility();

        let unit = bs_call_price(spot, strike, rate, vol, tau);
        let price = unit * contract.subscription_ratio();
        let (d1, d2) = bs_d1_d2(spot, strike, rate, vol, tau);
        let df = (-rate * tau).exp();

        tracing::debug!(tau, d1, d2, price, "black-scholes call priced");

        let mut diagnostics = Diagnostics::new();
        diagnostics.insert_key(DiagKey::D1, d1);
        diagnostics.insert_key(DiagKey::D2, d2);
        diagnostics.insert_key(DiagKey::DiscountFactor, df);
        diagnostics.insert_key(DiagKey::RemainingMaturity, tau);

        Ok(PricingResult { price, diagnostics })
    }
}
