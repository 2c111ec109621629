//! European call contract bundled with the market inputs it is priced against.
//!
//! [`OptionContract`] is the single input of both engines: spot, strike, flat rate,
//! flat volatility, time to maturity, and the subscription ratio that converts a
//! per-unit option value into the price of the traded instrument (for example a
//! warrant on one hundredth of an index point).
//!
//! Fields are private and validated once at construction; nothing mutates them
//! afterwards, so a contract can be shared freely between threads and pricing calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Instrument, PricingError};

/// Immutable European call contract.
///
/// # Examples
/// ```
/// use ferric_crr::instruments::OptionContract;
///
/// let call = OptionContract::new(95.0, 100.0, 0.10, 0.25, 1.0, 1.0).unwrap();
/// assert_eq!(call.strike(), 100.0);
/// assert!(OptionContract::new(-1.0, 100.0, 0.10, 0.25, 1.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContract")]
pub struct OptionContract {
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    expiry: f64,
    subscription_ratio: f64,
}

/// Unvalidated wire shape; every deserialized contract passes through [`OptionContract::new`].
#[derive(Deserialize)]
struct RawContract {
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    expiry: f64,
    #[serde(default = "unit_ratio")]
    subscription_ratio: f64,
}

fn unit_ratio() -> f64 {
    1.0
}

impl TryFrom<RawContract> for OptionContract {
    type Error = PricingError;

    fn try_from(raw: RawContract) -> Result<Self, Self::Error> {
        Self::new(
            raw.spot,
            raw.strike,
            raw.rate,
            raw.volatility,
            raw.expiry,
            raw.subscription_ratio,
        )
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), PricingError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

impl OptionContract {
    /// Builds a validated contract.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidParameter`] when `spot`, `strike`, `volatility`,
    /// `expiry` or `subscription_ratio` is not strictly positive and finite, or when
    /// `rate` is not finite. Negative rates are accepted.
    pub fn new(
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        expiry: f64,
        subscription_ratio: f64,
    ) -> Result<Self, PricingError> {
        require_positive("spot", spot)?;
        require_positive("strike", strike)?;
        if !rate.is_finite() {
            return Err(PricingError::InvalidParameter(format!(
                "rate must be finite, got {rate}"
            )));
        }
        require_positive("volatility", volatility)?;
        require_positive("expiry", expiry)?;
        require_positive("subscription_ratio", subscription_ratio)?;

        Ok(Self {
            spot,
            strike,
            rate,
            volatility,
            expiry,
            subscription_ratio,
        })
    }

    /// Starts a contract builder.
    #[inline]
    pub fn builder() -> OptionContractBuilder {
        OptionContractBuilder::default()
    }

    /// Current underlying price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Strike price.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Continuously compounded risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Annualized volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Time to maturity in years.
    #[inline]
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// Scale factor applied to the per-unit option value.
    #[inline]
    pub fn subscription_ratio(&self) -> f64 {
        self.subscription_ratio
    }

    /// Terminal payoff per unit of underlying.
    #[inline(always)]
    pub fn payoff(&self, terminal_spot: f64) -> f64 {
        (terminal_spot - self.strike).max(0.0)
    }

    /// No-arbitrage price bounds `[max(0, S - K e^{-rT}), S]`, scaled by the subscription ratio.
    pub fn price_bounds(&self) -> (f64, f64) {
        let lower = (self.spot - self.strike * (-self.rate * self.expiry).exp()).max(0.0);
        (
            lower * self.subscription_ratio,
            self.spot * self.subscription_ratio,
        )
    }

    /// Human-readable summary with an optional price.
    ///
    /// The contract never stores prices; pass the latest one in.
    pub fn summary(&self, price: Option<f64>) -> ContractSummary<'_> {
        ContractSummary {
            contract: self,
            price,
        }
    }
}

impl Instrument for OptionContract {
    fn instrument_type(&self) -> &str {
        "european_call"
    }
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "European call with spot: {}, strike: {}, rate: {}, volatility: {}, expiry: {}, subscription ratio: {}",
            self.spot, self.strike, self.rate, self.volatility, self.expiry, self.subscription_ratio
        )
    }
}

/// Display adapter returned by [`OptionContract::summary`].
#[derive(Debug, Clone, Copy)]
pub struct ContractSummary<'a> {
    contract: &'a OptionContract,
    price: Option<f64>,
}

impl fmt::Display for ContractSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.price {
            Some(price) => write!(f, "{} with current price {price:.4}", self.contract),
            None => write!(f, "{} (not priced)", self.contract),
        }
    }
}

/// Builder for [`OptionContract`].
#[derive(Debug, Clone, Default)]
pub struct OptionContractBuilder {
    spot: Option<f64>,
    strike: Option<f64>,
    rate: Option<f64>,
    volatility: Option<f64>,
    expiry: Option<f64>,
    subscription_ratio: Option<f64>,
}

impl OptionContractBuilder {
    /// Sets the spot price.
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Sets the strike.
    #[inline]
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    /// Sets the flat risk-free rate.
    #[inline]
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Sets the flat volatility.
    #[inline]
    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Sets the time to maturity in years.
    #[inline]
    pub fn expiry(mut self, expiry: f64) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Sets the subscription ratio (defaults to 1).
    #[inline]
    pub fn subscription_ratio(mut self, ratio: f64) -> Self {
        self.subscription_ratio = Some(ratio);
        self
    }

    /// Validates and builds an [`OptionContract`].
    ///
    /// Rate defaults to 0 and subscription ratio to 1; all other fields are required.
    pub fn build(self) -> Result<OptionContract, PricingError> {
        let missing =
            |field: &str| PricingError::InvalidParameter(format!("contract {field} is required"));

        OptionContract::new(
            self.spot.ok_or_else(|| missing("spot"))?,
            self.strike.ok_or_else(|| missing("strike"))?,
            self.rate.unwrap_or(0.0),
            self.volatility.ok_or_else(|| missing("volatility"))?,
            self.expiry.ok_or_else(|| missing("expiry"))?,
            self.subscription_ratio.unwrap_or(1.0),
        )
    }
}
