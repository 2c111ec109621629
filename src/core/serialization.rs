//! Serializable pricing records for transport between a pricing run and whatever
//! reports on it.
//!
//! # Examples
//! ```rust
//! use ferric_crr::core::{PricingRecord, from_json, to_json_pretty};
//! use ferric_crr::instruments::OptionContract;
//!
//! let contract = OptionContract::new(95.0, 100.0, 0.10, 0.25, 1.0, 1.0).unwrap();
//! let record = PricingRecord {
//!     contract,
//!     engine_name: "crr_binomial".to_string(),
//!     steps: Some(3),
//!     price: 11.99,
//!     market_price: Some(12.10),
//! };
//!
//! let json = to_json_pretty(&record).expect("json serialization");
//! let decoded: PricingRecord = from_json(&json).expect("json deserialization");
//! assert_eq!(decoded, record);
//! ```

use serde::de::DeserializeOwned;

use crate::core::{DiagKey, Instrument, PricingEngine, PricingError};
use crate::instruments::OptionContract;

/// One model price for one contract, with the observed market price when known.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricingRecord {
    pub contract: OptionContract,
    pub engine_name: String,
    /// Lattice depth; `None` for closed-form engines.
    pub steps: Option<usize>,
    pub price: f64,
    pub market_price: Option<f64>,
}

impl PricingRecord {
    /// Prices `contract` with `engine` and wraps the outcome.
    ///
    /// `steps` is read back from the result's `num_steps` diagnostic, so it is the depth
    /// the engine actually used.
    pub fn capture<E>(
        engine: &E,
        contract: &OptionContract,
        market_price: Option<f64>,
    ) -> Result<Self, PricingError>
    where
        E: PricingEngine<OptionContract>,
    {
        let result = engine.price(contract)?;
        let steps = result
            .diagnostics
            .get_key(DiagKey::NumSteps)
            .map(|n| n as usize);
        tracing::debug!(
            engine = engine.name(),
            instrument = contract.instrument_type(),
            price = result.price,
            ?steps,
            "captured pricing record"
        );
        Ok(Self {
            contract: contract.clone(),
            engine_name: engine.name().to_string(),
            steps,
            price: result.price,
            market_price,
        })
    }

    /// Model price minus market price, when a market price was supplied.
    pub fn market_gap(&self) -> Option<f64> {
        self.market_price.map(|m| self.price - m)
    }
}

/// Serialize a value to pretty JSON.
pub fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Deserialize a value from JSON.
pub fn from_json<T: DeserializeOwned>(payload: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(payload)
}
