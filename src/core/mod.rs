//! Core traits, diagnostics, and library-wide result/error structures.

pub mod serialization;
pub mod types;

pub use serialization::*;
pub use types::*;

/// Common trait implemented by every priceable contract.
pub trait Instrument: std::fmt::Debug {
    /// Returns a short type identifier for diagnostics and serialized records.
    fn instrument_type(&self) -> &str;
}

/// Pricing engine abstraction over an instrument type.
///
/// Engines are immutable configuration holders; every call to [`PricingEngine::price`]
/// builds its own working state, so one engine can be shared across threads.
pub trait PricingEngine<I: Instrument> {
    /// Short engine identifier used in logs and serialized records.
    fn name(&self) -> &'static str;

    /// Prices an instrument.
    fn price(&self, instrument: &I) -> Result<PricingResult, PricingError>;
}

/// Unified engine result payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricingResult {
    /// Present value, already scaled by the contract's subscription ratio.
    pub price: f64,
    /// Engine-specific scalar diagnostics.
    pub diagnostics: Diagnostics,
}

/// Engine and model errors surfaced by the API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    /// A contract field violates its domain (non-positive or non-finite).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Lattice step count outside `1..=i32::MAX`.
    #[error("invalid step count: {0} (must be >= 1)")]
    InvalidStepCount(usize),

    /// Risk-neutral probability outside `(0, 1)`: the lattice admits arbitrage.
    #[error(
        "arbitrage violation: risk-neutral probability {probability} outside (0, 1) (u={up}, d={down})"
    )]
    ArbitrageViolation {
        probability: f64,
        up: f64,
        down: f64,
    },

    /// Formula evaluated outside its domain (e.g. zero remaining maturity).
    #[error("numerical domain error: {0}")]
    NumericalDomain(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arbitrage_message_reports_lattice_factors() {
        let err = PricingError::ArbitrageViolation {
            probability: 1.5,
            up: 1.01,
            down: 0.99,
        };
        let msg = err.to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("u=1.01"));
        assert!(msg.contains("d=0.99"));
    }

    #[test]
    fn step_count_message_names_value() {
        assert_eq!(
            PricingError::InvalidStepCount(0).to_string(),
            "invalid step count: 0 (must be >= 1)"
        );
    }
}
