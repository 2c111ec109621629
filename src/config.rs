//! Pricer configuration: default lattice depth and how arbitrage-implying lattices
//! are handled.
//!
//! Configuration loads from JSON or from the environment:
//! - `CRR_DEFAULT_STEPS`: positive integer, default 1000.
//! - `CRR_ARBITRAGE_POLICY`: `fail` (default) or `warn`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::PricingError;

/// What the lattice engine does when the risk-neutral probability leaves `(0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitragePolicy {
    /// Return [`PricingError::ArbitrageViolation`].
    #[default]
    Fail,
    /// Log a warning and price the lattice anyway.
    Warn,
}

impl FromStr for ArbitragePolicy {
    type Err = PricingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "warn" => Ok(Self::Warn),
            other => Err(PricingError::Config(format!(
                "unknown arbitrage policy `{other}` (expected `fail` or `warn`)"
            ))),
        }
    }
}

/// Library-level pricing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricerConfig {
    pub default_steps: usize,
    pub arbitrage_policy: ArbitragePolicy,
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            default_steps: 1000,
            arbitrage_policy: ArbitragePolicy::Fail,
        }
    }
}

impl PricerConfig {
    pub const STEPS_VAR: &'static str = "CRR_DEFAULT_STEPS";
    pub const POLICY_VAR: &'static str = "CRR_ARBITRAGE_POLICY";

    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json(payload: &str) -> Result<Self, PricingError> {
        let cfg: Self = serde_json::from_str(payload)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, PricingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PricingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(Self::STEPS_VAR) {
            cfg.default_steps = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| PricingError::Config(format!("{}: {e}", Self::STEPS_VAR)))?;
        }
        if let Some(raw) = lookup(Self::POLICY_VAR) {
            cfg.arbitrage_policy = raw.parse()?;
        }

        cfg.validate()?;
        tracing::debug!(
            default_steps = cfg.default_steps,
            arbitrage_policy = ?cfg.arbitrage_policy,
            "loaded pricer config"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if self.default_steps == 0 {
            return Err(PricingError::Config(
                "default_steps must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
