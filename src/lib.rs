//! `ferric_crr` prices European calls two ways: a Cox-Ross-Rubinstein binomial lattice and
//! the Black-Scholes closed form it converges to.
//!
//! The lattice engine is the workhorse. It builds the up/down price lattice for a given step
//! count, rolls the call payoff back under the risk-neutral measure, and reports the lattice
//! constants alongside the price. The closed form is the reference the lattice is checked
//! against as the step count grows.
//!
//! References:
//! - Cox, Ross and Rubinstein, *Option Pricing: A Simplified Approach* (1979).
//! - Hull, *Options, Futures, and Other Derivatives* (11th ed.), Ch. 13 and 15.
//!
//! Numerical considerations:
//! - Lattice error decays like `1/steps` and oscillates; compare several step counts.
//! - Coarse lattices with high rates and low volatility imply arbitrage (`p` outside `(0, 1)`);
//!   by default this is an error, see [`config::ArbitragePolicy`].
//! - Each pricing call owns its buffers. Contracts are immutable and `Send + Sync`, so step
//!   counts can be priced concurrently (`parallel` feature).
//!
//! # Feature Flags
//! - `parallel`: rayon-backed [`pricing::price_lattice_many`].
//! - `simd`: AVX2/FMA backward-induction kernel on x86_64, selected at runtime.
//!
//! # Quick Start
//! ```rust
//! use ferric_crr::instruments::OptionContract;
//! use ferric_crr::pricing::{price_closed_form, price_lattice};
//!
//! let call = OptionContract::new(95.0, 100.0, 0.10, 0.25, 1.0, 1.0).unwrap();
//! let three_step = price_lattice(&call, 3).unwrap();
//! assert!((three_step - 11.9915).abs() < 1e-4);
//!
//! let exact = price_closed_form(&call, 0.0).unwrap();
//! let fine = price_lattice(&call, 1000).unwrap();
//! assert!((fine - exact).abs() / exact < 1e-3);
//! ```
//!
//! Engines with diagnostics:
//! ```rust
//! use ferric_crr::core::PricingEngine;
//! use ferric_crr::engines::tree::BinomialTreeEngine;
//! use ferric_crr::instruments::OptionContract;
//!
//! let warrant = OptionContract::builder()
//!     .spot(15_673.64)
//!     .strike(15_100.0)
//!     .rate(-0.00513)
//!     .volatility(0.1862)
//!     .expiry(0.5)
//!     .subscription_ratio(0.01)
//!     .build()
//!     .unwrap();
//! let res = BinomialTreeEngine::new(250).price(&warrant).unwrap();
//! let p = res.diagnostics.get("pu").unwrap();
//! assert!(p > 0.0 && p < 1.0);
//! ```

pub mod config;
pub mod core;
pub mod engines;
pub mod instruments;
pub mod math;
pub mod pricing;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::config::{ArbitragePolicy, PricerConfig};
    pub use crate::core::*;
    pub use crate::engines::analytic::BlackScholesEngine;
    pub use crate::engines::tree::{BinomialTreeEngine, CrrLattice, LatticeParams};
    pub use crate::instruments::*;
    pub use crate::pricing::{price_closed_form, price_lattice, price_lattice_many};
}
