//! Instrument definitions.

pub mod contract;

pub use contract::{ContractSummary, OptionContract, OptionContractBuilder};
