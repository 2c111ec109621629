//! Tree-based pricing engines.

pub mod binomial;
pub mod lattice;

pub use binomial::{BinomialTreeEngine, LatticeParams};
pub use lattice::CrrLattice;
