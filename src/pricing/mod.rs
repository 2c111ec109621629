//! Function-style pricing entry points over [`crate::instruments::OptionContract`].

pub mod european;

pub use european::{price_closed_form, price_lattice, price_lattice_many};
