//! Algebraic model behind the SGA backend
//!
//! - [`clifford`] - integer multivectors over Cl(7,0)
//! - [`fano`] - Fano-plane cross product on the seven generators
//! - [`element`] - Z4 × Z3 × Cl(7) elements and their transform actions

pub mod clifford;
pub mod element;
pub mod fano;

pub use clifford::{Blade, Multivector, GENERATOR_COUNT, MAX_GRADE};
pub use element::SgaElement;
pub use fano::{cross, FANO_LINES};
