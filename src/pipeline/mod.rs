//! Pipeline module - loading, cleaning, filtering and pairing

pub mod chem;
pub mod clean;
pub mod error;
pub mod loader;
pub mod pairing;
pub mod records;
pub mod similarity;
pub mod training;

pub use chem::{Bond, BondOrder, Molecule, MoleculeParser, SmilesParser};
pub use clean::*;
pub use error::{CurateError, CurateResult};
pub use loader::*;
pub use pairing::*;
pub use records::*;
pub use similarity::*;
pub use training::*;
