//! kipair: Ki affinity pair curation
//!
//! Cleans BindingDB-style Ki measurements, removes rows seen during
//! training, and pairs measurements of the same ligand against different
//! targets whose affinities differ by a large factor.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
