//! Report module - plots, summaries and the run manifest

pub mod manifest;
pub mod plot;
pub mod summary;

pub use manifest::*;
pub use plot::*;
pub use summary::*;
