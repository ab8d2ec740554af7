//! CLI module - argument parsing and interactive prompts

mod args;
mod prompts;

pub use args::{validate_threshold, Cli, Commands, OutputLayout};
pub use prompts::*;
