mod app;
pub mod command;
mod logger;

/// Re-exports.
pub use app::{Args, RunCmd};

use anyhow::{Context, Result};
use std::path::Path;

/// Reads the entry body from `input`, or from stdin if no file is given.
pub fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))
        }
        None => std::io::read_to_string(std::io::stdin()).context("failed to read stdin"),
    }
}
