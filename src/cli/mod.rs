//! CLI command handlers

pub mod commands;

pub use commands::{convert, run, Mode, RunArgs, RunConfig};
