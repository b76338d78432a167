//! Command-line interface

pub mod commands;
pub mod display;
pub mod stack;

pub use commands::{CliArgs, Commands};
