//! CLI Module Organization
//!
//! - args: CLI argument structures and output enums
//! - commands: command execution and console output
//! - config_layer: configuration layering and CLI overrides

pub mod args;
pub mod commands;
pub mod config_layer;

// Re-export commonly used items for convenience
pub use args::*;
pub use commands::*;
