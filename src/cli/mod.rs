//! CLI module
//!
//! Command-line interface for paging through service operations.
//!
//! # Commands
//!
//! - `services` - List services and operations
//! - `describe` - Show one operation definition
//! - `validate` - Validate a service definition file
//! - `invoke` - Run an operation, following continuation tokens

mod commands;
mod runner;

pub use commands::{Cli, Commands, InvokeArgs, OutputFormat};
pub use runner::Runner;
