//! CLI module
//!
//! Command-line interface for querying an instance.
//!
//! # Commands
//!
//! - `check` - Resolve a table's WSDL and show its endpoint
//! - `keys` - Run a key lookup and print the matching sys_ids
//! - `query` - Page through records, one JSON line per record or page

mod commands;
mod runner;

pub use commands::{parse_param, Cli, Commands, FilterArgs};
pub use runner::{build_filter, Runner, PASSWORD_ENV};
