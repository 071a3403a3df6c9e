//! CLI module
//!
//! Command-line interface for the harvester.
//!
//! # Commands
//!
//! - `fetch` - Crawl an entity's transaction history to a JSON file
//! - `count` - Probe the total matching count
//! - `stats` - Aggregate statistics over a saved crawl result

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, Report};
pub use runner::Runner;
