//! CLI module - command-line interface
//!
//! Contains the scrape runner and terminal output helpers.

pub mod output;
pub mod runner;

pub use runner::Runner;
