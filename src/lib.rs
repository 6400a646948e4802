//! finscrape - banking balance scraper
//!
//! Logs into a banking website through a browser-automation driver, reads
//! account balances off the rendered page, and returns them as exact
//! decimals keyed by account name.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, credentials and error handling
//! - **Retry**: Policy-driven re-invocation of fallible steps
//! - **Browser**: Driver trait with an agent-browser implementation
//! - **Sites**: Page sequences and balance text parsing
//! - **CLI**: Scrape runner and terminal output
//!
//! # Usage
//!
//! ```rust,no_run
//! use finscrape::{Config, Runner};
//!
//! #[tokio::main]
//! async fn main() -> finscrape::Result<()> {
//!     let runner = Runner::with_config(Config::load()?)?;
//!     let balances = runner.run().await?;
//!     println!("{}", balances.format_for_display());
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod core;
pub mod retry;
pub mod sites;

// Re-export commonly used items
pub use cli::Runner;
pub use core::{Balances, Config, ErrorKind, Result, ScrapeError};
pub use retry::RetryPolicy;
