//! Core module - shared infrastructure for finscrape
//!
//! Foundational types, configuration, credentials and error handling.

pub mod config;
pub mod credentials;
pub mod error;
pub mod types;

pub use config::{BrowserConfig, Config, ScrapeConfig};
pub use credentials::Credentials;
pub use error::{Classify, ErrorKind, InvalidPolicy, Result, ScrapeError};
pub use types::*;
