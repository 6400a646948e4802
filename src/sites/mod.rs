//! Site scrapers
//!
//! Page sequences for supported banking sites and the text parsing they share.

pub mod extract;
pub mod usaa;

pub use extract::{extract_balances, parse_balance, resolve_name};
