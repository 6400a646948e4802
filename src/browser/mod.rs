//! Browser automation module
//!
//! The [`Driver`] trait plus the agent-browser CLI backend.

mod driver;
mod executor;

pub use driver::Driver;
pub use executor::AgentBrowser;
