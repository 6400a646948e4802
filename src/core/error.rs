//! Custom error types for finscrape
//!
//! Provides a unified error type plus a coarse [`ErrorKind`] classification
//! used by retry policies to decide what counts as transient.

use thiserror::Error;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing credentials, bad config file, invalid retry policy
    Config,
    /// Page navigation, element lookup, timeouts, dropped connections
    Navigation,
    /// A post-condition check failed (e.g. logout did not take effect)
    Verification,
    /// Rendered text could not be turned into a record
    Parse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Navigation => write!(f, "navigation"),
            ErrorKind::Verification => write!(f, "verification"),
            ErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Errors that know their [`ErrorKind`]
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

/// A retry policy that can never run its operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid retry policy for \"{label}\": max_attempts must be at least 1, got {max_attempts}")]
pub struct InvalidPolicy {
    pub label: String,
    pub max_attempts: u32,
}

/// Main error type for finscrape operations
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Retry policy rejected before running anything
    #[error(transparent)]
    Policy(#[from] InvalidPolicy),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Selector matched nothing on the page
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// agent-browser binary could not be started
    #[error("{0} not found. Install with: npm install -g agent-browser && agent-browser install")]
    DriverUnavailable(String),

    /// Post-condition check failed
    #[error("Verification failed: {0}")]
    Verification(String),

    /// Text parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for finscrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

impl ScrapeError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a verification error
    pub fn verification(msg: impl Into<String>) -> Self {
        Self::Verification(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl Classify for ScrapeError {
    fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::Config(_) | ScrapeError::Policy(_) => ErrorKind::Config,
            ScrapeError::Browser(_)
            | ScrapeError::ElementNotFound(_)
            | ScrapeError::DriverUnavailable(_)
            | ScrapeError::Io(_) => ErrorKind::Navigation,
            ScrapeError::Verification(_) => ErrorKind::Verification,
            ScrapeError::Parse(_) | ScrapeError::Json(_) => ErrorKind::Parse,
        }
    }
}
