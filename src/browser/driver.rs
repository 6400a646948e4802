//! Driver abstraction over a browser-automation backend

use async_trait::async_trait;

use crate::core::Result;

/// A single exclusively-owned browser session
///
/// Selectors are CSS selectors. Every call blocks the scrape sequence until
/// the backend answers; failures surface as navigation-kind errors.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Load a URL in the current tab
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Rendered text of the first element matching `selector`
    async fn find_text(&self, selector: &str) -> Result<String>;

    /// Rendered text of every element matching `selector`, in document order
    async fn find_all_text(&self, selector: &str) -> Result<Vec<String>>;

    /// Type into an input
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, selector: &str) -> Result<()>;

    /// Close the browser session
    async fn quit(&self) -> Result<()>;

    /// Backend name for log lines
    fn name(&self) -> &str;
}
