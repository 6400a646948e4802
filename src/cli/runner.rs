//! One scrape run from credentials to balances
//!
//! Owns the browser session and closes it on every exit path.

use crate::browser::{AgentBrowser, Driver};
use crate::core::{Balances, Config, Credentials, Result};
use crate::sites::usaa::{self, Policies};

/// Runs the site sequence against a single browser session
pub struct Runner {
    config: Config,
    driver: Box<dyn Driver>,
    policies: Policies,
}

impl Runner {
    /// Create a runner with the agent-browser backend
    pub fn with_config(config: Config) -> Result<Self> {
        let driver = Box::new(AgentBrowser::from_config(&config.browser));
        Self::with_driver(config, driver)
    }

    /// Create a runner around any driver
    pub fn with_driver(config: Config, driver: Box<dyn Driver>) -> Result<Self> {
        config.validate()?;
        let policies = Policies::from_config(&config.scrape);
        Ok(Self {
            config,
            driver,
            policies,
        })
    }

    /// Replace the retry policies
    pub fn set_policies(&mut self, policies: Policies) {
        self.policies = policies;
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load credentials, scrape, then always close the browser
    ///
    /// A failure to close is logged and never replaces the scrape result.
    pub async fn run(&self) -> Result<Balances> {
        let result = self.scrape().await;

        tokio::time::sleep(self.config.scrape.quit_delay()).await;
        match self.driver.quit().await {
            Ok(()) => tracing::debug!(driver = self.driver.name(), "browser closed"),
            Err(e) => tracing::warn!(driver = self.driver.name(), "failed to close browser: {}", e),
        }

        result
    }

    async fn scrape(&self) -> Result<Balances> {
        let credentials = Credentials::load(usaa::SITE, &self.config.scrape.env_file)?;

        usaa::run(
            self.driver.as_ref(),
            &credentials,
            &self.policies,
            self.config.scrape.wait(),
        )
        .await
    }
}
