//! USAA login / balance scrape / logout sequence

use std::sync::Arc;
use std::time::Duration;

use crate::browser::Driver;
use crate::core::{Balances, Credentials, ErrorKind, Result, ScrapeConfig, ScrapeError};
use crate::retry::{RetryObserver, RetryPolicy};
use crate::sites::extract::extract_balances;

/// Credential prefix in the `.env` file
pub const SITE: &str = "usaa";

pub const LOGON_URL: &str = "https://www.usaa.com/my/logon";

const MEMBER_ID_KEY: &str = "usaa_member_id";
const PASSWORD_KEY: &str = "usaa_password";
const PIN_KEY: &str = "usaa_pin";

const PRODUCT_NAME: &str = ".product-name";
const PRODUCT_LABEL: &str = ".product-label";
const PRODUCT_BALANCE: &str = ".product-balance";
const LOGON_BUTTON: &str = ".usaa-globalHeader-utilityButton--logon";
const LOGGED_OUT_TEXT: &str = "Log On";

/// Retry policies for each stage of the sequence
#[derive(Debug, Clone)]
pub struct Policies {
    pub login: RetryPolicy,
    pub data: RetryPolicy,
    pub logout: RetryPolicy,
}

impl Policies {
    /// Attempt counts from config; logout only retries failed verification
    pub fn from_config(config: &ScrapeConfig) -> Self {
        let policies = Self {
            login: RetryPolicy::new("usaa_login", config.login_attempts),
            data: RetryPolicy::new("usaa_get_data", config.data_attempts),
            logout: RetryPolicy::new("usaa_logout", config.logout_attempts)
                .retry_on([ErrorKind::Verification]),
        };

        match config.retry_delay() {
            Some(delay) => Self {
                login: policies.login.with_delay(delay),
                data: policies.data.with_delay(delay),
                logout: policies.logout.with_delay(delay),
            },
            None => policies,
        }
    }

    /// Send every stage's observations to `observer`
    pub fn with_observer(self, observer: Arc<dyn RetryObserver>) -> Self {
        Self {
            login: self.login.with_observer(observer.clone()),
            data: self.data.with_observer(observer.clone()),
            logout: self.logout.with_observer(observer),
        }
    }
}

/// Log in, read balances, log out
///
/// Missing credentials fail before the browser is touched.
pub async fn run(
    driver: &dyn Driver,
    credentials: &Credentials,
    policies: &Policies,
    wait: Duration,
) -> Result<Balances> {
    let member_id = credentials.get(MEMBER_ID_KEY)?;
    let password = credentials.get(PASSWORD_KEY)?;
    let pin = credentials.get(PIN_KEY)?;

    policies
        .login
        .run_async(move || login(driver, member_id, password, pin, wait))
        .await?;

    let data = policies.data.run_async(move || get_data(driver)).await?;

    policies.logout.run_async(move || logout(driver)).await?;

    Ok(data)
}

/// Leave the driver on the member's home page
pub async fn login(
    driver: &dyn Driver,
    member_id: &str,
    password: &str,
    pin: &str,
    wait: Duration,
) -> Result<()> {
    tracing::info!(url = LOGON_URL, "logging in");
    driver.navigate(LOGON_URL).await?;

    // username
    tokio::time::sleep(wait).await;
    driver.fill("[name=memberId]", member_id).await?;
    driver.click(".submit-btn").await?;
    tokio::time::sleep(wait).await;

    // password
    driver.fill("[name=password]", password).await?;
    driver.click(".pass-submit-btn").await?;
    tokio::time::sleep(wait).await;

    // MFA: choose PIN as the method
    driver.click(".more-options-link").await?;
    tokio::time::sleep(wait).await;
    driver.click("[aria-label=\"Use my PIN\"]").await?;
    tokio::time::sleep(wait).await;

    driver.fill("[name=pin]", pin).await?;
    driver.click(".miam-btn-next").await?;
    tokio::time::sleep(wait).await;

    Ok(())
}

/// Read every product balance on the home page
pub async fn get_data(driver: &dyn Driver) -> Result<Balances> {
    let names = driver.find_all_text(PRODUCT_NAME).await?;
    if names.is_empty() {
        return Err(ScrapeError::ElementNotFound(PRODUCT_NAME.to_string()));
    }
    let labels = driver.find_all_text(PRODUCT_LABEL).await?;
    let balances = driver.find_all_text(PRODUCT_BALANCE).await?;

    extract_balances(&names, &labels, &balances)
}

/// Click log off and confirm the header flipped back to "Log On"
pub async fn logout(driver: &dyn Driver) -> Result<()> {
    driver.click(LOGON_BUTTON).await?;

    let text = driver.find_text(LOGON_BUTTON).await?;
    if text.trim() != LOGGED_OUT_TEXT {
        return Err(ScrapeError::verification(format!(
            "expected header button to read {:?} after logout, found {:?}",
            LOGGED_OUT_TEXT,
            text.trim()
        )));
    }

    tracing::info!("logged out");
    Ok(())
}
