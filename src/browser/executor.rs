//! agent-browser backend
//!
//! Drives a browser session through the agent-browser CLI.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;
use url::Url;

use crate::browser::driver::Driver;
use crate::core::{BrowserConfig, Result, ScrapeError};

/// [`Driver`] backed by the agent-browser CLI
#[derive(Debug, Clone)]
pub struct AgentBrowser {
    /// Executable to run
    binary: String,
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    /// Upper bound for a single command
    timeout: Duration,
}

/// `--json` envelope printed by agent-browser
#[derive(Debug, Deserialize)]
struct JsonOutput {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl AgentBrowser {
    /// Create a new executor for the given session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            binary: "agent-browser".to_string(),
            session_name: session_name.into(),
            headed: false,
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from config
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            session_name: config.session_name.clone(),
            headed: config.headed,
            timeout: config.timeout(),
        }
    }

    /// Check if the agent-browser binary runs
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(session = %self.session_name, ?args, "agent-browser");

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                ScrapeError::browser(format!(
                    "agent-browser {} timed out after {:?}",
                    args.first().copied().unwrap_or_default(),
                    self.timeout
                ))
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ScrapeError::DriverUnavailable(self.binary.clone())
                } else {
                    ScrapeError::browser(format!("Failed to run agent-browser: {}", e))
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ScrapeError::browser(format!(
                "agent-browser command failed: {}",
                stderr.trim()
            )))
        }
    }

    /// Run a command and decode its JSON envelope
    async fn run_json_command(&self, args: &[&str]) -> Result<Value> {
        let mut full_args: Vec<&str> = args.to_vec();
        full_args.push("--json");
        let output = self.run_command(&full_args).await?;
        decode_json_output(&output)
    }
}

/// Unwrap the `{success, data, error}` envelope
fn decode_json_output(output: &str) -> Result<Value> {
    let parsed: JsonOutput = serde_json::from_str(output.trim())?;
    if !parsed.success {
        return Err(ScrapeError::browser(
            parsed
                .error
                .unwrap_or_else(|| "agent-browser reported failure".to_string()),
        ));
    }
    Ok(parsed.data.unwrap_or(Value::Null))
}

/// Pull the list of strings out of an `eval` result
///
/// The script result may come back bare, under `result`, or as a JSON string.
fn texts_from_eval(data: Value) -> Result<Vec<String>> {
    let value = match data {
        Value::Object(mut map) => map.remove("result").unwrap_or(Value::Null),
        other => other,
    };

    let value = match value {
        Value::String(s) => serde_json::from_str(&s)?,
        other => other,
    };

    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(ScrapeError::parse(format!(
            "expected a list of texts from eval, got {}",
            other
        ))),
    }
}

/// Script returning the innerText of every match as a JSON array
fn all_text_script(selector: &str) -> Result<String> {
    let quoted = serde_json::to_string(selector)?;
    Ok(format!(
        "JSON.stringify(Array.from(document.querySelectorAll({})).map(e => e.innerText))",
        quoted
    ))
}

#[async_trait]
impl Driver for AgentBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        let url = Url::parse(url)
            .map_err(|e| ScrapeError::config(format!("Invalid URL {:?}: {}", url, e)))?;
        self.run_command(&["open", url.as_str()]).await?;
        Ok(())
    }

    async fn find_text(&self, selector: &str) -> Result<String> {
        self.run_command(&["get", "text", selector])
            .await
            .map(|s| s.trim_end_matches(['\r', '\n']).to_string())
            .map_err(|e| match e {
                ScrapeError::Browser(msg) => {
                    ScrapeError::ElementNotFound(format!("{} ({})", selector, msg))
                }
                other => other,
            })
    }

    async fn find_all_text(&self, selector: &str) -> Result<Vec<String>> {
        let script = all_text_script(selector)?;
        let data = self.run_json_command(&["eval", &script]).await?;
        texts_from_eval(data)
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.run_command(&["fill", selector, text]).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.run_command(&["click", selector]).await?;
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.run_command(&["close"]).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "agent-browser"
    }
}
