//! finscrape - banking balance scraper
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use finscrape::browser::AgentBrowser;
use finscrape::cli::output::{init_logging, pause_for_confirmation, render_balances};
use finscrape::{Config, Runner};

/// finscrape - scrape account balances from your bank
#[derive(Parser, Debug)]
#[command(name = "finscrape")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Environment file holding the site credentials
    #[arg(long, short = 'e')]
    env_file: Option<PathBuf>,

    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,

    /// agent-browser session name
    #[arg(long)]
    session: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Print balances as JSON
    #[arg(long)]
    json: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    pause: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.debug);

    // Only FINSCRAPE_* settings reach the process environment
    let env_file = args
        .env_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(".env"));
    Config::load_env_overrides(&env_file).context("failed to read environment file")?;

    let mut config = Config::load().context("failed to load configuration")?;

    // Apply CLI overrides
    if let Some(env_file) = args.env_file {
        config.scrape.env_file = env_file;
    }

    if let Some(session) = args.session {
        config.browser.session_name = session;
    }

    if args.headed {
        config.browser.headed = true;
    }

    if args.pause {
        config.scrape.pause_on_exit = true;
    }

    let browser = AgentBrowser::from_config(&config.browser);
    if !browser.is_available().await {
        anyhow::bail!(
            "{} not found. Install with: npm install -g agent-browser && agent-browser install",
            config.browser.binary
        );
    }

    let pause = config.scrape.pause_on_exit;
    let runner = Runner::with_driver(config, Box::new(browser))?;
    let result = runner.run().await;

    if pause {
        pause_for_confirmation()?;
    }

    let balances = result.context("scrape failed")?;
    println!("{}", render_balances(&balances, args.json)?);

    Ok(())
}
