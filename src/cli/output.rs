//! Terminal output, logging setup and the exit prompt

use std::io::{self, BufRead, Write};

use crate::core::{Balances, Result};

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins when set; otherwise `finscrape=info`, or debug with `debug`.
pub fn init_logging(debug: bool) {
    let default = if debug {
        "finscrape=debug"
    } else {
        "finscrape=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Render balances as `name: balance` lines or a JSON object
pub fn render_balances(balances: &Balances, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(balances)?)
    } else {
        Ok(balances.format_for_display())
    }
}

/// Block until the user presses Enter
pub fn pause_for_confirmation() -> Result<()> {
    print!("\nPress Enter to exit...");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccountBalanceRecord;
    use rust_decimal::Decimal;

    fn sample() -> Balances {
        vec![
            AccountBalanceRecord::new("Savings Buffer", Decimal::new(150000, 2)).unwrap(),
            AccountBalanceRecord::new("Signature Visa", Decimal::new(-4210, 2)).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_render_text() {
        let text = render_balances(&sample(), false).unwrap();
        assert_eq!(text, "Savings Buffer: 1500.00\nSignature Visa: -42.10");
    }

    #[test]
    fn test_render_json() {
        let text = render_balances(&sample(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Signature Visa"], "-42.10");
    }
}
