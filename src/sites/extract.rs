//! Balance extraction from rendered page text
//!
//! Turns the aligned product name / label / balance texts of an accounts
//! page into [`Balances`].

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::{AccountBalanceRecord, Balances, Result, ScrapeError};

/// Products with this name are identified by their label instead
pub const HOME_VALUE_SENTINEL: &str = "Home Value Monitoring";

/// Screen-reader prefix on negative balances
pub const NEGATIVE_SENTINEL: &str = "Negative $";

/// Pick the display name for a product
pub fn resolve_name(name_text: &str, label_text: &str) -> String {
    if name_text.trim() == HOME_VALUE_SENTINEL {
        label_text.trim().to_string()
    } else {
        name_text.trim().to_string()
    }
}

/// Parse a rendered balance such as `$1,234.56`
///
/// Negative balances render as two lines, a spelled-out line for screen
/// readers followed by the amount; the first line is dropped and the
/// amount negated.
pub fn parse_balance(text: &str) -> Result<Decimal> {
    if text.trim().starts_with(NEGATIVE_SENTINEL) {
        let amount = text.split('\n').nth(1).ok_or_else(|| {
            ScrapeError::parse(format!("negative balance without amount line: {:?}", text))
        })?;
        return parse_amount(amount).map(|value| -value);
    }

    parse_amount(text)
}

/// Keep digits and the decimal point, then parse exactly
fn parse_amount(text: &str) -> Result<Decimal> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return Err(ScrapeError::parse(format!("no amount in {:?}", text)));
    }

    Decimal::from_str(&digits)
        .map_err(|e| ScrapeError::parse(format!("bad amount {:?}: {}", text, e)))
}

/// Build balances from three aligned text sequences
///
/// Sequences are zipped to the shortest. Later duplicates of a name win.
pub fn extract_balances<S: AsRef<str>>(
    names: &[S],
    labels: &[S],
    balances: &[S],
) -> Result<Balances> {
    let mut data = Balances::new();

    for ((name, label), balance) in names.iter().zip(labels).zip(balances) {
        let name = resolve_name(name.as_ref(), label.as_ref());
        let balance = parse_balance(balance.as_ref())?;
        let record = AccountBalanceRecord::new(name, balance)?;

        tracing::info!("{}: {}", record.name, record.balance);
        data.insert(record);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_balance("$500.00").unwrap(), dec("500.00"));
        assert_eq!(parse_balance(" $12,204.10 ").unwrap(), dec("12204.10"));
    }

    #[test]
    fn test_parse_negative_two_lines() {
        assert_eq!(
            parse_balance("Negative $1,234.56\n-$1,234.56").unwrap(),
            dec("-1234.56")
        );
    }

    #[test]
    fn test_parse_negative_missing_second_line() {
        assert!(parse_balance("Negative $1,234.56").is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_balance("Unavailable").is_err());
        assert!(parse_balance("1.2.3").is_err());
    }

    #[test]
    fn test_resolve_name() {
        assert_eq!(
            resolve_name("Home Value Monitoring", "1236 ROSLYN ST"),
            "1236 ROSLYN ST"
        );
        assert_eq!(resolve_name("  Savings Buffer\n", "ignored"), "Savings Buffer");
    }

    #[test]
    fn test_extract_scenario() {
        let names = ["Checking", "Home Value Monitoring"];
        let labels = ["", "123 Main St"];
        let balances = ["$100.00", "Negative $50.00\n-$50.00"];

        let data = extract_balances(&names, &labels, &balances).unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.get("Checking"), Some(dec("100.00")));
        assert_eq!(data.get("123 Main St"), Some(dec("-50.00")));
    }

    #[test]
    fn test_extract_zips_to_shortest() {
        let names = ["A", "B", "C"];
        let labels = ["", ""];
        let balances = ["$1", "$2", "$3"];

        let data = extract_balances(&names, &labels, &balances).unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.get("C").is_none());
    }

    #[test]
    fn test_extract_duplicate_last_wins() {
        let names = ["Rental Cashflow", "Rental Cashflow"];
        let labels = ["", ""];
        let balances = ["$1.00", "$9.00"];

        let data = extract_balances(&names, &labels, &balances).unwrap();
        assert_eq!(data.get("Rental Cashflow"), Some(dec("9.00")));
    }
}
