//! Shared types used across finscrape modules

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, ScrapeError};

/// One account and its balance as shown on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalanceRecord {
    /// Account name, trimmed and never empty
    pub name: String,
    /// Exact balance; negative for debts
    pub balance: Decimal,
}

impl AccountBalanceRecord {
    /// Create a record, trimming the name
    pub fn new(name: impl AsRef<str>, balance: Decimal) -> Result<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ScrapeError::parse(format!(
                "empty account name for balance {}",
                balance
            )));
        }

        Ok(Self {
            name: name.to_string(),
            balance,
        })
    }
}

/// Balances keyed by account name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balances(BTreeMap<String, Decimal>);

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; a later record with the same name replaces the earlier one
    pub fn insert(&mut self, record: AccountBalanceRecord) -> Option<Decimal> {
        self.0.insert(record.name, record.balance)
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Format as `name: balance` lines
    pub fn format_for_display(&self) -> String {
        self.0
            .iter()
            .map(|(name, balance)| format!("{}: {}", name, balance))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<AccountBalanceRecord> for Balances {
    fn from_iter<I: IntoIterator<Item = AccountBalanceRecord>>(iter: I) -> Self {
        let mut balances = Balances::new();
        for record in iter {
            balances.insert(record);
        }
        balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_record_trims_name() {
        let record = AccountBalanceRecord::new("  Savings Buffer \n", dec("12.50")).unwrap();
        assert_eq!(record.name, "Savings Buffer");
    }

    #[test]
    fn test_record_rejects_blank_name() {
        assert!(AccountBalanceRecord::new("   ", dec("1")).is_err());
    }

    #[test]
    fn test_last_wins() {
        let balances: Balances = vec![
            AccountBalanceRecord::new("Checking", dec("1.00")).unwrap(),
            AccountBalanceRecord::new("Checking", dec("2.00")).unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances.get("Checking"), Some(dec("2.00")));
    }

    #[test]
    fn test_json_keeps_exact_decimals() {
        let balances: Balances = vec![AccountBalanceRecord::new("Visa", dec("-50.10")).unwrap()]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&balances).unwrap();
        assert_eq!(json, r#"{"Visa":"-50.10"}"#);
    }
}
