//! Site credentials loaded from a `.env` file
//!
//! Only keys prefixed with `<site>_` are kept. The process environment is
//! left untouched.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::core::error::{Result, ScrapeError};

/// Prefix-filtered key/value credentials for one site
#[derive(Clone)]
pub struct Credentials {
    prefix: String,
    values: HashMap<String, String>,
}

impl Credentials {
    /// Read `path` and keep the keys starting with `prefix` + `_`
    pub fn load(prefix: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ScrapeError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut pairs = Vec::new();
        for item in iter {
            let pair = item.map_err(|e| {
                ScrapeError::config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            pairs.push(pair);
        }

        let credentials = Self::from_pairs(prefix, pairs);
        tracing::debug!(
            path = %path.display(),
            prefix,
            keys = credentials.len(),
            "loaded credentials"
        );
        Ok(credentials)
    }

    /// Build from arbitrary key/value pairs, applying the same prefix filter
    pub fn from_pairs<I, K, V>(prefix: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let wanted = format!("{}_", prefix);
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(&wanted))
            .collect();

        Self {
            prefix: prefix.to_string(),
            values,
        }
    }

    /// Look up a full key such as `usaa_pin`
    pub fn get(&self, key: &str) -> Result<&str> {
        self.values.get(key).map(String::as_str).ok_or_else(|| {
            ScrapeError::config(format!("Missing credential '{}' in environment file", key))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Credentials")
            .field("prefix", &self.prefix)
            .field("keys", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Classify, ErrorKind};
    use std::io::Write;

    #[test]
    fn test_prefix_filter() {
        let creds = Credentials::from_pairs(
            "usaa",
            [
                ("usaa_member_id", "alice"),
                ("usaa_pin", "1234"),
                ("usaasomething", "no"),
                ("chase_password", "no"),
            ],
        );

        assert_eq!(creds.len(), 2);
        assert_eq!(creds.get("usaa_member_id").unwrap(), "alice");
        assert!(creds.get("usaasomething").is_err());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let creds = Credentials::from_pairs("usaa", [("usaa_pin", "1234")]);
        let err = creds.get("usaa_password").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("usaa_password"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "usaa_member_id=alice").unwrap();
        writeln!(file, "usaa_password=\"s3cret pass\"").unwrap();
        writeln!(file, "OTHER=1").unwrap();

        let creds = Credentials::load("usaa", file.path()).unwrap();
        assert_eq!(creds.len(), 2);
        assert_eq!(creds.get("usaa_password").unwrap(), "s3cret pass");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::load("usaa", dir.path().join("nope.env")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_debug_hides_values() {
        let creds = Credentials::from_pairs("usaa", [("usaa_password", "hunter2")]);
        let shown = format!("{:?}", creds);
        assert!(shown.contains("usaa_password"));
        assert!(!shown.contains("hunter2"));
    }
}
