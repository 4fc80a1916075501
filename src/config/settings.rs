//! Raw filter settings as delivered by the host's configuration store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Flat string settings for one filter attachment.
///
/// The host stores every setting as a string. Typed access happens once,
/// when the settings are parsed into a resolved configuration; blank
/// values count as absent throughout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSettings {
    #[serde(flatten)]
    values: HashMap<String, String>,
}

impl RawSettings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a setting, builder style.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a trimmed, non-empty value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Parse a value into a typed setting.
    ///
    /// A value that fails to parse is reported and treated as absent, so
    /// the caller's default applies instead.
    pub fn get_parsed<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.get(key)?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!("Ignoring setting '{}': '{}' ({})", key, value, err);
                None
            }
        }
    }

    /// Number of settings present, blanks included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no settings are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_count_as_absent() {
        let settings = RawSettings::new()
            .set("functionName", "  orders  ")
            .set("awsRegion", "   ");

        assert_eq!(settings.get("functionName"), Some("orders"));
        assert_eq!(settings.get("awsRegion"), None);
        assert_eq!(settings.get("missing"), None);
    }

    #[test]
    fn test_get_parsed() {
        let settings = RawSettings::new()
            .set("retryDelay", "250")
            .set("memorySize", "not-a-number");

        assert_eq!(settings.get_parsed::<u64>("retryDelay"), Some(250));
        assert_eq!(settings.get_parsed::<i64>("memorySize"), None);
        assert_eq!(settings.get_parsed::<u64>("missing"), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let settings = RawSettings::new()
            .set("functionName", "orders")
            .set("retryDelay", "500");

        let json = serde_json::to_string(&settings).unwrap();
        let back: RawSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
