//! Stat modifiers carried by item and subclass features

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known modifier keys
pub mod stat_keys {
    pub const EVASION: &str = "evasion";
    pub const MAJOR: &str = "major";
    pub const SEVERE: &str = "severe";
}

/// Map of stat name to signed delta
///
/// Keys are stored as written by the catalog author. Lookups are
/// case-insensitive, so `"Evasion"` and `"evasion"` both count toward the
/// same stat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierMap(BTreeMap<String, i32>);

impl ModifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stat: impl Into<String>, delta: i32) -> Self {
        self.0.insert(stat.into(), delta);
        self
    }

    /// Sum of every delta whose key matches `stat` ignoring ASCII case
    pub fn total(&self, stat: &str) -> i32 {
        self.0
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(stat))
            .map(|(_, delta)| *delta)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, i32)> for ModifierMap {
    fn from_iter<T: IntoIterator<Item = (K, i32)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_case_insensitive() {
        let modifiers = ModifierMap::new().with("Evasion", 1).with("EVASION", 2);
        assert_eq!(modifiers.total(stat_keys::EVASION), 3);
    }

    #[test]
    fn test_total_of_missing_stat_is_zero() {
        let modifiers = ModifierMap::new().with("agility", 1);
        assert_eq!(modifiers.total(stat_keys::SEVERE), 0);
        assert_eq!(ModifierMap::new().total(stat_keys::MAJOR), 0);
    }

    #[test]
    fn test_deserializes_from_plain_object() {
        let modifiers: ModifierMap = serde_json::from_str(r#"{"severe": 1, "major": -1}"#).unwrap();
        assert_eq!(modifiers.total("severe"), 1);
        assert_eq!(modifiers.total("major"), -1);
    }
}
