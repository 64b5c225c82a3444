//! Core domain types for host inventory.
//!
//! A host is identified by its hardware (MAC) address. The IP is whatever
//! address the host answered on most recently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Host identity ─────────────────────────────────────────────────

/// One observed host: a resolvable MAC and the address it was seen on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HostRecord {
    pub mac: String,
    pub ip: String,
}

impl HostRecord {
    pub fn new(mac: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            ip: ip.into(),
        }
    }
}

// ── Host map ──────────────────────────────────────────────────────

/// All hosts known as of a point in time, keyed by MAC.
///
/// Serialized as a flat JSON object (`{"AA:BB:..": "192.168.1.5"}`), which is
/// also the on-disk state format. Iteration is ordered by MAC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostMap(BTreeMap<String, String>);

impl HostMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the IP for `mac`, returning the previous IP.
    pub fn insert(&mut self, mac: impl Into<String>, ip: impl Into<String>) -> Option<String> {
        self.0.insert(mac.into(), ip.into())
    }

    pub fn get(&self, mac: &str) -> Option<&str> {
        self.0.get(mac).map(String::as_str)
    }

    pub fn contains(&self, mac: &str) -> bool {
        self.0.contains_key(mac)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(mac, ip)` pairs in MAC order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(mac, ip)| (mac.as_str(), ip.as_str()))
    }

    pub fn macs(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for HostMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<HostRecord> for HostMap {
    fn from_iter<I: IntoIterator<Item = HostRecord>>(iter: I) -> Self {
        iter.into_iter().map(|r| (r.mac, r.ip)).collect()
    }
}

impl Extend<(String, String)> for HostMap {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_object() {
        let mut map = HostMap::new();
        map.insert("CC:DD", "192.168.1.9");
        map.insert("AA:BB", "192.168.1.5");

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"AA:BB":"192.168.1.5","CC:DD":"192.168.1.9"}"#);
    }

    #[test]
    fn deserializes_flat_object() {
        let map: HostMap =
            serde_json::from_str(r#"{"AA:BB":"192.168.1.5","CC:DD":"192.168.1.9"}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("CC:DD"), Some("192.168.1.9"));
        assert!(!map.contains("EE:FF"));
    }

    #[test]
    fn rejects_non_string_values() {
        let result: Result<HostMap, _> = serde_json::from_str(r#"{"AA:BB": 5}"#);
        assert!(result.is_err());

        let result: Result<HostMap, _> = serde_json::from_str(r#"["AA:BB"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn insert_overwrites_and_returns_previous() {
        let mut map = HostMap::new();
        assert_eq!(map.insert("AA:BB", "10.0.0.1"), None);
        assert_eq!(map.insert("AA:BB", "10.0.0.2"), Some("10.0.0.1".to_string()));
        assert_eq!(map.get("AA:BB"), Some("10.0.0.2"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn collects_from_records() {
        let map: HostMap = vec![
            HostRecord::new("AA:BB", "10.0.0.1"),
            HostRecord::new("CC:DD", "10.0.0.2"),
        ]
        .into_iter()
        .collect();

        let macs: Vec<_> = map.macs().collect();
        assert_eq!(macs, vec!["AA:BB", "CC:DD"]);
        assert_eq!(map.iter().next(), Some(("AA:BB", "10.0.0.1")));
    }
}
