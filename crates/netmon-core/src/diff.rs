//! Change detection between a known host set and a fresh observation.
//!
//! Only appearance matters: a MAC seen for the first time is new. A known MAC
//! on a different IP is a move, which is reported to the operator but never
//! treated as a new device. Hosts that disappear produce nothing.

use crate::types::{HostMap, HostRecord};

/// A known host that answered on a different address this time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMove {
    pub mac: String,
    pub from: String,
    pub to: String,
}

/// The outcome of comparing an observation against known state.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HostDiff {
    /// MACs present in the observation and absent from known state,
    /// in the observation's iteration order.
    pub new_hosts: Vec<HostRecord>,
    pub moved_hosts: Vec<HostMove>,
}

impl HostDiff {
    pub fn compute(known: &HostMap, observed: &HostMap) -> Self {
        let mut diff = Self::default();

        for (mac, ip) in observed.iter() {
            match known.get(mac) {
                None => diff.new_hosts.push(HostRecord::new(mac, ip)),
                Some(previous) if previous != ip => diff.moved_hosts.push(HostMove {
                    mac: mac.to_string(),
                    from: previous.to_string(),
                    to: ip.to_string(),
                }),
                Some(_) => {}
            }
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.new_hosts.is_empty() && self.moved_hosts.is_empty()
    }
}

/// Fold an observation into known state.
///
/// Every observed MAC takes its observed IP; MACs only in `known` are kept
/// as they are, so the key set never shrinks.
pub fn merge(mut known: HostMap, observed: &HostMap) -> HostMap {
    known.extend(
        observed
            .iter()
            .map(|(mac, ip)| (mac.to_string(), ip.to_string())),
    );
    known
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HostMap {
        pairs
            .iter()
            .map(|(mac, ip)| (mac.to_string(), ip.to_string()))
            .collect()
    }

    #[test]
    fn test_new_host_detected() {
        let known = map(&[("AA:BB", "192.168.1.5")]);
        let observed = map(&[("AA:BB", "192.168.1.5"), ("CC:DD", "192.168.1.9")]);

        let diff = HostDiff::compute(&known, &observed);
        assert_eq!(diff.new_hosts, vec![HostRecord::new("CC:DD", "192.168.1.9")]);
        assert!(diff.moved_hosts.is_empty());

        let merged = merge(known, &observed);
        assert_eq!(merged, observed);
    }

    #[test]
    fn test_ip_change_is_not_new() {
        let known = map(&[("AA:BB", "192.168.1.5")]);
        let observed = map(&[("AA:BB", "192.168.1.6")]);

        let diff = HostDiff::compute(&known, &observed);
        assert!(diff.new_hosts.is_empty());
        assert_eq!(
            diff.moved_hosts,
            vec![HostMove {
                mac: "AA:BB".to_string(),
                from: "192.168.1.5".to_string(),
                to: "192.168.1.6".to_string(),
            }]
        );

        let merged = merge(known, &observed);
        assert_eq!(merged.get("AA:BB"), Some("192.168.1.6"));
    }

    #[test]
    fn test_disappeared_host_is_silent_and_retained() {
        let known = map(&[("AA:BB", "10.0.0.1"), ("CC:DD", "10.0.0.2")]);
        let observed = map(&[("AA:BB", "10.0.0.1")]);

        let diff = HostDiff::compute(&known, &observed);
        assert!(diff.is_empty());

        let merged = merge(known, &observed);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("CC:DD"), Some("10.0.0.2"));
    }

    #[test]
    fn test_diff_is_key_set_difference() {
        let known = map(&[("01", "a"), ("02", "b"), ("03", "c")]);
        let observed = map(&[("02", "b"), ("03", "z"), ("04", "d"), ("05", "e")]);

        let diff = HostDiff::compute(&known, &observed);
        let new_macs: Vec<_> = diff.new_hosts.iter().map(|r| r.mac.as_str()).collect();
        assert_eq!(new_macs, vec!["04", "05"]);
    }

    #[test]
    fn test_merge_monotonic() {
        let known = map(&[("01", "a"), ("02", "b"), ("03", "c")]);
        let observed = map(&[("02", "b"), ("03", "z"), ("04", "d")]);

        let merged = merge(known.clone(), &observed);

        for mac in known.macs().chain(observed.macs()) {
            assert!(merged.contains(mac), "{mac} missing after merge");
        }
        for (mac, ip) in observed.iter() {
            assert_eq!(merged.get(mac), Some(ip));
        }
        assert_eq!(merged.get("01"), Some("a"));
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_empty_inputs() {
        let empty = HostMap::new();
        let observed = map(&[("AA:BB", "10.0.0.1")]);

        assert_eq!(HostDiff::compute(&empty, &observed).new_hosts.len(), 1);
        assert!(HostDiff::compute(&observed, &empty).is_empty());
        assert_eq!(merge(empty.clone(), &empty), empty);
    }
}
