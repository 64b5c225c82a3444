//! Reduce raw nmap output to the canonical MAC -> IP host map.
//!
//! Hosts without a resolvable MAC (the scanning machine itself, anything
//! behind a router) cannot be tracked by identity and are dropped.

use netmon_core::HostMap;

use crate::nmap_xml::NmapRun;

/// Keep every host that reported a non-empty MAC and an address.
/// When the same MAC shows up twice, the later host wins.
pub fn reduce_scan(nmap_run: &NmapRun) -> HostMap {
    let mut hosts = HostMap::new();

    for nmap_host in &nmap_run.hosts {
        let Some(mac) = nmap_host.mac().map(str::trim).filter(|m| !m.is_empty()) else {
            continue;
        };
        let Some(ip) = nmap_host.ip() else {
            continue;
        };
        hosts.insert(mac, ip);
    }

    hosts
}
