//! netmon-discover: Scan-diff-notify daemon for a local network segment.
//!
//! Wraps nmap to ping-scan a subnet, reduces the result to a MAC -> IP map,
//! compares it with the persisted host map, sends one notification per
//! device never seen before, and writes the merged map back.

pub mod config;
pub mod error;
pub mod nmap_xml;
pub mod notify;
pub mod reduce;
pub mod scanner;
pub mod scheduler;
