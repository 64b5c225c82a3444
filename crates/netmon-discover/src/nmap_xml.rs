//! Nmap XML output deserialization.
//!
//! Nmap's `-oX -` flag outputs structured XML to stdout. Only the parts that
//! identify a host are modelled; run statistics, timing and everything else
//! in the document are skipped by the deserializer.

use serde::Deserialize;

use crate::error::{DiscoverError, Result};

/// Root element: `<nmaprun>`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename = "nmaprun")]
pub struct NmapRun {
    #[serde(rename = "@args")]
    pub args: Option<String>,
    #[serde(rename = "host", default)]
    pub hosts: Vec<NmapHost>,
}

/// A single host from scan results.
#[derive(Debug, Clone, Deserialize)]
pub struct NmapHost {
    pub status: Option<HostStatus>,
    #[serde(rename = "address", default)]
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostStatus {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@reason")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    #[serde(rename = "@addr")]
    pub addr: String,
    #[serde(rename = "@addrtype")]
    pub addr_type: String,
    #[serde(rename = "@vendor")]
    pub vendor: Option<String>,
}

impl NmapHost {
    fn address_of(&self, addr_type: &str) -> Option<&str> {
        self.addresses
            .iter()
            .find(|a| a.addr_type == addr_type)
            .map(|a| a.addr.as_str())
    }

    /// Extract the IPv4 address, if present.
    pub fn ipv4(&self) -> Option<&str> {
        self.address_of("ipv4")
    }

    /// Extract the IPv6 address, if present.
    pub fn ipv6(&self) -> Option<&str> {
        self.address_of("ipv6")
    }

    /// The address the host answered on: IPv4 preferred, IPv6 otherwise.
    pub fn ip(&self) -> Option<&str> {
        self.ipv4().or_else(|| self.ipv6())
    }

    /// Extract the MAC address, if present.
    pub fn mac(&self) -> Option<&str> {
        self.address_of("mac")
    }

    /// Check if the host is up.
    pub fn is_up(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.state == "up")
    }
}

/// Parse nmap XML bytes into a structured `NmapRun`.
pub fn parse_nmap_xml(xml: &[u8]) -> Result<NmapRun> {
    quick_xml::de::from_reader(xml).map_err(|e| DiscoverError::XmlParse(format!("{e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING_SCAN_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" args="nmap -sn -oX - 192.168.1.0/24" startstr="Mon Feb 24 10:00:00 2026">
  <verbose level="0"/>
  <debugging level="0"/>
  <host>
    <status state="up" reason="arp-response" reason_ttl="0"/>
    <address addr="192.168.1.1" addrtype="ipv4"/>
    <address addr="AA:BB:CC:DD:EE:01" addrtype="mac" vendor="TestVendor"/>
    <hostnames>
      <hostname name="gateway.lan" type="PTR"/>
    </hostnames>
    <times srtt="1200" rttvar="5000" to="100000"/>
  </host>
  <host>
    <status state="up" reason="localhost-response" reason_ttl="0"/>
    <address addr="192.168.1.20" addrtype="ipv4"/>
    <hostnames/>
  </host>
  <runstats>
    <finished time="1740400000" timestr="Mon Feb 24 10:00:02 2026" elapsed="2.50"/>
    <hosts up="2" down="254" total="256"/>
  </runstats>
</nmaprun>"#;

    #[test]
    fn test_parse_ping_scan() {
        let result = parse_nmap_xml(PING_SCAN_XML.as_bytes()).unwrap();
        assert_eq!(result.hosts.len(), 2);
        assert_eq!(
            result.args.as_deref(),
            Some("nmap -sn -oX - 192.168.1.0/24")
        );

        let gateway = &result.hosts[0];
        assert!(gateway.is_up());
        assert_eq!(gateway.ipv4(), Some("192.168.1.1"));
        assert_eq!(gateway.mac(), Some("AA:BB:CC:DD:EE:01"));
        assert_eq!(gateway.addresses[1].vendor.as_deref(), Some("TestVendor"));

        // The scanning host itself never reports a MAC.
        let local = &result.hosts[1];
        assert_eq!(local.ip(), Some("192.168.1.20"));
        assert_eq!(local.mac(), None);
    }

    #[test]
    fn test_parse_empty_scan() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" args="nmap -sn 192.168.99.0/24">
  <runstats>
    <finished elapsed="1.00"/>
    <hosts up="0" down="256" total="256"/>
  </runstats>
</nmaprun>"#;

        let result = parse_nmap_xml(xml.as_bytes()).unwrap();
        assert_eq!(result.hosts.len(), 0);
    }

    #[test]
    fn test_ipv6_fallback() {
        let host = NmapHost {
            status: None,
            addresses: vec![
                Address {
                    addr: "fe80::1".to_string(),
                    addr_type: "ipv6".to_string(),
                    vendor: None,
                },
                Address {
                    addr: "AA:BB:CC:DD:EE:02".to_string(),
                    addr_type: "mac".to_string(),
                    vendor: None,
                },
            ],
        };

        assert_eq!(host.ipv4(), None);
        assert_eq!(host.ip(), Some("fe80::1"));
        assert!(!host.is_up());
    }

    #[test]
    fn test_truncated_output_is_an_error() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap">
  <host>
    <address addr="192.168.1.1" addrtype="ipv4"/>"#;

        assert!(matches!(
            parse_nmap_xml(xml.as_bytes()),
            Err(DiscoverError::XmlParse(_))
        ));
    }
}
