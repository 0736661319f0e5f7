use ipnet::IpNet;
use serde::Deserialize;
use std::net::IpAddr;

/// SSRF validator configuration.
///
/// The built-in blocked ranges and hostnames always apply; this section only
/// adds to them. Overrides are exact IPs, never CIDR blocks, and bypass only
/// ranges flagged overridable (loopback and metadata ranges always reject).
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct SsrfConfig {
    /// Additional blocked CIDR ranges, checked after the built-in table.
    /// Supports CIDR notation: ["198.18.0.0/15", "2001:db8::/32"]
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_ip_networks")]
    pub extra_blocked_ranges: Vec<IpNet>,
    /// Additional blocked hostnames (case-insensitive exact match).
    #[serde(default)]
    pub extra_blocked_hostnames: Vec<String>,
    /// Exact IPs allowed to bypass overridable blocked ranges.
    #[serde(default)]
    pub allowed_ips: Vec<IpAddr>,
}

/// Custom deserializer for IP networks that reports the offending entry
fn deserialize_ip_networks<'de, D>(deserializer: D) -> Result<Vec<IpNet>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let strings: Vec<String> = Vec::deserialize(deserializer)?;
    let mut networks = Vec::new();

    for s in strings {
        match s.parse::<IpNet>() {
            Ok(net) => networks.push(net),
            Err(e) => {
                return Err(serde::de::Error::custom(format!("Invalid IP network '{}': {}", s, e)));
            }
        }
    }

    Ok(networks)
}
