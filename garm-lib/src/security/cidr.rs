//! Ordered CIDR range table used by the SSRF validator.
//!
//! Containment is delegated to [`ipnet::IpNet::contains`], which compares the
//! masked network address at full width (32-bit IPv4, 128-bit IPv6). The table
//! preserves insertion order and the *first* matching range decides the
//! rejection reason.

use ipnet::IpNet;
use std::net::IpAddr;

/// A single blocked CIDR range.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockedRange {
    pub net: IpNet,
    /// Human-readable description, surfaced in rejection reasons.
    pub description: String,
    /// Whether an exact-IP allow-list entry may bypass this range.
    ///
    /// Loopback, link-local/metadata, multicast, and reserved ranges are
    /// never overridable; private and documentation ranges are.
    pub overridable: bool,
}

impl BlockedRange {
    pub fn new(net: IpNet, description: impl Into<String>, overridable: bool) -> Self {
        Self { net, description: description.into(), overridable }
    }
}

/// Ordered list of blocked ranges; first match wins.
#[derive(Debug, Clone, Default)]
pub struct RangeTable {
    ranges: Vec<BlockedRange>,
}

impl RangeTable {
    pub fn new(ranges: Vec<BlockedRange>) -> Self {
        Self { ranges }
    }

    /// Find the first range containing `ip`, if any.
    pub fn find(&self, ip: IpAddr) -> Option<&BlockedRange> {
        self.ranges.iter().find(|r| r.net.contains(&ip))
    }

    /// Append a range to the end of the table.
    pub fn push(&mut self, range: BlockedRange) {
        self.ranges.push(range);
    }

    pub fn ranges(&self) -> &[BlockedRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

// (cidr, description, overridable)
const DEFAULT_RANGES: &[(&str, &str, bool)] = &[
    ("127.0.0.0/8", "loopback", false),
    ("::1/128", "IPv6 loopback", false),
    ("0.0.0.0/8", "current network", false),
    ("10.0.0.0/8", "RFC 1918 private", true),
    ("172.16.0.0/12", "RFC 1918 private", true),
    ("192.168.0.0/16", "RFC 1918 private", true),
    ("169.254.0.0/16", "link-local / cloud metadata", false),
    ("fe80::/10", "IPv6 link-local", false),
    ("fc00::/7", "IPv6 unique-local", true),
    ("100.64.0.0/10", "carrier-grade NAT", true),
    ("224.0.0.0/4", "multicast", false),
    ("240.0.0.0/4", "reserved", false),
    ("192.0.2.0/24", "documentation (TEST-NET-1)", true),
    ("198.51.100.0/24", "documentation (TEST-NET-2)", true),
    ("203.0.113.0/24", "documentation (TEST-NET-3)", true),
];

/// The built-in blocked-range table.
///
/// Order matters: loopback and metadata ranges come before the broader
/// private ranges so they keep their specific rejection reasons.
pub fn default_table() -> RangeTable {
    let ranges = DEFAULT_RANGES
        .iter()
        .filter_map(|(cidr, desc, overridable)| {
            // Entries are compile-time constants; a parse failure would be a
            // bug caught by the unit test below.
            cidr.parse::<IpNet>()
                .ok()
                .map(|net| BlockedRange::new(net, *desc, *overridable))
        })
        .collect();
    RangeTable::new(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ip(s: &str) -> IpAddr {
        IpAddr::from_str(s).unwrap_or(IpAddr::from([0, 0, 0, 0]))
    }

    #[test]
    fn test_all_default_ranges_parse() {
        assert_eq!(default_table().ranges().len(), DEFAULT_RANGES.len());
    }

    #[test]
    fn test_first_match_wins() {
        let mut table = RangeTable::default();
        table.push(BlockedRange::new(
            "10.0.0.0/8".parse().unwrap(),
            "outer",
            false,
        ));
        table.push(BlockedRange::new(
            "10.1.0.0/16".parse().unwrap(),
            "inner",
            false,
        ));

        let hit = table.find(ip("10.1.2.3")).expect("should match");
        assert_eq!(hit.description, "outer");
    }

    #[test]
    fn test_loopback_matches() {
        let table = default_table();
        assert!(table.find(ip("127.0.0.1")).is_some());
        assert!(table.find(ip("127.255.255.255")).is_some());
        assert!(table.find(ip("::1")).is_some());
    }

    #[test]
    fn test_private_boundaries() {
        let table = default_table();
        assert!(table.find(ip("192.168.0.0")).is_some());
        assert!(table.find(ip("192.168.255.255")).is_some());
        assert!(table.find(ip("192.169.0.0")).is_none());
        assert!(table.find(ip("192.167.255.255")).is_none());
        assert!(table.find(ip("172.16.0.1")).is_some());
        assert!(table.find(ip("172.32.0.1")).is_none());
    }

    #[test]
    fn test_public_addresses_unmatched() {
        let table = default_table();
        assert!(table.find(ip("8.8.8.8")).is_none());
        assert!(table.find(ip("1.1.1.1")).is_none());
        assert!(table.find(ip("93.184.216.34")).is_none());
        assert!(table.find(ip("2606:4700::1111")).is_none());
    }

    #[test]
    fn test_metadata_range_not_overridable() {
        let table = default_table();
        let hit = table.find(ip("169.254.169.254")).expect("should match");
        assert!(!hit.overridable);
        assert!(hit.description.contains("metadata"));
    }

    #[test]
    fn test_documentation_ranges_overridable() {
        let table = default_table();
        let hit = table.find(ip("203.0.113.7")).expect("should match");
        assert!(hit.overridable);
    }
}
