//! DNS server settings echoed in the status record.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMAIN: &str = "weave.local.";
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:53";
pub const DEFAULT_TTL: u32 = 1;

/// Static configuration of the DNS server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsServerConfig {
    pub domain: String,
    /// Upstream resolvers, in preference order.
    pub upstream: Vec<String>,
    /// Address the server listens on.
    pub address: String,
    pub ttl: u32,
}

impl Default for DnsServerConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            upstream: Vec::new(),
            address: DEFAULT_ADDRESS.to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

impl DnsServerConfig {
    /// Replaces the upstream list with the `nameserver` lines of a
    /// `resolv.conf` file.
    pub fn with_upstream_from_resolv_conf(mut self, content: &str) -> Self {
        self.upstream = parse_resolv_conf_nameservers(content);
        self
    }
}

/// Extracts `nameserver` addresses from `resolv.conf` content.
///
/// Keeps file order, drops duplicates and ignores comments.
pub fn parse_resolv_conf_nameservers(content: &str) -> Vec<String> {
    let mut servers: Vec<String> = Vec::new();

    for line in content.lines() {
        let line = line.split(['#', ';']).next().unwrap_or("").trim();
        let mut fields = line.split_whitespace();
        if fields.next() != Some("nameserver") {
            continue;
        }
        if let Some(server) = fields.next()
            && !servers.iter().any(|s| s == server)
        {
            servers.push(server.to_string());
        }
    }

    servers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolv_conf() {
        let content = "\
# Generated by NetworkManager
search example.com
nameserver 10.0.0.2
nameserver 8.8.8.8 # google
; nameserver 1.1.1.1
nameserver 10.0.0.2
options ndots:5
";
        assert_eq!(
            parse_resolv_conf_nameservers(content),
            vec!["10.0.0.2", "8.8.8.8"]
        );
    }

    #[test]
    fn test_default_config() {
        let config: DnsServerConfig = serde_json::from_str(r#"{"ttl": 30}"#).unwrap();
        assert_eq!(config.domain, DEFAULT_DOMAIN);
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.ttl, 30);
        assert!(config.upstream.is_empty());
    }

    #[test]
    fn test_with_upstream_from_resolv_conf() {
        let config = DnsServerConfig::default().with_upstream_from_resolv_conf("nameserver 9.9.9.9\n");
        assert_eq!(config.upstream, vec!["9.9.9.9"]);
    }
}
