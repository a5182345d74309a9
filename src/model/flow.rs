//! Datapath flow records.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 48-bit Ethernet hardware address.
///
/// Displays in canonical form: lowercase hex octets joined by `:`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HardwareAddr(pub [u8; 6]);

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

/// Error returned when parsing a malformed hardware address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hardware address: {0:?}")]
pub struct HardwareAddrParseError(pub String);

impl FromStr for HardwareAddr {
    type Err = HardwareAddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || HardwareAddrParseError(s.to_string());
        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for octet in &mut octets {
            let part = parts.next().ok_or_else(err)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(err());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| err())?;
        }
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self(octets))
    }
}

impl Serialize for HardwareAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HardwareAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Source and destination hardware addresses of an Ethernet header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetAddrs {
    pub src: HardwareAddr,
    pub dst: HardwareAddr,
}

/// Ethernet match key with its optional wildcard mask.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetFlowKey {
    pub key: EthernetAddrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<EthernetAddrs>,
}

impl EthernetFlowKey {
    /// Exact-match key with no mask.
    pub fn exact(src: HardwareAddr, dst: HardwareAddr) -> Self {
        Self {
            key: EthernetAddrs { src, dst },
            mask: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4FlowKey {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub proto: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelFlowKey {
    pub id: u64,
    pub ipv4_src: Ipv4Addr,
    pub ipv4_dst: Ipv4Addr,
}

/// One match key of a datapath flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKey {
    Ethernet(EthernetFlowKey),
    InPort(u32),
    EtherType(u16),
    Ipv4(Ipv4FlowKey),
    Tunnel(TunnelFlowKey),
    /// Key attribute type this crate does not decode.
    Unknown(u16),
}

/// A datapath flow with its cumulative counters.
///
/// Counters never decrease while the flow lives; a flow missing from a
/// later snapshot has expired or been evicted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStatus {
    #[serde(default)]
    pub keys: Vec<FlowKey>,
    #[serde(default)]
    pub packets: u64,
    #[serde(default)]
    pub bytes: u64,
}

/// Status of the fast datapath, as exposed through overlay diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastDpStatus {
    #[serde(default)]
    pub flows: Vec<FlowStatus>,
}
