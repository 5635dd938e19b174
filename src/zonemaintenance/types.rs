//! Types used by zone maintenance.
//!
//! This module contains the configuration of a zone’s transfer and reload
//! behaviour as well as the capabilities injected into a zone for talking
//! to other name servers.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use std::net::{IpAddr, SocketAddr};

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

use crate::base::iana::{Rcode, Rtype};
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::serial::Serial;
use crate::zonetree::ZoneError;

//------------ Constants -----------------------------------------------------

/// The default interval for checking the zone file for changes.
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(60);

/// The default granularity of the reload timer.
pub const DEFAULT_RELOAD_TICK: Duration = Duration::from_secs(1);

//------------ TransferPeer --------------------------------------------------

/// A name server zone transfers are provided to.
///
/// Peers are also sent NOTIFY messages when the zone changes, except for
/// the wildcard peer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransferPeer {
    /// Any address is allowed to transfer the zone.
    Any,

    /// The name server at the given address.
    Addr(SocketAddr),
}

impl TransferPeer {
    /// Returns whether a request from `addr` matches this peer.
    pub fn matches(&self, addr: IpAddr) -> bool {
        match self {
            TransferPeer::Any => true,
            TransferPeer::Addr(peer) => peer.ip() == addr,
        }
    }
}

//--- FromStr and Display

impl FromStr for TransferPeer {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            Ok(TransferPeer::Any)
        } else {
            s.parse().map(TransferPeer::Addr)
        }
    }
}

impl fmt::Display for TransferPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferPeer::Any => f.write_str("*"),
            TransferPeer::Addr(addr) => write!(f, "{addr}"),
        }
    }
}

//--- Deserialize

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TransferPeer {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//------------ ZoneConfig ----------------------------------------------------

/// The maintenance configuration of a zone.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ZoneConfig {
    /// The peers allowed to transfer the zone and sent NOTIFYs.
    pub transfer_to: Vec<TransferPeer>,

    /// The primaries to transfer the zone from.
    ///
    /// If this is not empty, the zone is a secondary.
    pub transfer_from: Vec<SocketAddr>,

    /// The interval for re-reading the zone file.
    ///
    /// A zero interval disables reloading.
    pub reload_interval: Duration,

    /// How often the reload timer checks whether the interval has passed.
    pub reload_tick: Duration,
}

impl ZoneConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a peer allowed to transfer the zone.
    pub fn with_transfer_to(mut self, peer: TransferPeer) -> Self {
        self.transfer_to.push(peer);
        self
    }

    /// Adds a primary to transfer the zone from.
    pub fn with_transfer_from(mut self, primary: SocketAddr) -> Self {
        self.transfer_from.push(primary);
        self
    }

    /// Sets the reload interval.
    pub fn with_reload_interval(mut self, interval: Duration) -> Self {
        self.reload_interval = interval;
        self
    }

    /// Sets the reload tick.
    pub fn with_reload_tick(mut self, tick: Duration) -> Self {
        self.reload_tick = tick;
        self
    }

    /// Returns whether the zone is transferred from a primary.
    pub fn is_secondary(&self) -> bool {
        !self.transfer_from.is_empty()
    }

    /// Returns whether the zone never changes after set-up.
    ///
    /// This is the case if it is neither reloaded nor transferred.
    pub fn is_static(&self) -> bool {
        self.reload_interval.is_zero() && self.transfer_from.is_empty()
    }

    /// Returns whether `addr` is allowed to transfer the zone.
    pub fn transfer_allowed(&self, addr: IpAddr) -> bool {
        self.transfer_to.iter().any(|peer| peer.matches(addr))
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        ZoneConfig {
            transfer_to: Vec::new(),
            transfer_from: Vec::new(),
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            reload_tick: DEFAULT_RELOAD_TICK,
        }
    }
}

//------------ Reply ---------------------------------------------------------

/// The relevant parts of a response received from another name server.
#[derive(Clone, Debug)]
pub struct Reply {
    rcode: Rcode,
    answer: Vec<Record>,
}

impl Reply {
    /// Creates a reply from its rcode and answer section.
    pub fn new(rcode: Rcode, answer: Vec<Record>) -> Self {
        Reply { rcode, answer }
    }

    /// Returns the rcode of the reply.
    pub fn rcode(&self) -> Rcode {
        self.rcode
    }

    /// Returns the answer section.
    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    /// Converts the reply into its answer section.
    pub fn into_answer(self) -> Vec<Record> {
        self.answer
    }

    /// Returns the serial of the first SOA record in the answer.
    pub fn soa_serial(&self) -> Option<Serial> {
        self.answer
            .iter()
            .find_map(|record| record.data().as_soa().map(|soa| soa.serial()))
    }
}

//------------ TransportError ------------------------------------------------

/// Talking to another name server failed.
#[derive(Clone, Debug)]
pub struct TransportError(String);

impl TransportError {
    /// Creates an error from a message.
    pub fn new(msg: impl fmt::Display) -> Self {
        TransportError(msg.to_string())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

//------------ Upstream ------------------------------------------------------

/// A resolver for names outside the zone.
///
/// This is used to complete CNAME chains whose target is not in the zone.
pub trait Upstream: Send + Sync {
    /// Looks up records of the given type for the given name.
    fn lookup(
        &self,
        name: Name,
        rtype: Rtype,
    ) -> BoxFuture<'_, Result<Reply, TransportError>>;
}

//------------ XfrTransport --------------------------------------------------

/// The stream of record batches of an incoming zone transfer.
pub type XfrStream =
    BoxStream<'static, Result<Vec<Record>, TransportError>>;

/// The network transport used for zone maintenance.
pub trait XfrTransport: Send + Sync {
    /// Asks `primary` for the SOA record of the zone at `apex`.
    fn query_soa(
        &self,
        primary: SocketAddr,
        apex: Name,
    ) -> BoxFuture<'_, Result<Reply, TransportError>>;

    /// Starts an AXFR of the zone at `apex` from `primary`.
    fn axfr(
        &self,
        primary: SocketAddr,
        apex: Name,
    ) -> BoxFuture<'_, Result<XfrStream, TransportError>>;

    /// Sends a NOTIFY for the zone at `apex` to `target`.
    ///
    /// Returns the response code of the reply.
    fn notify(
        &self,
        target: SocketAddr,
        apex: Name,
    ) -> BoxFuture<'_, Result<Rcode, TransportError>>;
}

//------------ TransferError -------------------------------------------------

/// A zone transfer failed.
#[derive(Debug)]
pub enum TransferError {
    /// The zone has no SOA record.
    NoSoa,

    /// None of the primaries provided a SOA serial.
    NoSerial,

    /// The zone has primaries but no transport to reach them.
    NoTransport,

    /// Talking to a primary failed.
    Transport {
        primary: SocketAddr,
        source: TransportError,
    },

    /// A primary sent data that could not be added to the zone.
    Zone {
        primary: SocketAddr,
        source: ZoneError,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::NoSoa => f.write_str("zone has no SOA record"),
            TransferError::NoSerial => {
                f.write_str("no primary provided a SOA serial")
            }
            TransferError::NoTransport => {
                f.write_str("no transport for zone transfers")
            }
            TransferError::Transport { primary, source } => {
                write!(f, "transfer from {primary} failed: {source}")
            }
            TransferError::Zone { primary, source } => {
                write!(f, "bad data from {primary}: {source}")
            }
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Transport { source, .. } => Some(source),
            TransferError::Zone { source, .. } => Some(source),
            _ => None,
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transfer_peers() {
        let any: TransferPeer = "*".parse().unwrap();
        let peer: TransferPeer = "192.0.2.1:53".parse().unwrap();
        assert_eq!(any, TransferPeer::Any);
        assert!(peer.matches("192.0.2.1".parse().unwrap()));
        assert!(!peer.matches("192.0.2.2".parse().unwrap()));
        assert_eq!(peer.to_string(), "192.0.2.1:53");
        assert!("nonsense".parse::<TransferPeer>().is_err());

        let config = ZoneConfig::new().with_transfer_to(peer);
        assert!(config.transfer_allowed("192.0.2.1".parse().unwrap()));
        assert!(!config.transfer_allowed("2001:db8::1".parse().unwrap()));
        let config = config.with_transfer_to(any);
        assert!(config.transfer_allowed("2001:db8::1".parse().unwrap()));
        assert!(!config.is_secondary());
        assert!(!config.is_static());
        assert!(ZoneConfig::new()
            .with_reload_interval(Duration::ZERO)
            .is_static());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_config() {
        let config: ZoneConfig = serde_json::from_str(
            r#"{
                "transfer-to": ["*", "192.0.2.1:53"],
                "transfer-from": ["192.0.2.10:53"],
                "reload-interval": { "secs": 30, "nanos": 0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.transfer_to.len(), 2);
        assert!(config.is_secondary());
        assert_eq!(config.reload_interval, Duration::from_secs(30));
        assert_eq!(config.reload_tick, DEFAULT_RELOAD_TICK);
    }
}
