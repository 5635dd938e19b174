//! Keeping zones up to date.
//!
//! A primary zone re-reads its zone file periodically via
//! [`Zone::reload`] and tells its secondaries about changes via
//! [`Zone::notify`]. A secondary zone pulls the zone from its primaries
//! via [`Zone::transfer_in`] and keeps it fresh according to the SOA timers
//! via [`Zone::update`].
//!
//! The network is not touched directly. All communication with other name
//! servers goes through the [`XfrTransport`] given to the zone.
//!
//! [`Zone::reload`]: crate::zonetree::Zone::reload
//! [`Zone::notify`]: crate::zonetree::Zone::notify
//! [`Zone::transfer_in`]: crate::zonetree::Zone::transfer_in
//! [`Zone::update`]: crate::zonetree::Zone::update

pub use self::types::{
    Reply, TransferError, TransferPeer, TransportError, Upstream, XfrStream,
    XfrTransport, ZoneConfig, DEFAULT_RELOAD_INTERVAL, DEFAULT_RELOAD_TICK,
};

mod notify;
mod reload;
mod secondary;
pub mod types;

use tokio::sync::watch;

/// Resolves once the stop signal has been given.
async fn stopped(stop: &mut watch::Receiver<bool>) {
    // An error means the zone is gone, which is as good as stopping.
    let _ = stop.wait_for(|stop| *stop).await;
}
