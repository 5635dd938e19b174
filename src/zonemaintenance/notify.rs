//! Sending NOTIFY messages.

use core::fmt;
use std::net::SocketAddr;

use tracing::{debug, info, warn};

use super::types::{TransferPeer, TransportError, XfrTransport};
use crate::base::iana::Rcode;
use crate::base::name::Name;
use crate::zonetree::Zone;

/// How often a NOTIFY is sent before giving up on a peer.
const NOTIFY_ATTEMPTS: usize = 3;

impl Zone {
    /// Sends NOTIFY messages for the zone to all transfer peers.
    ///
    /// The messages are sent in the background. Failures are logged but
    /// otherwise ignored. The wildcard peer is skipped.
    ///
    /// Nothing is sent outside of a Tokio runtime or without a transport.
    pub fn notify(&self) {
        let transport = match self.transport.as_ref() {
            Some(transport) => transport,
            None => return,
        };
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(
                    "Zone '{}': cannot send NOTIFY outside a runtime",
                    self.origin
                );
                return;
            }
        };
        for peer in &self.config.transfer_to {
            let target = match peer {
                TransferPeer::Any => continue,
                TransferPeer::Addr(addr) => *addr,
            };
            let transport = transport.clone();
            let origin = self.origin.clone();
            runtime.spawn(async move {
                debug!("Sending NOTIFY for zone '{origin}' to {target}");
                match notify_target(transport.as_ref(), target, &origin).await
                {
                    Ok(()) => {
                        info!("Sent NOTIFY for zone '{origin}' to {target}")
                    }
                    Err(err) => warn!(
                        "NOTIFY for zone '{origin}' was not accepted by {target}: {err}"
                    ),
                }
            });
        }
    }
}

/// Sends a NOTIFY to a single target, trying a few times.
async fn notify_target(
    transport: &dyn XfrTransport,
    target: SocketAddr,
    origin: &Name,
) -> Result<(), NotifyError> {
    let mut err = NotifyError::Rcode(Rcode::SERVFAIL);
    for _ in 0..NOTIFY_ATTEMPTS {
        match transport.notify(target, origin.clone()).await {
            Ok(rcode) if rcode == Rcode::NOERROR => return Ok(()),
            Ok(rcode) => err = NotifyError::Rcode(rcode),
            Err(transport_err) => err = NotifyError::Transport(transport_err),
        }
    }
    Err(err)
}

//------------ NotifyError ---------------------------------------------------

/// Why a NOTIFY wasn’t accepted.
enum NotifyError {
    Rcode(Rcode),
    Transport(TransportError),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Rcode(rcode) => write!(f, "rcode was {rcode}"),
            NotifyError::Transport(err) => write!(f, "{err}"),
        }
    }
}
