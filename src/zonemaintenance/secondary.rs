//! Keeping a secondary zone in sync with its primaries.

use core::time::Duration;
use std::net::SocketAddr;

use futures_util::StreamExt;
use rand::Rng;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use super::stopped;
use super::types::{TransferError, XfrTransport};
use crate::base::iana::Rcode;
use crate::base::serial::Serial;
use crate::rdata::Soa;
use crate::zonetree::{Zone, ZoneContent};

/// How long to wait between checks for the initial SOA.
const SOA_WAIT: Duration = Duration::from_secs(1);

/// The upper bound of the random delay before a refresh check.
const REFRESH_JITTER: Duration = Duration::from_millis(5000);

/// The upper bound of the random delay before a retry check.
const RETRY_JITTER: Duration = Duration::from_millis(2000);

impl Zone {
    /// Checks whether a primary has a newer version of the zone.
    ///
    /// The primaries are asked for their SOA record in turn. The first
    /// SOA received is compared to the zone’s own. If the zone has no SOA
    /// yet, any SOA is newer.
    pub async fn should_transfer(&self) -> Result<bool, TransferError> {
        let transport = self.xfr_transport()?;
        let mut remote = None;
        let mut last_err = None;
        for &primary in &self.config.transfer_from {
            last_err = None;
            match transport.query_soa(primary, self.origin.clone()).await {
                Ok(reply) if reply.rcode() == Rcode::NOERROR => {
                    if let Some(serial) = reply.soa_serial() {
                        remote = Some(serial);
                        break;
                    }
                }
                Ok(reply) => {
                    debug!(
                        "Zone '{}': SOA query to {primary} returned {}",
                        self.origin,
                        reply.rcode()
                    );
                }
                Err(source) => {
                    last_err =
                        Some(TransferError::Transport { primary, source });
                }
            }
        }
        let remote = match remote {
            Some(remote) => remote,
            None => return Err(last_err.unwrap_or(TransferError::NoSerial)),
        };
        let local = self.soa_serial();
        trace!(
            "Zone '{}': local serial {local:?}, primary serial {remote}",
            self.origin
        );
        Ok(match local {
            Some(local) => local.precedes(remote),
            None => true,
        })
    }

    /// Transfers the zone from one of its primaries.
    ///
    /// The primaries are tried in turn until a transfer succeeds. The
    /// transferred zone is built completely before it replaces the
    /// published content, so a failed transfer leaves the zone untouched.
    /// On success, the zone is no longer expired.
    ///
    /// Does nothing if the zone has no primaries.
    pub async fn transfer_in(&self) -> Result<(), TransferError> {
        if self.config.transfer_from.is_empty() {
            return Ok(());
        }
        let transport = self.xfr_transport()?;
        let mut last_err = None;
        for &primary in &self.config.transfer_from {
            match self.transfer_from(transport, primary).await {
                Ok(content) => {
                    let serial = content.apex().serial().unwrap_or(Serial(0));
                    self.publish(content);
                    self.set_expired(false);
                    info!(
                        "Transferred zone '{}' from {primary} with SOA serial {serial}",
                        self.origin
                    );
                    return Ok(());
                }
                Err(err) => {
                    error!(
                        "Failed to transfer zone '{}' from {primary}: {err}",
                        self.origin
                    );
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(TransferError::NoSoa))
    }

    /// Transfers the zone from a single primary.
    async fn transfer_from(
        &self,
        transport: &dyn XfrTransport,
        primary: SocketAddr,
    ) -> Result<ZoneContent, TransferError> {
        let mut stream = transport
            .axfr(primary, self.origin.clone())
            .await
            .map_err(|source| TransferError::Transport { primary, source })?;
        let mut content = ZoneContent::new();
        while let Some(batch) = stream.next().await {
            let batch = batch
                .map_err(|source| TransferError::Transport { primary, source })?;
            for record in batch {
                content
                    .insert(&self.origin, record)
                    .map_err(|source| TransferError::Zone { primary, source })?;
            }
        }
        if content.apex().soa().is_none() {
            return Err(TransferError::NoSoa);
        }
        Ok(content)
    }

    /// Keeps a secondary zone up to date.
    ///
    /// Waits for the zone to have a SOA record and then follows its
    /// refresh, retry, and expire timers. Every refresh interval, the
    /// primaries are checked for a newer version which is then transferred.
    /// If that fails, the zone goes into retry mode and is checked every
    /// retry interval instead. If the expire interval passes in retry mode,
    /// the zone is marked as expired.
    ///
    /// Returns when the zone is shut down.
    pub async fn update(&self) {
        let mut stop = self.stop_signal();
        let mut timers = loop {
            if let Some(timers) = self.snapshot().apex().soa_data().map(SoaTimers::new) {
                break timers;
            }
            tokio::select! {
                _ = stopped(&mut stop) => return,
                _ = sleep(SOA_WAIT) => { }
            }
        };

        let mut retry_active = false;
        'restart: loop {
            debug!(
                "Zone '{}': refresh {:?}, retry {:?}, expire {:?}",
                self.origin, timers.refresh, timers.retry, timers.expire
            );
            let mut refresh = timer(timers.refresh);
            let mut retry = timer(timers.retry);
            let mut expire = timer(timers.expire);

            loop {
                tokio::select! {
                    _ = stopped(&mut stop) => {
                        trace!("Zone '{}': stopping update", self.origin);
                        return;
                    }
                    _ = expire.tick() => {
                        if retry_active {
                            warn!("Zone '{}' has expired", self.origin);
                            self.set_expired(true);
                        }
                    }
                    _ = retry.tick() => {
                        if !retry_active {
                            continue;
                        }
                        tokio::select! {
                            _ = stopped(&mut stop) => {
                                trace!("Zone '{}': stopping update", self.origin);
                                return;
                            }
                            fresh = self.refresh_check(RETRY_JITTER, "retry") => {
                                if !fresh {
                                    continue;
                                }
                            }
                        }
                        retry_active = false;
                        timers = self.timers_or(timers);
                        continue 'restart;
                    }
                    _ = refresh.tick() => {
                        tokio::select! {
                            _ = stopped(&mut stop) => {
                                trace!("Zone '{}': stopping update", self.origin);
                                return;
                            }
                            fresh = self.refresh_check(REFRESH_JITTER, "refresh") => {
                                if !fresh {
                                    retry_active = true;
                                    continue;
                                }
                            }
                        }
                        retry_active = false;
                        timers = self.timers_or(timers);
                        continue 'restart;
                    }
                }
            }
        }
    }

    /// Checks the primaries after a random delay and transfers if needed.
    ///
    /// Returns whether the zone is up to date afterwards.
    async fn refresh_check(&self, max_jitter: Duration, kind: &str) -> bool {
        sleep(jitter(max_jitter)).await;
        match self.should_transfer().await {
            Ok(true) => self.transfer_in().await.is_ok(),
            Ok(false) => true,
            Err(err) => {
                warn!("Failed {kind} check for zone '{}': {err}", self.origin);
                false
            }
        }
    }

    /// Runs a secondary zone.
    ///
    /// Transfers the zone once and then keeps it up to date via
    /// [`update`][Self::update].
    pub async fn run_secondary(&self) {
        if let Err(err) = self.transfer_in().await {
            warn!("Initial transfer of zone '{}' failed: {err}", self.origin);
        }
        self.update().await
    }

    fn xfr_transport(&self) -> Result<&dyn XfrTransport, TransferError> {
        self.transport
            .as_deref()
            .ok_or(TransferError::NoTransport)
    }

    /// Returns the timers of the current SOA or `current` without one.
    fn timers_or(&self, current: SoaTimers) -> SoaTimers {
        self.snapshot()
            .apex()
            .soa_data()
            .map(SoaTimers::new)
            .unwrap_or(current)
    }
}

//------------ SoaTimers -----------------------------------------------------

/// The refresh timers of a SOA record.
#[derive(Clone, Copy, Debug)]
struct SoaTimers {
    refresh: Duration,
    retry: Duration,
    expire: Duration,
}

impl SoaTimers {
    fn new(soa: &Soa) -> Self {
        // Intervals must not be zero.
        let min = Duration::from_secs(1);
        SoaTimers {
            refresh: soa.refresh().into_duration().max(min),
            retry: soa.retry().into_duration().max(min),
            expire: soa.expire().into_duration().max(min),
        }
    }
}

/// Creates a timer first firing after one period.
fn timer(period: Duration) -> Interval {
    let mut res = interval_at(Instant::now() + period, period);
    res.set_missed_tick_behavior(MissedTickBehavior::Delay);
    res
}

/// Returns a random duration up to `max`.
fn jitter(max: Duration) -> Duration {
    let millis = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
}
