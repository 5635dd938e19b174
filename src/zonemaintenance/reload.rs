//! Reloading a zone from its file.

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info, trace};

use super::stopped;
use crate::zonetree::{Zone, ZoneContent, ZoneError};

impl Zone {
    /// Periodically reloads the zone from its file.
    ///
    /// Every reload interval, the zone file is parsed again. If its SOA
    /// serial differs from the current one, the new content replaces the
    /// published content and NOTIFYs are sent. If anything goes wrong, the
    /// current content stays in place.
    ///
    /// Returns when the zone is shut down. Returns immediately if the
    /// reload interval is zero.
    pub async fn reload(&self) {
        let reload_interval = self.config.reload_interval;
        if reload_interval.is_zero() {
            return;
        }
        let mut stop = self.stop_signal();
        let mut tick = interval(self.config.reload_tick.max(TICK_MIN));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        loop {
            tokio::select! {
                _ = stopped(&mut stop) => {
                    trace!("Zone '{}': stopping reload", self.origin);
                    return;
                }
                _ = tick.tick() => { }
            }
            if last.elapsed() < reload_interval {
                continue;
            }
            last = Instant::now();
            self.reload_file().await;
        }
    }

    /// Re-reads the zone file once and publishes the result.
    async fn reload_file(&self) {
        let file = self.file();
        let origin = self.origin.clone();
        let serial = self.soa_serial();
        let path = file.clone();
        let res = tokio::task::spawn_blocking(move || {
            ZoneContent::load(&origin, &path, serial)
        })
        .await;

        let content = match res {
            Ok(Ok(content)) => content,
            Ok(Err(ZoneError::Unchanged(serial))) => {
                trace!(
                    "Zone '{}' unchanged at serial {serial}",
                    self.origin
                );
                return;
            }
            Ok(Err(err)) => {
                error!(
                    "Failed to reload zone '{}' from {}: {err}",
                    self.origin,
                    file.display()
                );
                return;
            }
            Err(err) => {
                error!("Reloading zone '{}' failed: {err}", self.origin);
                return;
            }
        };

        let serial = content.apex().serial();
        self.publish(content);
        if let Some(serial) = serial {
            info!(
                "Successfully reloaded zone '{}' from {} with SOA serial {serial}",
                self.origin,
                file.display()
            );
        }
        self.notify();
    }
}

/// The shortest tick allowed for the reload timer.
const TICK_MIN: core::time::Duration = core::time::Duration::from_millis(1);
