//! sync — reconcile the registry against the store's actual pin set.
//!
//! Drift arises from partial failures (a crash between pin and append, or
//! between unpin and remove) and from external pin manipulation. Repair:
//! 1. wanted = union of all content ids across all registry snapshots
//! 2. actual = store.list_pinned()
//! 3. wanted \ actual: re-pin. If the content is no longer retrievable,
//!    drop every snapshot referencing it (explicit, logged data loss —
//!    the one place entries leave the registry outside rm/gc).
//! 4. actual \ wanted: unpin (orphans, e.g. from an interrupted add).
//!
//! Step 3 runs strictly before step 4 so an entry is never dropped while
//! its content might still be recoverable from an orphan pin. Running
//! sync twice with no intervening mutation is a no-op the second time.

use log::{info, warn};
use serde::Serialize;

use crate::errors::Result;
use crate::metrics;

use super::Cohost;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Registry-tracked ids that were missing from the pin set and re-pinned.
    pub repinned: u64,
    /// Snapshots dropped because their content was unrecoverable.
    pub dropped: u64,
    /// Orphan pins (not tracked by any domain) that were released.
    pub reclaimed: u64,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.repinned == 0 && self.dropped == 0 && self.reclaimed == 0
    }
}

impl Cohost {
    pub fn sync(&mut self) -> Result<SyncReport> {
        self.ensure_writer("sync")?;
        metrics::inc_sync_runs();

        let wanted = self.registry.all_ids();
        let actual = self.store.list_pinned()?;
        let mut report = SyncReport::default();

        // Step 3: repair missing pins, dropping unrecoverable entries.
        for id in wanted.difference(&actual) {
            let recoverable = match self.store.fetch(id) {
                Ok(_) => true,
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => false,
            };
            if recoverable {
                self.store.pin(id)?;
                metrics::inc_pins();
                info!("sync: re-pinned {}", id.short());
                report.repinned += 1;
            } else {
                let dropped = self.registry.remove_id_everywhere(id)?;
                warn!(
                    "sync: content {} unrecoverable, dropped {} snapshot(s)",
                    id, dropped
                );
                report.dropped += dropped as u64;
            }
        }

        // Step 4: reclaim orphan pins.
        for id in actual.difference(&wanted) {
            self.store.unpin(id)?;
            metrics::inc_unpins();
            info!("sync: released orphan pin {}", id.short());
            report.reclaimed += 1;
        }

        metrics::add_sync_repins(report.repinned);
        metrics::add_sync_drops(report.dropped);
        metrics::add_sync_orphans_reclaimed(report.reclaimed);
        Ok(report)
    }
}
