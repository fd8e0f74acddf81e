//! gc — retention: keep the newest `keep` snapshots per domain.
//!
//! Only registry-tracked history is pruned, oldest first; a full sweep of
//! untracked store content is sync's job. Domains at or under the
//! threshold are untouched. `keep = 0` is valid and empties every domain
//! (a domain with zero snapshots leaves the registry, same as rm).
//!
//! Each pruned snapshot is unpinned BEFORE its registry entry is removed;
//! a crash mid-gc leaves at worst an entry referencing unpinned content,
//! repaired by the next sync.

use log::info;
use serde::Serialize;

use crate::errors::Result;
use crate::metrics;

use super::Cohost;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GcReport {
    /// Domains that had snapshots pruned.
    pub domains_pruned: usize,
    /// Snapshots unpinned and removed.
    pub removed: usize,
    /// Sum of removed snapshot sizes.
    pub bytes_reclaimed: u64,
}

impl Cohost {
    /// Prune history down to `keep` snapshots per domain.
    /// `None` uses the configured default (COHOST_GC_KEEP, normally 1).
    pub fn gc(&mut self, keep: Option<usize>) -> Result<GcReport> {
        self.ensure_writer("gc")?;
        let keep = keep.unwrap_or(self.config.gc_keep);
        metrics::inc_gc_runs();

        let mut report = GcReport::default();
        for domain in self.registry.list_domains() {
            let snaps = self.registry.get(&domain);
            if snaps.len() <= keep {
                continue;
            }
            let excess: Vec<_> = snaps[..snaps.len() - keep].to_vec();
            for snap in &excess {
                // Last reference releases the pin; shared content keeps it.
                if self.registry.refs(&snap.id) == 1 {
                    self.store.unpin(&snap.id)?;
                    metrics::inc_unpins();
                }
                self.registry.remove_snapshot(&domain, &snap.id)?;
                report.removed += 1;
                report.bytes_reclaimed += snap.size;
            }
            info!(
                "gc {}: pruned {} snapshot(s), kept {}",
                domain,
                excess.len(),
                keep
            );
            report.domains_pruned += 1;
        }

        metrics::add_gc_removed(report.removed as u64, report.bytes_reclaimed);
        Ok(report)
    }
}
