//! engine — high-level cohost API.
//!
//! Split across submodules:
//! - mod.rs  — Cohost handle (open/open_ro), add/rm/ls/status, batch reports
//! - sync.rs — reconciler: repair drift between registry and store pin set
//! - gc.rs   — retention: keep newest N snapshots per domain, prune the rest
//!
//! Ordering invariants the engine owns:
//! - add: pin BEFORE append. A crash between the two leaves an orphan pin,
//!   reclaimed by sync; never a registry entry without a pin.
//! - rm/gc: unpin BEFORE removing the registry entry. A crash leaves at
//!   worst an entry referencing unpinned content, repaired by sync.

pub mod gc;
pub mod sync;

pub use gc::GcReport;
pub use sync::SyncReport;

use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::CohostConfig;
use crate::errors::{CohostError, Result};
use crate::lock::{acquire_lock, LockGuard, LockMode};
use crate::metrics;
use crate::registry::{Registry, Snapshot};
use crate::store::{ContentStore, FsStore};
use crate::util::{normalize_domain, now_secs};

/// Per-domain outcome of `add`.
#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub domain: String,
    pub hash: crate::store::ContentId,
    pub cumulative_size: u64,
    /// false: content unchanged since the newest snapshot (idempotent no-op).
    pub created: bool,
}

/// One domain's result within a batch. Per-domain failures never abort
/// sibling domains; only StoreUnavailable does (surfaced as the outer Err).
#[derive(Debug)]
pub struct OpReport<T> {
    pub domain: String,
    pub result: Result<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub domains: usize,
    pub snapshots: usize,
    pub pinned: usize,
    pub total_bytes: u64,
}

pub struct Cohost {
    pub root: PathBuf,
    pub(crate) registry: Registry,
    pub(crate) store: Box<dyn ContentStore>,
    pub(crate) config: CohostConfig,
    pub(crate) readonly: bool,
    _lock: LockGuard,
}

impl Cohost {
    /// Open as writer (exclusive lock held for the engine's lifetime).
    /// Creates the state root and store on first use.
    pub fn open(root: &Path) -> Result<Self> {
        Self::open_with_config(root, CohostConfig::from_env())
    }

    pub fn open_with_config(root: &Path, config: CohostConfig) -> Result<Self> {
        Self::open_inner(root, config, LockMode::Exclusive)
    }

    /// Read-only open (shared lock): ls/status without blocking readers.
    pub fn open_ro(root: &Path) -> Result<Self> {
        Self::open_inner(root, CohostConfig::from_env(), LockMode::Shared)
    }

    pub fn open_ro_with_config(root: &Path, config: CohostConfig) -> Result<Self> {
        Self::open_inner(root, config, LockMode::Shared)
    }

    fn open_inner(root: &Path, config: CohostConfig, mode: LockMode) -> Result<Self> {
        if !root.exists() {
            std::fs::create_dir_all(root)?;
        }
        let lock = acquire_lock(root, mode)?;
        let registry = Registry::open(root)?;
        let store = FsStore::open_or_create(root, &config)?;
        Ok(Self {
            root: root.to_path_buf(),
            registry,
            store: Box::new(store),
            config,
            readonly: mode == LockMode::Shared,
            _lock: lock,
        })
    }

    /// Embed with an explicit store implementation (remote daemon client,
    /// test double). Registry and lock discipline stay the engine's.
    pub fn with_store(root: &Path, store: Box<dyn ContentStore>, config: CohostConfig) -> Result<Self> {
        if !root.exists() {
            std::fs::create_dir_all(root)?;
        }
        let lock = acquire_lock(root, LockMode::Exclusive)?;
        let registry = Registry::open(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            registry,
            store,
            config,
            readonly: false,
            _lock: lock,
        })
    }

    pub(crate) fn ensure_writer(&self, op: &str) -> Result<()> {
        if self.readonly {
            return Err(CohostError::validation(format!(
                "{}: engine opened read-only",
                op
            )));
        }
        Ok(())
    }

    // -------- add --------

    /// Snapshot one domain's current content.
    ///
    /// Unchanged content (same content id as the newest snapshot) skips
    /// pin/append and reports the existing snapshot, so repeated adds are
    /// idempotent. Changed content gets exactly one new pin.
    pub fn add(&mut self, domain: &str) -> Result<AddOutcome> {
        self.ensure_writer("add")?;
        let domain = normalize_domain(domain)?;
        let imp = self.store.import(&domain)?;
        metrics::inc_imports(imp.size);

        if let Some(latest) = self.registry.latest(&domain) {
            if latest.id == imp.id {
                return Ok(AddOutcome {
                    domain,
                    hash: latest.id.clone(),
                    cumulative_size: latest.size,
                    created: false,
                });
            }
        }

        self.store.pin(&imp.id)?;
        metrics::inc_pins();
        self.registry.append(
            &domain,
            Snapshot {
                id: imp.id.clone(),
                size: imp.size,
                created_at: now_secs(),
            },
        )?;
        metrics::inc_snapshots_created();
        info!("add {}: pinned {} ({} B)", domain, imp.id.short(), imp.size);
        Ok(AddOutcome {
            domain,
            hash: imp.id,
            cumulative_size: imp.size,
            created: true,
        })
    }

    pub fn add_many(&mut self, domains: &[String]) -> Result<Vec<OpReport<AddOutcome>>> {
        self.batch(domains, |engine, d| engine.add(d))
    }

    // -------- rm --------

    /// Remove a domain entirely: unpin every snapshot, then drop the
    /// registry entry. NotFound if the domain has no snapshots.
    pub fn rm(&mut self, domain: &str) -> Result<()> {
        self.ensure_writer("rm")?;
        let domain = normalize_domain(domain)?;
        let snaps: Vec<Snapshot> = self.registry.get(&domain).to_vec();
        if snaps.is_empty() {
            return Err(CohostError::not_found(format!("domain {}", domain)));
        }
        let mut seen = std::collections::BTreeSet::new();
        for snap in &snaps {
            if !seen.insert(snap.id.clone()) {
                continue;
            }
            // Content shared with another domain keeps its pin.
            let within = snaps.iter().filter(|s| s.id == snap.id).count();
            if self.registry.refs(&snap.id) > within {
                continue;
            }
            // Unpin is idempotent; a pin already gone is not an error.
            self.store.unpin(&snap.id)?;
            metrics::inc_unpins();
        }
        self.registry.remove_domain(&domain)?;
        info!("rm {}: released {} snapshot(s)", domain, snaps.len());
        Ok(())
    }

    pub fn rm_many(&mut self, domains: &[String]) -> Result<Vec<OpReport<()>>> {
        self.batch(domains, |engine, d| engine.rm(d))
    }

    // -------- ls --------

    /// All cohosted domains, insertion order. Read-only.
    pub fn ls(&self) -> Vec<String> {
        self.registry.list_domains()
    }

    /// Ordered snapshots for one domain, oldest first (newest last).
    /// Strict: an unknown domain is NotFound, not an empty list.
    pub fn snapshots(&self, domain: &str) -> Result<Vec<Snapshot>> {
        let domain = normalize_domain(domain)?;
        let snaps = self.registry.get(&domain);
        if snaps.is_empty() {
            return Err(CohostError::not_found(format!("domain {}", domain)));
        }
        Ok(snaps.to_vec())
    }

    // -------- status --------

    pub fn status(&self) -> Result<StatusReport> {
        let pinned = self.store.list_pinned()?;
        Ok(StatusReport {
            domains: self.registry.domain_count(),
            snapshots: self.registry.snapshot_count(),
            pinned: pinned.len(),
            total_bytes: self.registry.total_bytes(),
        })
    }

    // -------- batch plumbing --------

    fn batch<T>(
        &mut self,
        domains: &[String],
        mut op: impl FnMut(&mut Self, &str) -> Result<T>,
    ) -> Result<Vec<OpReport<T>>> {
        let mut out = Vec::with_capacity(domains.len());
        for d in domains {
            match op(self, d) {
                Ok(v) => out.push(OpReport {
                    domain: d.clone(),
                    result: Ok(v),
                }),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => out.push(OpReport {
                    domain: d.clone(),
                    result: Err(e),
                }),
            }
        }
        Ok(out)
    }
}
