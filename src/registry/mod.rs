//! registry — persisted mapping domain -> ordered snapshots.
//!
//! Format: <root>/registry.json
//! {
//!   "version": 1,
//!   "domains": [
//!     {"domain":"a.com","snapshots":[{"id":"<hex>","size":100,"created_at":1712345678}]},
//!     ...
//!   ]
//! }
//!
//! Policy:
//! - Domains keep insertion order; snapshots are oldest -> newest.
//! - Every mutating call commits durably before returning: tmp+rename with
//!   sync_all, then fsync of the parent directory (best-effort off unix).
//!   A torn .tmp never touches the committed file.
//! - list_domains() only reports domains with at least one snapshot; an
//!   entry whose last snapshot is removed is dropped entirely.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{CohostError, Result};
use crate::store::ContentId;

pub(crate) const REGISTRY_FILE: &str = "registry.json";
const REGISTRY_VERSION: u32 = 1;

/// One immutable historical version of a domain's published content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: ContentId,
    pub size: u64,
    pub created_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct DomainEntry {
    domain: String,
    snapshots: Vec<Snapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u32,
    domains: Vec<DomainEntry>,
}

pub struct Registry {
    root: PathBuf,
    entries: Vec<DomainEntry>,
}

impl Registry {
    /// Open (or start empty) the registry under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(REGISTRY_FILE);
        if !path.exists() {
            return Ok(Self {
                root: root.to_path_buf(),
                entries: Vec::new(),
            });
        }
        let bytes = fs::read(&path)?;
        let file: RegistryFile = serde_json::from_slice(&bytes)?;
        if file.version != REGISTRY_VERSION {
            return Err(CohostError::validation(format!(
                "registry version {} (expected {})",
                file.version, REGISTRY_VERSION
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
            entries: file.domains,
        })
    }

    /// Ordered snapshots for a domain, oldest first. Empty slice if absent.
    pub fn get(&self, domain: &str) -> &[Snapshot] {
        self.entry(domain).map(|e| e.snapshots.as_slice()).unwrap_or(&[])
    }

    /// Newest snapshot for a domain, if any.
    pub fn latest(&self, domain: &str) -> Option<&Snapshot> {
        self.entry(domain).and_then(|e| e.snapshots.last())
    }

    /// Append a new newest snapshot for a domain.
    ///
    /// Dedup happens in the engine; a snapshot whose id equals the current
    /// newest is an invariant violation here, not a silent no-op.
    pub fn append(&mut self, domain: &str, snap: Snapshot) -> Result<()> {
        if let Some(latest) = self.latest(domain) {
            if latest.id == snap.id {
                return Err(CohostError::validation(format!(
                    "append {}: snapshot {} already newest",
                    domain, snap.id
                )));
            }
        }
        match self.entry_mut(domain) {
            Some(e) => e.snapshots.push(snap),
            None => self.entries.push(DomainEntry {
                domain: domain.to_string(),
                snapshots: vec![snap],
            }),
        }
        self.save()
    }

    /// Delete all snapshots for a domain. Idempotent: absent domain is Ok(false).
    pub fn remove_domain(&mut self, domain: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.domain != domain);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Remove exactly one snapshot. NotFound if the domain or id is absent.
    /// Returns the removed snapshot (size accounting for gc).
    pub fn remove_snapshot(&mut self, domain: &str, id: &ContentId) -> Result<Snapshot> {
        let entry = self
            .entry_mut(domain)
            .ok_or_else(|| CohostError::not_found(format!("domain {}", domain)))?;
        let pos = entry
            .snapshots
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| CohostError::not_found(format!("snapshot {} of {}", id, domain)))?;
        let removed = entry.snapshots.remove(pos);
        if entry.snapshots.is_empty() {
            self.entries.retain(|e| e.domain != domain);
        }
        self.save()?;
        Ok(removed)
    }

    /// Drop every snapshot referencing `id`, across all domains.
    /// Used only by sync when content is unrecoverable. One durable commit.
    pub fn remove_id_everywhere(&mut self, id: &ContentId) -> Result<usize> {
        let mut dropped = 0usize;
        for e in self.entries.iter_mut() {
            let before = e.snapshots.len();
            e.snapshots.retain(|s| &s.id != id);
            dropped += before - e.snapshots.len();
        }
        if dropped == 0 {
            return Ok(0);
        }
        self.entries.retain(|e| !e.snapshots.is_empty());
        self.save()?;
        Ok(dropped)
    }

    /// All domains with at least one snapshot, insertion order.
    pub fn list_domains(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.domain.clone()).collect()
    }

    /// Occurrences of `id` across all domains' snapshots. Unpinning is
    /// only safe when the last occurrence goes away.
    pub fn refs(&self, id: &ContentId) -> usize {
        self.entries
            .iter()
            .flat_map(|e| e.snapshots.iter())
            .filter(|s| &s.id == id)
            .count()
    }

    /// Union of all content ids across all snapshots.
    pub fn all_ids(&self) -> BTreeSet<ContentId> {
        self.entries
            .iter()
            .flat_map(|e| e.snapshots.iter().map(|s| s.id.clone()))
            .collect()
    }

    pub fn domain_count(&self) -> usize {
        self.entries.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.entries.iter().map(|e| e.snapshots.len()).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries
            .iter()
            .flat_map(|e| e.snapshots.iter())
            .map(|s| s.size)
            .sum()
    }

    fn entry(&self, domain: &str) -> Option<&DomainEntry> {
        self.entries.iter().find(|e| e.domain == domain)
    }

    fn entry_mut(&mut self, domain: &str) -> Option<&mut DomainEntry> {
        self.entries.iter_mut().find(|e| e.domain == domain)
    }

    /// Atomic durable commit: tmp + rename, fsync file and parent dir.
    fn save(&self) -> Result<()> {
        let path = self.root.join(REGISTRY_FILE);
        let tmp = self.root.join(format!("{}.tmp", REGISTRY_FILE));

        let file = RegistryFile {
            version: REGISTRY_VERSION,
            domains: self
                .entries
                .iter()
                .map(|e| DomainEntry {
                    domain: e.domain.clone(),
                    snapshots: e.snapshots.clone(),
                })
                .collect(),
        };
        let data = serde_json::to_vec_pretty(&file)?;

        {
            let mut f = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&tmp)?;
            f.write_all(&data)?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        fsync_dir(&self.root);
        debug!(
            "registry committed: {} domain(s), {} snapshot(s)",
            self.domain_count(),
            self.snapshot_count()
        );
        Ok(())
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) {
    // Durability of the rename itself; errors are best-effort.
    if let Ok(f) = std::fs::File::open(dir) {
        let _ = f.sync_all();
    }
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) {}
