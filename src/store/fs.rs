//! FsStore — embedded content-addressed node (objects + pins).
//!
//! Layout under the store dir:
//! - objects/<hh>/<rest>  sha256-addressed blobs, written via tmp+rename
//! - pins/<hash>.pin      pin marker, payload: LE u64 unix seconds
//! - store.lock           fs2 exclusive lock held per mutating op
//!
//! Store dir resolution (COHOST_STORE_DIR via config):
//! - unset/empty -> <root>/store
//! - absolute    -> used as is
//! - relative    -> <root>/<value>
//!
//! import() reads the domain's publishable content from <sites>/<domain>
//! (COHOST_SITES_DIR, same resolution rules, default <root>/sites) and
//! packs it into one canonical tree blob:
//!   MAGIC8 "COHOSTT1", u32 file count, then per file (sorted by path):
//!   u32 path_len, path bytes ('/'-separated, relative), u64 data_len, data.
//! Identical site content therefore always yields the same content id.

use byteorder::{LittleEndian, WriteBytesExt};
use fs2::FileExt;
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CohostConfig;
use crate::errors::{CohostError, Result};
use crate::store::{ContentId, ContentStore, ImportResult};
use crate::util::now_secs;

const TREE_MAGIC: &[u8; 8] = b"COHOSTT1";

pub struct FsStore {
    dir: PathBuf,
    objects: PathBuf,
    pins: PathBuf,
    sites: PathBuf,
    lock_path: PathBuf,
}

impl FsStore {
    /// Open or create the store under `root`, honoring config overrides.
    /// Any failure here means the node is unusable for the whole run.
    pub fn open_or_create(root: &Path, config: &CohostConfig) -> Result<Self> {
        let dir = resolve_dir(root, config.store_dir.as_deref(), "store");
        let objects = dir.join("objects");
        let pins = dir.join("pins");
        let sites = resolve_dir(root, config.sites_dir.as_deref(), "sites");
        let lock_path = dir.join("store.lock");

        for d in [&dir, &objects, &pins] {
            fs::create_dir_all(d).map_err(|e| {
                CohostError::store_unavailable(format!("create {}: {}", d.display(), e))
            })?;
        }

        Ok(Self {
            dir,
            objects,
            pins,
            sites,
            lock_path,
        })
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir
    }

    pub fn sites_path(&self) -> &Path {
        &self.sites
    }

    /// Whether an object is present (not necessarily pinned).
    pub fn has(&self, id: &ContentId) -> bool {
        self.object_path(id).exists()
    }

    /// Remove an object blob regardless of pin state. Test/admin helper for
    /// simulating content loss on a remote node.
    pub fn evict_object(&self, id: &ContentId) -> Result<()> {
        let _lk = self.lock_exclusive()?;
        let p = self.object_path(id);
        match fs::remove_file(&p) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn lock_exclusive(&self) -> Result<File> {
        let f = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| {
                CohostError::store_unavailable(format!(
                    "open lock {}: {}",
                    self.lock_path.display(),
                    e
                ))
            })?;
        f.lock_exclusive().map_err(|e| {
            CohostError::store_unavailable(format!(
                "lock {}: {}",
                self.lock_path.display(),
                e
            ))
        })?;
        Ok(f)
    }

    fn object_path(&self, id: &ContentId) -> PathBuf {
        // objects/<hh>/<rest>
        let h = id.as_str();
        self.objects.join(&h[0..2]).join(&h[2..])
    }

    fn pin_path(&self, id: &ContentId) -> PathBuf {
        self.pins.join(format!("{}.pin", id))
    }

    fn write_object(&self, id: &ContentId, bytes: &[u8]) -> Result<()> {
        let obj = self.object_path(id);
        if obj.exists() {
            return Ok(());
        }
        let tmp = obj.with_extension("tmp");
        if let Some(parent) = tmp.parent() {
            fs::create_dir_all(parent)?;
        }
        {
            let mut f = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp)?;
            f.write_all(bytes)?;
            let _ = f.sync_all();
        }
        fs::rename(&tmp, &obj)?;
        Ok(())
    }
}

impl ContentStore for FsStore {
    fn import(&self, domain: &str) -> Result<ImportResult> {
        let site = self.sites.join(domain);
        if !site.is_dir() {
            return Err(CohostError::import(
                domain,
                format!("no content at {}", site.display()),
            ));
        }
        let blob = pack_site(domain, &site)?;
        let id = ContentId::from_bytes(&blob);
        let size = blob.len() as u64;

        let _lk = self.lock_exclusive()?;
        self.write_object(&id, &blob)?;
        Ok(ImportResult { id, size })
    }

    fn pin(&self, id: &ContentId) -> Result<()> {
        let _lk = self.lock_exclusive()?;
        if !self.object_path(id).exists() {
            return Err(CohostError::not_found(format!("object {}", id)));
        }
        let pp = self.pin_path(id);
        if pp.exists() {
            return Ok(());
        }
        let mut f = OpenOptions::new().create(true).write(true).open(&pp)?;
        f.write_u64::<LittleEndian>(now_secs())?;
        let _ = f.sync_all();
        Ok(())
    }

    fn unpin(&self, id: &ContentId) -> Result<()> {
        let _lk = self.lock_exclusive()?;
        match fs::remove_file(self.pin_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_pinned(&self) -> Result<BTreeSet<ContentId>> {
        let mut out = BTreeSet::new();
        let rd = fs::read_dir(&self.pins).map_err(|e| {
            CohostError::store_unavailable(format!("read {}: {}", self.pins.display(), e))
        })?;
        for entry in rd {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(hex) = name.strip_suffix(".pin") {
                if let Ok(id) = ContentId::from_hex(hex) {
                    out.insert(id);
                }
            }
        }
        Ok(out)
    }

    fn fetch(&self, id: &ContentId) -> Result<Vec<u8>> {
        let p = self.object_path(id);
        if !p.exists() {
            return Err(CohostError::not_found(format!("object {}", id)));
        }
        let mut f = OpenOptions::new().read(true).open(&p)?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// Canonical tree blob for one site directory. Deterministic: files are
/// sorted by their '/'-separated relative path before encoding.
fn pack_site(domain: &str, site: &Path) -> Result<Vec<u8>> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(site).follow_links(false) {
        let entry = entry.map_err(|e| CohostError::import(domain, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(site)
            .map_err(|e| CohostError::import(domain, e.to_string()))?;
        let rel: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push((rel.join("/"), entry.path().to_path_buf()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::new();
    out.extend_from_slice(TREE_MAGIC);
    out.write_u32::<LittleEndian>(files.len() as u32)?;
    for (rel, path) in &files {
        let data = fs::read(path)?;
        out.write_u32::<LittleEndian>(rel.len() as u32)?;
        out.extend_from_slice(rel.as_bytes());
        out.write_u64::<LittleEndian>(data.len() as u64)?;
        out.extend_from_slice(&data);
    }
    Ok(out)
}

fn resolve_dir(root: &Path, override_val: Option<&str>, default_name: &str) -> PathBuf {
    match override_val {
        Some(v) if !v.trim().is_empty() => {
            let p = Path::new(v.trim());
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        }
        _ => root.join(default_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_dir_rules() {
        let root = Path::new("/state");
        assert_eq!(resolve_dir(root, None, "store"), PathBuf::from("/state/store"));
        assert_eq!(resolve_dir(root, Some(""), "store"), PathBuf::from("/state/store"));
        assert_eq!(
            resolve_dir(root, Some("cache/objects"), "store"),
            PathBuf::from("/state/cache/objects")
        );
        assert_eq!(
            resolve_dir(root, Some("/mnt/store"), "store"),
            PathBuf::from("/mnt/store")
        );
    }
}
