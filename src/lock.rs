//! File-based locking around the state root.
//!
//! Cross-platform (fs2) advisory locks:
//! - Exclusive: single writer (add/rm/sync/gc hold this for their lifetime).
//! - Shared: read-only opens (ls/status).
//!
//! Lock file path: <root>/LOCK
//! Lock is released on Drop.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub(crate) const LOCK_FILE: &str = "LOCK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

pub struct LockGuard {
    file: File,
    mode: LockMode,
}

impl LockGuard {
    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

fn lock_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

fn open_lock_file(root: &Path) -> Result<File> {
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(lock_path(root))?;
    Ok(f)
}

/// Acquire a lock in the requested mode. Blocks until acquired.
pub fn acquire_lock(root: &Path, mode: LockMode) -> Result<LockGuard> {
    let file = open_lock_file(root)?;
    match mode {
        LockMode::Shared => file.lock_shared()?,
        LockMode::Exclusive => file.lock_exclusive()?,
    }
    Ok(LockGuard { file, mode })
}
