//! store — the narrow capability surface over a content-addressed node.
//!
//! The engine only ever talks through `ContentStore`:
//! - import(domain)  -> (content id, cumulative size)
//! - pin / unpin     -> retain / release content against the node's own GC
//! - list_pinned()   -> the node's present pin set (ground truth for sync)
//! - fetch(id)       -> object bytes (sync's recoverability check)
//!
//! `FsStore` (fs.rs) is the embedded node. A remote daemon client would
//! implement the same trait; transport details stay out of the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::{CohostError, Result};

pub mod fs;
pub use fs::FsStore;

/// Opaque deterministic content address (sha256, lowercase hex).
/// Identical content always yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Address raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        ContentId(hex_encode(&hasher.finalize()))
    }

    /// Parse an already-hex id (e.g. a pin file name). Validates shape only.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CohostError::validation(format!(
                "bad content id {:?} (want 64 hex chars)",
                s
            )));
        }
        Ok(ContentId(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for human output.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of importing a domain's current publishable content.
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub id: ContentId,
    pub size: u64,
}

pub trait ContentStore {
    /// Resolve the domain's current publishable content into a content
    /// tree, store it, and return its address and cumulative size.
    /// Does NOT pin; pinning is the caller's explicit step.
    fn import(&self, domain: &str) -> Result<ImportResult>;

    /// Retain content indefinitely. Fails with NotFound if the object is
    /// not retrievable. Pinning an already-pinned id is Ok.
    fn pin(&self, id: &ContentId) -> Result<()>;

    /// Release a pin. Idempotent: unpinning an unpinned id is Ok.
    fn unpin(&self, id: &ContentId) -> Result<()>;

    /// The store's present pin set.
    fn list_pinned(&self) -> Result<BTreeSet<ContentId>>;

    /// Object bytes for a pinned or unpinned id. NotFound if absent.
    fn fetch(&self, id: &ContentId) -> Result<Vec<u8>>;
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}
