//! Error taxonomy for the cohost engine.
//!
//! Four operational kinds plus plumbing conversions:
//! - Import:           a domain's content could not be resolved/imported.
//! - NotFound:         operation targets an absent domain/snapshot/object.
//! - Validation:       malformed input or an invariant check failed.
//! - StoreUnavailable: the store itself is unreachable — fatal for the
//!   whole invocation, never a per-domain outcome.
//!
//! Per-domain failures in a batch are isolated by the engine; only
//! StoreUnavailable aborts sibling domains.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CohostError>;

#[derive(Debug, Error)]
pub enum CohostError {
    /// Content for a domain is unreachable or could not be imported.
    #[error("import {domain}: {reason}")]
    Import { domain: String, reason: String },

    /// Absent domain, snapshot or store object.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input or violated invariant.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The underlying store cannot be reached at all.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry encode/decode: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CohostError {
    pub fn import(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        CohostError::Import {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CohostError::NotFound(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        CohostError::Validation(what.into())
    }

    pub fn store_unavailable(what: impl Into<String>) -> Self {
        CohostError::StoreUnavailable(what.into())
    }

    /// Fatal errors abort a whole batch; everything else is per-domain.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CohostError::StoreUnavailable(_))
    }
}
