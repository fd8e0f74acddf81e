//! Centralized configuration for cohost.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - CohostConfig::from_env() reads the COHOST_* variables; builder-style
//!   setters override them programmatically.
//!
//! Variables:
//! - COHOST_STORE_DIR  — store location. Empty/unset: <root>/store.
//!   Absolute: used as is. Relative: resolved against the state root.
//! - COHOST_SITES_DIR  — where a domain's publishable content is read from
//!   on `add` (one subdirectory per domain). Same resolution rules,
//!   default <root>/sites.
//! - COHOST_GC_KEEP    — default retention count for `gc` without an
//!   explicit n (default 1: keep only the newest snapshot per domain).

use std::fmt;

#[derive(Clone, Debug)]
pub struct CohostConfig {
    /// Store directory override (COHOST_STORE_DIR). None: <root>/store.
    pub store_dir: Option<String>,

    /// Site content directory override (COHOST_SITES_DIR). None: <root>/sites.
    pub sites_dir: Option<String>,

    /// Default retention for `gc` when no count is given (COHOST_GC_KEEP).
    pub gc_keep: usize,
}

impl Default for CohostConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            sites_dir: None,
            gc_keep: 1,
        }
    }
}

impl CohostConfig {
    pub fn from_env() -> Self {
        Self {
            store_dir: env_nonempty("COHOST_STORE_DIR"),
            sites_dir: env_nonempty("COHOST_SITES_DIR"),
            gc_keep: env_usize("COHOST_GC_KEEP", 1),
        }
    }

    pub fn with_store_dir(mut self, dir: impl Into<String>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    pub fn with_sites_dir(mut self, dir: impl Into<String>) -> Self {
        self.sites_dir = Some(dir.into());
        self
    }

    pub fn with_gc_keep(mut self, keep: usize) -> Self {
        self.gc_keep = keep;
        self
    }
}

impl fmt::Display for CohostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CohostConfig {{ store_dir: {:?}, sites_dir: {:?}, gc_keep: {} }}",
            self.store_dir, self.sites_dir, self.gc_keep
        )
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) => {
            let v = v.trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        }
        Err(_) => None,
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_one() {
        let cfg = CohostConfig::default();
        assert_eq!(cfg.gc_keep, 1);
        assert!(cfg.store_dir.is_none());
        assert!(cfg.sites_dir.is_none());
    }

    #[test]
    fn builder_overrides() {
        let cfg = CohostConfig::default()
            .with_store_dir("/mnt/store")
            .with_sites_dir("content")
            .with_gc_keep(5);
        assert_eq!(cfg.store_dir.as_deref(), Some("/mnt/store"));
        assert_eq!(cfg.sites_dir.as_deref(), Some("content"));
        assert_eq!(cfg.gc_keep, 5);
    }
}
