//! util — shared helpers.
//!
//! - now_secs(): current Unix time in seconds (u64, saturating).
//! - normalize_domain(): canonical registry key for a user-supplied host name.

use crate::errors::{CohostError, Result};

/// Current Unix time in seconds.
#[inline]
pub fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Normalize a user-supplied domain into its registry key.
///
/// Trims whitespace, strips a single trailing dot (FQDN form), lowercases.
/// Rejects empty input, embedded whitespace/slashes and empty labels.
pub fn normalize_domain(raw: &str) -> Result<String> {
    let s = raw.trim();
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() {
        return Err(CohostError::validation("empty domain name"));
    }
    if s.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(CohostError::validation(format!(
            "domain {:?} contains whitespace or '/'",
            raw
        )));
    }
    if s.split('.').any(|label| label.is_empty()) {
        return Err(CohostError::validation(format!(
            "domain {:?} has an empty label",
            raw
        )));
    }
    Ok(s.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_secs_monotonic_nonzero() {
        let a = now_secs();
        let b = now_secs();
        assert!(a > 0);
        assert!(b >= a);
    }

    #[test]
    fn normalize_lowercases_and_strips() {
        assert_eq!(normalize_domain("Example.COM").unwrap(), "example.com");
        assert_eq!(normalize_domain("  a.com  ").unwrap(), "a.com");
        assert_eq!(normalize_domain("a.com.").unwrap(), "a.com");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("   ").is_err());
        assert!(normalize_domain("a b.com").is_err());
        assert!(normalize_domain("a..com").is_err());
        assert!(normalize_domain("a.com/path").is_err());
    }
}
