use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use cohost::{Cohost, CohostConfig};

#[test]
fn add_twice_unchanged_yields_one_snapshot() -> Result<()> {
    let root = unique_root("idem");
    write_site(&root, "a.com", &[("index.html", b"v1")]);

    let mut engine = Cohost::open_with_config(&root, CohostConfig::default())?;

    let first = engine.add("a.com")?;
    assert!(first.created);

    let second = engine.add("a.com")?;
    assert!(!second.created, "unchanged content must not create a snapshot");
    assert_eq!(second.hash, first.hash);
    assert_eq!(second.cumulative_size, first.cumulative_size);

    assert_eq!(engine.snapshots("a.com")?.len(), 1);
    Ok(())
}

#[test]
fn changed_content_appends_new_snapshot() -> Result<()> {
    let root = unique_root("changed");
    write_site(&root, "a.com", &[("index.html", b"v1")]);

    let mut engine = Cohost::open_with_config(&root, CohostConfig::default())?;
    let first = engine.add("a.com")?;

    write_site(&root, "a.com", &[("index.html", b"v2")]);
    let second = engine.add("a.com")?;
    assert!(second.created);
    assert_ne!(second.hash, first.hash);

    // oldest -> newest order
    let snaps = engine.snapshots("a.com")?;
    assert_eq!(snaps.len(), 2);
    assert_eq!(snaps[0].id, first.hash);
    assert_eq!(snaps[1].id, second.hash);
    Ok(())
}

#[test]
fn domain_names_are_case_insensitive() -> Result<()> {
    let root = unique_root("case");
    write_site(&root, "a.com", &[("index.html", b"x")]);

    let mut engine = Cohost::open_with_config(&root, CohostConfig::default())?;
    let first = engine.add("A.Com")?;
    assert_eq!(first.domain, "a.com");

    let second = engine.add("a.com.")?;
    assert!(!second.created, "same domain in FQDN form must dedup");
    assert_eq!(engine.ls(), vec!["a.com".to_string()]);
    Ok(())
}

fn write_site(root: &Path, domain: &str, files: &[(&str, &[u8])]) {
    for (rel, data) in files {
        let p = root.join("sites").join(domain).join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, data).unwrap();
    }
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("cohost-{}-{}-{}", prefix, pid, t))
}
