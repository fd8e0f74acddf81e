use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use cohost::{Cohost, CohostConfig, ContentStore, FsStore};

#[test]
fn sync_repins_tracked_content_unpinned_out_of_band() -> Result<()> {
    let root = unique_root("repin");
    write_site(&root, "a.com", &[("index.html", b"x")]);

    let mut engine = Cohost::open_with_config(&root, CohostConfig::default())?;
    let out = engine.add("a.com")?;

    // drop the pin behind the engine's back; the object itself stays
    let store = FsStore::open_or_create(&root, &CohostConfig::default())?;
    store.unpin(&out.hash)?;
    assert!(!store.list_pinned()?.contains(&out.hash));

    let report = engine.sync()?;
    assert_eq!(report.repinned, 1);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.reclaimed, 0);

    // registry unchanged, pin restored
    assert_eq!(engine.snapshots("a.com")?.len(), 1);
    assert!(store.list_pinned()?.contains(&out.hash));
    Ok(())
}

#[test]
fn sync_drops_unrecoverable_snapshots() -> Result<()> {
    let root = unique_root("drop");
    write_site(&root, "a.com", &[("index.html", b"x")]);

    let mut engine = Cohost::open_with_config(&root, CohostConfig::default())?;
    let out = engine.add("a.com")?;

    // simulate content loss on the node: pin gone AND object gone
    let store = FsStore::open_or_create(&root, &CohostConfig::default())?;
    store.unpin(&out.hash)?;
    store.evict_object(&out.hash)?;

    let report = engine.sync()?;
    assert_eq!(report.repinned, 0);
    assert_eq!(report.dropped, 1);

    // the domain's only snapshot is gone, so the domain is too
    assert!(engine.ls().is_empty());
    Ok(())
}

#[test]
fn sync_reclaims_orphan_pins() -> Result<()> {
    let root = unique_root("orphan");
    write_site(&root, "a.com", &[("index.html", b"tracked")]);
    write_site(&root, "x.com", &[("index.html", b"orphan")]);

    let mut engine = Cohost::open_with_config(&root, CohostConfig::default())?;
    let tracked = engine.add("a.com")?;

    // pin something the registry never tracked (interrupted add shape)
    let store = FsStore::open_or_create(&root, &CohostConfig::default())?;
    let orphan = store.import("x.com")?;
    store.pin(&orphan.id)?;
    assert!(store.list_pinned()?.contains(&orphan.id));

    let report = engine.sync()?;
    assert_eq!(report.reclaimed, 1);
    assert_eq!(report.repinned, 0);
    assert_eq!(report.dropped, 0);

    let pinned = store.list_pinned()?;
    assert!(!pinned.contains(&orphan.id), "orphan pin must be released");
    assert!(pinned.contains(&tracked.hash), "tracked pin must survive");
    Ok(())
}

#[test]
fn sync_is_idempotent() -> Result<()> {
    let root = unique_root("idem");
    write_site(&root, "a.com", &[("index.html", b"x")]);

    let mut engine = Cohost::open_with_config(&root, CohostConfig::default())?;
    let out = engine.add("a.com")?;

    let store = FsStore::open_or_create(&root, &CohostConfig::default())?;
    store.unpin(&out.hash)?;

    let first = engine.sync()?;
    assert!(!first.is_noop());

    let second = engine.sync()?;
    assert!(second.is_noop(), "second sync with no mutation must be a no-op");
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
