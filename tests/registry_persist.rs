use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use cohost::{CohostError, ContentId, Registry, Snapshot};

fn snap(seed: &[u8], size: u64) -> Snapshot {
    Snapshot {
        id: ContentId::from_bytes(seed),
        size,
        created_at: 1_700_000_000,
    }
}

#[test]
fn append_get_list_ordering() -> Result<()> {
    let root = unique_root("reg");
    fs::create_dir_all(&root)?;

    let mut reg = Registry::open(&root)?;
    reg.append("b.com", snap(b"b1", 10))?;
    reg.append("a.com", snap(b"a1", 20))?;
    reg.append("b.com", snap(b"b2", 30))?;

    // insertion order of domains, oldest -> newest per domain
    assert_eq!(reg.list_domains(), vec!["b.com".to_string(), "a.com".to_string()]);
    let snaps = reg.get("b.com");
    assert_eq!(snaps.len(), 2);
    assert_eq!(snaps[0].id, ContentId::from_bytes(b"b1"));
    assert_eq!(snaps[1].id, ContentId::from_bytes(b"b2"));
    assert_eq!(reg.latest("b.com").unwrap().id, ContentId::from_bytes(b"b2"));
    assert!(reg.get("absent.com").is_empty());
    Ok(())
}

#[test]
fn duplicate_newest_append_is_rejected() -> Result<()> {
    let root = unique_root("dup");
    fs::create_dir_all(&root)?;

    let mut reg = Registry::open(&root)?;
    reg.append("a.com", snap(b"x", 1))?;
    match reg.append("a.com", snap(b"x", 1)) {
        Err(CohostError::Validation(_)) => {}
        other => panic!("expected Validation, got {:?}", other),
    }
    // non-adjacent repeat of an id is legal history
    reg.append("a.com", snap(b"y", 2))?;
    reg.append("a.com", snap(b"x", 1))?;
    assert_eq!(reg.get("a.com").len(), 3);
    Ok(())
}

#[test]
fn remove_snapshot_and_domain_semantics() -> Result<()> {
    let root = unique_root("rm");
    fs::create_dir_all(&root)?;

    let mut reg = Registry::open(&root)?;
    reg.append("a.com", snap(b"1", 5))?;
    reg.append("a.com", snap(b"2", 6))?;

    let removed = reg.remove_snapshot("a.com", &ContentId::from_bytes(b"1"))?;
    assert_eq!(removed.size, 5);
    assert!(matches!(
        reg.remove_snapshot("a.com", &ContentId::from_bytes(b"1")),
        Err(CohostError::NotFound(_))
    ));
    assert!(matches!(
        reg.remove_snapshot("ghost.com", &ContentId::from_bytes(b"1")),
        Err(CohostError::NotFound(_))
    ));

    // removing the last snapshot drops the domain entry
    reg.remove_snapshot("a.com", &ContentId::from_bytes(b"2"))?;
    assert!(reg.list_domains().is_empty());

    // remove_domain is idempotent
    assert!(!reg.remove_domain("a.com")?);
    Ok(())
}

#[test]
fn state_survives_reopen() -> Result<()> {
    let root = unique_root("reopen");
    fs::create_dir_all(&root)?;

    {
        let mut reg = Registry::open(&root)?;
        reg.append("a.com", snap(b"a1", 100))?;
        reg.append("b.com", snap(b"b1", 200))?;
    }
    let reg = Registry::open(&root)?;
    assert_eq!(reg.domain_count(), 2);
    assert_eq!(reg.snapshot_count(), 2);
    assert_eq!(reg.total_bytes(), 300);
    assert_eq!(reg.get("a.com")[0].size, 100);
    Ok(())
}

#[test]
fn torn_tmp_file_never_corrupts_committed_state() -> Result<()> {
    let root = unique_root("torn");
    fs::create_dir_all(&root)?;

    {
        let mut reg = Registry::open(&root)?;
        reg.append("a.com", snap(b"a1", 1))?;
    }
    // a crash mid-write leaves a garbage tmp next to the committed file
    fs::write(root.join("registry.json.tmp"), b"{ torn garbage")?;

    let mut reg = Registry::open(&root)?;
    assert_eq!(reg.list_domains(), vec!["a.com".to_string()]);

    // the next commit replaces the tmp and stays readable
    reg.append("a.com", snap(b"a2", 2))?;
    let reg = Registry::open(&root)?;
    assert_eq!(reg.snapshot_count(), 2);
    Ok(())
}

#[test]
fn refs_and_all_ids_count_shared_content() -> Result<()> {
    let root = unique_root("refs");
    fs::create_dir_all(&root)?;

    let mut reg = Registry::open(&root)?;
    reg.append("a.com", snap(b"shared", 1))?;
    reg.append("b.com", snap(b"shared", 1))?;
    reg.append("b.com", snap(b"solo", 2))?;

    assert_eq!(reg.refs(&ContentId::from_bytes(b"shared")), 2);
    assert_eq!(reg.refs(&ContentId::from_bytes(b"solo")), 1);
    assert_eq!(reg.refs(&ContentId::from_bytes(b"ghost")), 0);
    assert_eq!(reg.all_ids().len(), 2);
    Ok(())
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("cohost-{}-{}-{}", prefix, pid, t))
}
