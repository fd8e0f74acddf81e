use anyhow::{bail, Result};
use serde_json::json;
use std::path::PathBuf;

use cohost::Cohost;

pub fn exec(path: PathBuf, domains: Vec<String>, json: bool) -> Result<()> {
    let engine = Cohost::open_ro(&path)?;

    if domains.is_empty() {
        let all = engine.ls();
        if json {
            println!("{}", serde_json::to_string_pretty(&all)?);
        } else {
            for d in all {
                println!("{}", d);
            }
        }
        return Ok(());
    }

    let mut failed = 0usize;
    let mut obj = serde_json::Map::new();
    for d in &domains {
        match engine.snapshots(d) {
            Ok(snaps) => {
                if json {
                    let arr: Vec<_> = snaps
                        .iter()
                        .map(|s| {
                            json!({
                                "id": s.id.as_str(),
                                "size": s.size,
                                "created_at": s.created_at,
                            })
                        })
                        .collect();
                    obj.insert(d.clone(), serde_json::Value::Array(arr));
                } else {
                    println!("{}:", d);
                    // Oldest first, newest last.
                    for s in &snaps {
                        println!("  {}", s.id);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: error: {:#}", d, e);
            }
        }
    }
    if json && !obj.is_empty() {
        println!("{}", serde_json::to_string_pretty(&serde_json::Value::Object(obj))?);
    }
    if failed == domains.len() {
        bail!("ls failed for all {} domain(s)", failed);
    }
    Ok(())
}
