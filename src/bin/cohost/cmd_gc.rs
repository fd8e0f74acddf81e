use anyhow::{bail, Result};
use std::path::PathBuf;

use cohost::Cohost;

use crate::util::human_bytes;

pub fn exec(path: PathBuf, keep: Option<String>, json: bool) -> Result<()> {
    // Parse here so "gc -3" and "gc x" fail as invalid input, before the
    // engine is even opened.
    let keep = match keep {
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) => Some(n),
            Err(_) => bail!("invalid input: retention count {:?} (want a non-negative integer)", raw),
        },
        None => None,
    };

    let mut engine = Cohost::open(&path)?;
    let report = engine.gc(keep)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.removed == 0 {
        println!("GC: nothing to prune");
    } else {
        println!(
            "GC: removed {} snapshot(s) across {} domain(s), reclaimed {}",
            report.removed,
            report.domains_pruned,
            human_bytes(report.bytes_reclaimed)
        );
    }
    Ok(())
}
