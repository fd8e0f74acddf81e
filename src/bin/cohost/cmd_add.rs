use anyhow::{bail, Result};
use std::path::PathBuf;

use cohost::Cohost;

use crate::util::human_bytes;

pub fn exec(path: PathBuf, domains: Vec<String>) -> Result<()> {
    let mut engine = Cohost::open(&path)?;
    let reports = engine.add_many(&domains)?;

    let mut failed = 0usize;
    let mut total = 0u64;
    for r in &reports {
        match &r.result {
            Ok(out) if out.created => {
                total += out.cumulative_size;
                println!(
                    "{}: pinned {} ({})",
                    out.domain,
                    out.hash,
                    human_bytes(out.cumulative_size)
                );
            }
            Ok(out) => {
                total += out.cumulative_size;
                println!(
                    "{}: unchanged {} ({})",
                    out.domain,
                    out.hash,
                    human_bytes(out.cumulative_size)
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: error: {:#}", r.domain, e);
            }
        }
    }
    if reports.len() > 1 {
        println!(
            "Total: {} domain(s), {}",
            reports.len() - failed,
            human_bytes(total)
        );
    }
    if failed == reports.len() {
        bail!("add failed for all {} domain(s)", failed);
    }
    Ok(())
}
