use anyhow::{bail, Result};
use std::path::PathBuf;

use cohost::Cohost;

pub fn exec(path: PathBuf, domains: Vec<String>) -> Result<()> {
    let mut engine = Cohost::open(&path)?;
    let reports = engine.rm_many(&domains)?;

    let mut failed = 0usize;
    for r in &reports {
        match &r.result {
            Ok(()) => println!("{}: removed", r.domain),
            Err(e) => {
                failed += 1;
                eprintln!("{}: error: {:#}", r.domain, e);
            }
        }
    }
    if failed == reports.len() {
        bail!("rm failed for all {} domain(s)", failed);
    }
    Ok(())
}
