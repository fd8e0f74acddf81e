use anyhow::Result;
use std::path::PathBuf;

use cohost::Cohost;

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let mut engine = Cohost::open(&path)?;
    let report = engine.sync()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_noop() {
        println!("Sync: registry and pin set already consistent");
    } else {
        println!(
            "Sync: re-pinned {}, dropped {}, reclaimed {} orphan pin(s)",
            report.repinned, report.dropped, report.reclaimed
        );
    }
    Ok(())
}
