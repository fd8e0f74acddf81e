use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use cohost::{metrics, Cohost};

use crate::util::human_bytes;

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let engine = Cohost::open_ro(&path)?;
    let st = engine.status()?;
    let m = metrics::snapshot();

    if json {
        let out = json!({
            "root": engine.root.display().to_string(),
            "domains": st.domains,
            "snapshots": st.snapshots,
            "pinned": st.pinned,
            "total_bytes": st.total_bytes,
            "metrics": m,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("root:        {}", engine.root.display());
    println!("domains:     {}", st.domains);
    println!("snapshots:   {}", st.snapshots);
    println!("pinned:      {}", st.pinned);
    println!("total size:  {}", human_bytes(st.total_bytes));
    println!(
        "metrics:     imports={} pins={} unpins={} sync_runs={} gc_runs={}",
        m.imports_total, m.pins_total, m.unpins_total, m.sync_runs, m.gc_runs
    );
    Ok(())
}
