use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cohost — content-addressed snapshots of cohosted domains.
#[derive(Parser, Debug)]
#[command(name = "cohost", version, about = "cohost CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Snapshot and pin each domain's current content.
    ///
    /// Content is read from <path>/sites/<domain> (COHOST_SITES_DIR to
    /// override). Unchanged domains are reported, not re-snapshotted.
    Add {
        /// State root (registry + store).
        #[arg(long, default_value = ".cohost")]
        path: PathBuf,
        /// Domains to snapshot.
        #[arg(required = true)]
        domains: Vec<String>,
    },
    /// Unpin and forget all snapshots of each domain.
    Rm {
        #[arg(long, default_value = ".cohost")]
        path: PathBuf,
        #[arg(required = true)]
        domains: Vec<String>,
    },
    /// List cohosted domains, or a domain's snapshots (newest last).
    Ls {
        #[arg(long, default_value = ".cohost")]
        path: PathBuf,
        /// Domains to show snapshots for. Empty: list all domains.
        domains: Vec<String>,
        /// JSON output
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Reconcile registry vs. store pin set: re-pin missing, drop
    /// unrecoverable, release orphan pins. Idempotent.
    Sync {
        #[arg(long, default_value = ".cohost")]
        path: PathBuf,
        /// JSON output
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Prune history: keep the newest N snapshots per domain.
    ///
    /// Without N, keeps 1 (COHOST_GC_KEEP to override the default).
    Gc {
        #[arg(long, default_value = ".cohost")]
        path: PathBuf,
        /// Retention count. Must be a non-negative integer.
        #[arg(allow_hyphen_values = true)]
        keep: Option<String>,
        /// JSON output
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print registry/store summary and process metrics.
    Status {
        #[arg(long, default_value = ".cohost")]
        path: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
