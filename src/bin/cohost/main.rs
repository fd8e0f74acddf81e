use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_add;
mod cmd_gc;
mod cmd_ls;
mod cmd_rm;
mod cmd_status;
mod cmd_sync;
mod util;

fn init_logger() {
    // Level comes from RUST_LOG, default info.
    // Example: RUST_LOG=debug cohost sync
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Add { path, domains } => cmd_add::exec(path, domains),

        cli::Cmd::Rm { path, domains } => cmd_rm::exec(path, domains),

        cli::Cmd::Ls { path, domains, json } => cmd_ls::exec(path, domains, json),

        cli::Cmd::Sync { path, json } => cmd_sync::exec(path, json),

        cli::Cmd::Gc { path, keep, json } => cmd_gc::exec(path, keep, json),

        cli::Cmd::Status { path, json } => cmd_status::exec(path, json),
    }
}
