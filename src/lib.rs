// Base modules
pub mod config;
pub mod errors;
pub mod lock;
pub mod metrics;
pub mod util;

// Core layout
pub mod registry; // src/registry/mod.rs — persisted domain -> snapshots mapping
pub mod store;    // src/store/{mod,fs}.rs — ContentStore trait + embedded FsStore
pub mod engine;   // src/engine/{mod,sync,gc}.rs — add/rm/ls + reconciler + collector

// Convenience re-exports
pub use config::CohostConfig;
pub use engine::{AddOutcome, Cohost, GcReport, OpReport, StatusReport, SyncReport};
pub use errors::{CohostError, Result};
pub use registry::{Registry, Snapshot};
pub use store::{ContentId, ContentStore, FsStore, ImportResult};
