//! Lightweight global metrics for cohost.
//!
//! Thread-safe atomic counters per subsystem:
//! - Store (imports, pins, unpins)
//! - Engine (snapshots created)
//! - Sync reconciler (runs, repins, drops, orphans reclaimed)
//! - Garbage collector (runs, snapshots removed, bytes reclaimed)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Store -----
static IMPORTS_TOTAL: AtomicU64 = AtomicU64::new(0);
static IMPORT_BYTES: AtomicU64 = AtomicU64::new(0);
static PINS_TOTAL: AtomicU64 = AtomicU64::new(0);
static UNPINS_TOTAL: AtomicU64 = AtomicU64::new(0);

// ----- Engine -----
static SNAPSHOTS_CREATED: AtomicU64 = AtomicU64::new(0);

// ----- Sync -----
static SYNC_RUNS: AtomicU64 = AtomicU64::new(0);
static SYNC_REPINS: AtomicU64 = AtomicU64::new(0);
static SYNC_DROPS: AtomicU64 = AtomicU64::new(0);
static SYNC_ORPHANS_RECLAIMED: AtomicU64 = AtomicU64::new(0);

// ----- GC -----
static GC_RUNS: AtomicU64 = AtomicU64::new(0);
static GC_SNAPSHOTS_REMOVED: AtomicU64 = AtomicU64::new(0);
static GC_BYTES_RECLAIMED: AtomicU64 = AtomicU64::new(0);

pub fn inc_imports(bytes: u64) {
    IMPORTS_TOTAL.fetch_add(1, Ordering::Relaxed);
    IMPORT_BYTES.fetch_add(bytes, Ordering::Relaxed);
}

pub fn inc_pins() {
    PINS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_unpins() {
    UNPINS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_snapshots_created() {
    SNAPSHOTS_CREATED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sync_runs() {
    SYNC_RUNS.fetch_add(1, Ordering::Relaxed);
}

pub fn add_sync_repins(n: u64) {
    SYNC_REPINS.fetch_add(n, Ordering::Relaxed);
}

pub fn add_sync_drops(n: u64) {
    SYNC_DROPS.fetch_add(n, Ordering::Relaxed);
}

pub fn add_sync_orphans_reclaimed(n: u64) {
    SYNC_ORPHANS_RECLAIMED.fetch_add(n, Ordering::Relaxed);
}

pub fn inc_gc_runs() {
    GC_RUNS.fetch_add(1, Ordering::Relaxed);
}

pub fn add_gc_removed(snapshots: u64, bytes: u64) {
    GC_SNAPSHOTS_REMOVED.fetch_add(snapshots, Ordering::Relaxed);
    GC_BYTES_RECLAIMED.fetch_add(bytes, Ordering::Relaxed);
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub imports_total: u64,
    pub import_bytes: u64,
    pub pins_total: u64,
    pub unpins_total: u64,
    pub snapshots_created: u64,
    pub sync_runs: u64,
    pub sync_repins: u64,
    pub sync_drops: u64,
    pub sync_orphans_reclaimed: u64,
    pub gc_runs: u64,
    pub gc_snapshots_removed: u64,
    pub gc_bytes_reclaimed: u64,
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        imports_total: IMPORTS_TOTAL.load(Ordering::Relaxed),
        import_bytes: IMPORT_BYTES.load(Ordering::Relaxed),
        pins_total: PINS_TOTAL.load(Ordering::Relaxed),
        unpins_total: UNPINS_TOTAL.load(Ordering::Relaxed),
        snapshots_created: SNAPSHOTS_CREATED.load(Ordering::Relaxed),
        sync_runs: SYNC_RUNS.load(Ordering::Relaxed),
        sync_repins: SYNC_REPINS.load(Ordering::Relaxed),
        sync_drops: SYNC_DROPS.load(Ordering::Relaxed),
        sync_orphans_reclaimed: SYNC_ORPHANS_RECLAIMED.load(Ordering::Relaxed),
        gc_runs: GC_RUNS.load(Ordering::Relaxed),
        gc_snapshots_removed: GC_SNAPSHOTS_REMOVED.load(Ordering::Relaxed),
        gc_bytes_reclaimed: GC_BYTES_RECLAIMED.load(Ordering::Relaxed),
    }
}
