use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

static JOBS_CREATED: AtomicU64 = AtomicU64::new(0);
static REFUNDS_REQUESTED: AtomicU64 = AtomicU64::new(0);
static SYNC_RUNS_STARTED: AtomicU64 = AtomicU64::new(0);
static SYNC_RUNS_COMPLETED: AtomicU64 = AtomicU64::new(0);
static SYNC_RUNS_FAILED: AtomicU64 = AtomicU64::new(0);
static SYNC_ITEMS_SKIPPED: AtomicU64 = AtomicU64::new(0);
static WEBHOOK_DELIVERIES: AtomicU64 = AtomicU64::new(0);
static WEBHOOK_FAILURES: AtomicU64 = AtomicU64::new(0);
static LAST_ERROR_TS: AtomicI64 = AtomicI64::new(0);

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub jobs_created: u64,
    pub refunds_requested: u64,
    pub sync_runs_started: u64,
    pub sync_runs_completed: u64,
    pub sync_runs_failed: u64,
    pub sync_items_skipped: u64,
    pub webhook_deliveries: u64,
    pub webhook_failures: u64,
    pub last_error_ts: i64,
}

pub fn inc_jobs_created() {
    JOBS_CREATED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_refunds_requested() {
    REFUNDS_REQUESTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sync_runs_started() {
    SYNC_RUNS_STARTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sync_runs_completed() {
    SYNC_RUNS_COMPLETED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sync_runs_failed() {
    SYNC_RUNS_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_sync_items_skipped() {
    SYNC_ITEMS_SKIPPED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_webhook_deliveries() {
    WEBHOOK_DELIVERIES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_webhook_failures() {
    WEBHOOK_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn set_last_error_ts(ts: i64) {
    LAST_ERROR_TS.store(ts, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        jobs_created: JOBS_CREATED.load(Ordering::Relaxed),
        refunds_requested: REFUNDS_REQUESTED.load(Ordering::Relaxed),
        sync_runs_started: SYNC_RUNS_STARTED.load(Ordering::Relaxed),
        sync_runs_completed: SYNC_RUNS_COMPLETED.load(Ordering::Relaxed),
        sync_runs_failed: SYNC_RUNS_FAILED.load(Ordering::Relaxed),
        sync_items_skipped: SYNC_ITEMS_SKIPPED.load(Ordering::Relaxed),
        webhook_deliveries: WEBHOOK_DELIVERIES.load(Ordering::Relaxed),
        webhook_failures: WEBHOOK_FAILURES.load(Ordering::Relaxed),
        last_error_ts: LAST_ERROR_TS.load(Ordering::Relaxed),
    }
}
