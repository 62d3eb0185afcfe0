use crate::app::AppState;
use crate::module::job::crud as job_crud;
use crate::module::registry::crud as registry_crud;
use crate::service::lock_service::LockError;
use crate::service::metrics_service;
use crate::service::payment_node_service;
use chrono::Utc;
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

pub const AGENT_SYNC_LOCK_KEY: &str = "sync:agents";
pub const PURCHASE_SYNC_LOCK_KEY: &str = "sync:purchases";

/// The crawl budget sits below the lock timeout so the lock is always
/// released before any observer would treat it as stale.
pub fn sync_budget(state: &AppState) -> Duration {
    let ms = state
        .config
        .lock_timeout_ms
        .saturating_sub(state.config.lock_timeout_buffer_ms)
        .max(1_000);
    Duration::from_millis(ms)
}

pub fn start_agent_sync(state: &AppState) -> Result<(), LockError> {
    state
        .locks
        .acquire(AGENT_SYNC_LOCK_KEY, &state.config.instance_id)?;
    metrics_service::inc_sync_runs_started();
    let task_state = state.clone();
    tokio::spawn(async move {
        let budget = sync_budget(&task_state);
        match timeout(budget, run_registry_crawl(&task_state)).await {
            Ok(Ok(entries)) => {
                metrics_service::inc_sync_runs_completed();
                info!(entries, "agent registry sync completed");
            }
            Ok(Err(e)) => {
                metrics_service::inc_sync_runs_failed();
                metrics_service::set_last_error_ts(Utc::now().timestamp());
                warn!(error = %e, "agent registry sync aborted");
            }
            Err(_) => {
                metrics_service::inc_sync_runs_failed();
                metrics_service::set_last_error_ts(Utc::now().timestamp());
                warn!(budget_ms = budget.as_millis() as u64, "agent registry sync timed out");
            }
        }
        task_state.locks.release(AGENT_SYNC_LOCK_KEY);
    });
    Ok(())
}

pub fn start_purchase_sync(state: &AppState) -> Result<(), LockError> {
    state
        .locks
        .acquire(PURCHASE_SYNC_LOCK_KEY, &state.config.instance_id)?;
    metrics_service::inc_sync_runs_started();
    let task_state = state.clone();
    tokio::spawn(async move {
        let budget = sync_budget(&task_state);
        match timeout(budget, run_purchase_crawl(&task_state)).await {
            Ok(Ok(applied)) => {
                metrics_service::inc_sync_runs_completed();
                info!(applied, "purchase sync completed");
            }
            Ok(Err(e)) => {
                metrics_service::inc_sync_runs_failed();
                metrics_service::set_last_error_ts(Utc::now().timestamp());
                warn!(error = %e, "purchase sync aborted");
            }
            Err(_) => {
                metrics_service::inc_sync_runs_failed();
                metrics_service::set_last_error_ts(Utc::now().timestamp());
                warn!(budget_ms = budget.as_millis() as u64, "purchase sync timed out");
            }
        }
        task_state.locks.release(PURCHASE_SYNC_LOCK_KEY);
    });
    Ok(())
}

async fn run_registry_crawl(state: &AppState) -> Result<u64, String> {
    let limit = state.config.sync_page_size.max(1);
    let mut cursor: Option<String> = None;
    let mut total = 0u64;

    loop {
        let page =
            payment_node_service::fetch_registry_page(state, cursor.as_deref(), limit).await?;
        let page_len = page.len();

        // tag rows must exist before the entries that reference them
        let mut tags: Vec<&str> = page
            .iter()
            .flat_map(|entry| entry.tags.iter().map(String::as_str))
            .collect();
        tags.sort_unstable();
        tags.dedup();
        for result in join_all(tags.iter().map(|tag| registry_crud::upsert_tag(state, tag))).await {
            result.map_err(|e| e.message)?;
        }

        for result in join_all(
            page.iter()
                .map(|entry| registry_crud::upsert_agent_entry(state, entry)),
        )
        .await
        {
            result.map_err(|e| e.message)?;
        }

        total += page_len as u64;
        if page_len < limit {
            break;
        }
        cursor = page.last().map(|entry| entry.id.clone());
    }

    Ok(total)
}

async fn run_purchase_crawl(state: &AppState) -> Result<u64, String> {
    let limit = state.config.sync_page_size.max(1);
    let mut cursor: Option<String> = None;
    let mut applied = 0u64;

    loop {
        let page =
            payment_node_service::fetch_purchase_page(state, cursor.as_deref(), limit).await?;
        let page_len = page.len();

        let results = join_all(
            page.iter()
                .map(|purchase| job_crud::apply_purchase(state, purchase)),
        )
        .await;
        for (purchase, result) in page.iter().zip(results) {
            match result {
                Ok(()) => applied += 1,
                Err(e) => {
                    metrics_service::inc_sync_items_skipped();
                    warn!(
                        purchase_id = %purchase.id,
                        error_code = e.code,
                        reason = %e.message,
                        "purchase update skipped"
                    );
                }
            }
        }

        if page_len < limit {
            break;
        }
        cursor = page.last().map(|purchase| purchase.id.clone());
    }

    Ok(applied)
}
