use super::crud;
use super::error::AppError;
use super::schema::{
    CreateJobRequest, CreateJobResponse, GetJobResponse, HealthMetricsView, HealthResponse,
    ProvideInputRequest, ProvideInputResponse, RequestRefundResponse, SyncAgentStatusResponse,
};
use crate::app::AppState;
use crate::module::registry::crud as registry_crud;
use crate::module::registry::schema::SyncTriggerResponse;
use crate::service::agent_api_service;
use crate::service::lock_service::LockError;
use crate::service::mapper_service;
use crate::service::metrics_service;
use crate::service::refund_service;
use crate::service::status_service;
use crate::service::sync_auth_service::verify_sync_secret;
use crate::service::sync_service;
use crate::service::webhook_service;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::{error, info, warn};

pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> impl IntoResponse {
    let agent_id = req.agent_id.clone();
    let user_id = req.user_id.clone();
    match crud::create_job(&state, req).await {
        Ok(resp) => {
            info!(job_id = %resp.job_id, blockchain_identifier = %resp.blockchain_identifier, "job accepted");
            let job_id = resp.job_id.clone();
            // detached; delivery failures never reach this request
            tokio::spawn(webhook_service::notify_agent_hired(
                state.clone(),
                job_id,
                agent_id,
                user_id,
            ));
            (StatusCode::OK, Json(resp))
        }
        Err(err) => error_create(err),
    }
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match crud::get_job(&state, &job_id).await {
        Ok(resp) => (StatusCode::OK, Json(resp)),
        Err(err) => error_get(err),
    }
}

pub async fn request_refund(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match refund_service::request_refund(&state, &job_id).await {
        Ok(resp) => (StatusCode::OK, Json(resp)),
        Err(err) => error_refund(&job_id, err),
    }
}

pub async fn provide_input(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(req): Json<ProvideInputRequest>,
) -> impl IntoResponse {
    match forward_input(&state, &job_id, &req).await {
        Ok(()) => {
            info!(job_id = %job_id, "input forwarded to agent");
            (
                StatusCode::OK,
                Json(ProvideInputResponse {
                    accepted: true,
                    job_id,
                    error_code: None,
                    reason: "input forwarded to agent".to_string(),
                }),
            )
        }
        Err(err) => error_input(&job_id, err),
    }
}

pub async fn sync_agent_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match poll_agent(&state, &job_id).await {
        Ok(resp) => (StatusCode::OK, Json(resp)),
        Err(err) => error_sync_agent(&job_id, err),
    }
}

pub async fn trigger_purchase_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(err) = verify_sync_secret(&state.config, &headers) {
        return error_sync_trigger(err);
    }
    match sync_service::start_purchase_sync(&state) {
        Ok(()) => {
            info!(instance_id = %state.config.instance_id, "purchase sync started");
            (
                StatusCode::OK,
                Json(SyncTriggerResponse {
                    message: "Syncing started".to_string(),
                }),
            )
        }
        Err(LockError::Locked(_)) => (
            StatusCode::CONFLICT,
            Json(SyncTriggerResponse {
                message: "already in progress".to_string(),
            }),
        ),
        Err(err) => error_sync_trigger(AppError::internal("LOCK_STORE_ERROR", err.to_string())),
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let m = metrics_service::snapshot();
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            instance_id: state.config.instance_id.clone(),
            sync_auth_enabled: state.config.sync_auth_enabled,
            metrics: HealthMetricsView {
                jobs_created: m.jobs_created,
                refunds_requested: m.refunds_requested,
                sync_runs_started: m.sync_runs_started,
                sync_runs_completed: m.sync_runs_completed,
                sync_runs_failed: m.sync_runs_failed,
                sync_items_skipped: m.sync_items_skipped,
                webhook_deliveries: m.webhook_deliveries,
                webhook_failures: m.webhook_failures,
                last_error_ts: m.last_error_ts,
            },
            error_code: None,
            reason: "healthy".to_string(),
        }),
    )
}

async fn forward_input(
    state: &AppState,
    job_id: &str,
    req: &ProvideInputRequest,
) -> Result<(), AppError> {
    let job = crud::get_job_record(state, job_id)?;
    if job.agent_job_status != Some(super::schema::AgentJobStatus::AwaitingInput) {
        return Err(AppError::conflict(
            "INPUT_NOT_EXPECTED",
            "agent is not awaiting input for this job",
        ));
    }
    let agent_job_id = job.agent_job_id.as_deref().ok_or_else(|| {
        AppError::conflict("AGENT_JOB_MISSING", "job has no remote agent job id")
    })?;
    let entry = registry_crud::get_agent_entry(state, &job.agent_id)?.ok_or_else(|| {
        AppError::not_found("AGENT_NOT_REGISTERED", "agent is not in the synced registry")
    })?;
    agent_api_service::provide_input(
        state,
        &entry.api_base_url,
        agent_job_id,
        None,
        &req.input_data,
    )
    .await
    .map_err(|e| {
        warn!(job_id = %job_id, agent_id = %job.agent_id, error = %e, "provide_input failed");
        AppError::bad_gateway("AGENT_UNREACHABLE", "agent input delivery failed")
    })
}

async fn poll_agent(state: &AppState, job_id: &str) -> Result<SyncAgentStatusResponse, AppError> {
    let job = crud::get_job_record(state, job_id)?;
    let agent_job_id = job.agent_job_id.as_deref().ok_or_else(|| {
        AppError::conflict("AGENT_JOB_MISSING", "job has no remote agent job id")
    })?;
    let entry = registry_crud::get_agent_entry(state, &job.agent_id)?.ok_or_else(|| {
        AppError::not_found("AGENT_NOT_REGISTERED", "agent is not in the synced registry")
    })?;
    let remote = agent_api_service::fetch_job_status(state, &entry.api_base_url, agent_job_id)
        .await
        .map_err(|e| {
            warn!(job_id = %job_id, agent_id = %job.agent_id, error = %e, "agent status fetch failed");
            AppError::bad_gateway("AGENT_UNREACHABLE", "agent status fetch failed")
        })?;
    let status = mapper_service::map_agent_status(&remote.status)
        .map_err(|e| AppError::bad_gateway("UNKNOWN_EXTERNAL_VALUE", e.to_string()))?;
    let job = crud::apply_agent_status(state, job_id, status, remote.result).await?;
    Ok(SyncAgentStatusResponse {
        updated: true,
        job_id: job_id.to_string(),
        agent_job_status: job.agent_job_status,
        status: Some(status_service::compute_status(&job)),
        error_code: None,
        reason: "agent status applied".to_string(),
    })
}

fn error_create(err: AppError) -> (StatusCode, Json<CreateJobResponse>) {
    error!(error_code = err.code, reason = %err.message, "job rejected");
    (
        err.status,
        Json(CreateJobResponse {
            accepted: false,
            job_id: String::new(),
            blockchain_identifier: String::new(),
            status: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_get(err: AppError) -> (StatusCode, Json<GetJobResponse>) {
    error!(error_code = err.code, reason = %err.message, "job lookup failed");
    (
        err.status,
        Json(GetJobResponse {
            found: false,
            job: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_refund(job_id: &str, err: AppError) -> (StatusCode, Json<RequestRefundResponse>) {
    error!(job_id = %job_id, error_code = err.code, reason = %err.message, "refund request rejected");
    (
        err.status,
        Json(RequestRefundResponse {
            accepted: false,
            job_id: job_id.to_string(),
            next_action: None,
            refunded_credit_transaction: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_input(job_id: &str, err: AppError) -> (StatusCode, Json<ProvideInputResponse>) {
    error!(job_id = %job_id, error_code = err.code, reason = %err.message, "input rejected");
    (
        err.status,
        Json(ProvideInputResponse {
            accepted: false,
            job_id: job_id.to_string(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_sync_agent(job_id: &str, err: AppError) -> (StatusCode, Json<SyncAgentStatusResponse>) {
    error!(job_id = %job_id, error_code = err.code, reason = %err.message, "agent status sync failed");
    (
        err.status,
        Json(SyncAgentStatusResponse {
            updated: false,
            job_id: job_id.to_string(),
            agent_job_status: None,
            status: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_sync_trigger(err: AppError) -> (StatusCode, Json<SyncTriggerResponse>) {
    error!(error_code = err.code, reason = %err.message, "sync trigger rejected");
    (
        err.status,
        Json(SyncTriggerResponse {
            message: err.message,
        }),
    )
}
