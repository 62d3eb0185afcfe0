use super::crud;
use super::schema::{ListAgentsResponse, SyncTriggerResponse};
use crate::app::AppState;
use crate::module::job::error::AppError;
use crate::service::lock_service::LockError;
use crate::service::sync_auth_service::verify_sync_secret;
use crate::service::sync_service;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::{error, info};

pub async fn trigger_agent_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(err) = verify_sync_secret(&state.config, &headers) {
        return sync_error(err);
    }
    match sync_service::start_agent_sync(&state) {
        Ok(()) => {
            info!(instance_id = %state.config.instance_id, "agent registry sync started");
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
        Err(err) => sync_error(AppError::internal("LOCK_STORE_ERROR", err.to_string())),
    }
}

pub async fn list_agents(State(state): State<AppState>) -> impl IntoResponse {
    match crud::list_agents(&state).await {
        Ok(resp) => (StatusCode::OK, Json(resp)),
        Err(err) => {
            error!(error_code = err.code, reason = %err.message, "agent listing failed");
            (
                err.status,
                Json(ListAgentsResponse {
                    found: false,
                    agents: Vec::new(),
                    tags: Vec::new(),
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

fn sync_error(err: AppError) -> (StatusCode, Json<SyncTriggerResponse>) {
    error!(error_code = err.code, reason = %err.message, "sync trigger rejected");
    (
        err.status,
        Json(SyncTriggerResponse {
            message: err.message,
        }),
    )
}
