use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/jobs", post(controller::create_job))
        .route("/v1/health", get(controller::health))
        .route("/v1/jobs/:job_id", get(controller::get_job))
        .route(
            "/v1/jobs/:job_id/refund-request",
            post(controller::request_refund),
        )
        .route("/v1/jobs/:job_id/input", post(controller::provide_input))
        .route(
            "/v1/jobs/:job_id/sync-agent",
            post(controller::sync_agent_status),
        )
        .route(
            "/v1/sync/purchases",
            get(controller::trigger_purchase_sync).post(controller::trigger_purchase_sync),
        )
        .with_state(state)
}
