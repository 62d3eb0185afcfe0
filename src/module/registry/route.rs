use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::get;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/sync/agents",
            get(controller::trigger_agent_sync).post(controller::trigger_agent_sync),
        )
        .route("/v1/agents", get(controller::list_agents))
        .with_state(state)
}
