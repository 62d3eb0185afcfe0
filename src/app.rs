use crate::config::environment::AppConfig;
use crate::module::job::crud::JobStore;
use crate::module::job::route as job_route;
use crate::module::registry::crud::RegistryStore;
use crate::module::registry::route as registry_route;
use crate::service::lock_service::LockStore;
use axum::Router;
use axum::http::Method;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jobs: Arc<JobStore>,
    pub registry: Arc<RegistryStore>,
    pub locks: Arc<LockStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            jobs: Arc::new(JobStore::default()),
            registry: Arc::new(RegistryStore::default()),
            locks: Arc::new(LockStore::default()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    job_route::register_routes(state.clone())
        .merge(registry_route::register_routes(state))
        .layer(cors)
}
