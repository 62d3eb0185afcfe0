use crate::config::environment::AppConfig;
use crate::module::job::error::AppError;
use axum::http::HeaderMap;

pub const SYNC_SECRET_HEADER: &str = "x-sync-secret";

pub fn verify_sync_secret(config: &AppConfig, headers: &HeaderMap) -> Result<(), AppError> {
    if !config.sync_auth_enabled {
        return Ok(());
    }
    let secret = config.sync_auth_secret.as_deref().ok_or_else(|| {
        AppError::internal("SYNC_AUTH_CONFIG_ERROR", "sync auth secret missing")
    })?;
    let provided = headers
        .get(SYNC_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::unauthorized("SYNC_AUTH_MISSING", "missing sync secret"))?;
    if provided != secret {
        return Err(AppError::unauthorized(
            "SYNC_AUTH_INVALID",
            "invalid sync secret",
        ));
    }
    Ok(())
}
