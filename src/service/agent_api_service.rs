use crate::app::AppState;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentStatusResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(alias = "statusId", default)]
    pub status_id: Option<String>,
}

pub async fn fetch_job_status(
    state: &AppState,
    api_base_url: &str,
    agent_job_id: &str,
) -> Result<AgentStatusResponse, String> {
    let url = format!("{}/status", api_base_url.trim_end_matches('/'));
    let response = client(state)?
        .get(url)
        .query(&[("job_id", agent_job_id)])
        .send()
        .await
        .map_err(|e| format!("agent status fetch failed: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("agent status fetch failed: status {}", status.as_u16()));
    }
    response
        .json::<AgentStatusResponse>()
        .await
        .map_err(|e| format!("agent status decode failed: {e}"))
}

pub async fn provide_input(
    state: &AppState,
    api_base_url: &str,
    agent_job_id: &str,
    status_id: Option<&str>,
    input_data: &Value,
) -> Result<(), String> {
    let url = format!("{}/provide_input", api_base_url.trim_end_matches('/'));
    let payload = json!({
        "job_id": agent_job_id,
        "status_id": status_id,
        "input_data": input_data,
    });
    let response = client(state)?
        .post(url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| format!("provide_input failed: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("provide_input rejected: status {}", status.as_u16()));
    }
    Ok(())
}

fn client(state: &AppState) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(state.config.agent_api_timeout_ms))
        .build()
        .map_err(|e| format!("http client build failed: {e}"))
}
