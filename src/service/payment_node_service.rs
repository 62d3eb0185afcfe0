use crate::app::AppState;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseNextAction {
    #[serde(alias = "requestedAction")]
    pub requested_action: String,
    #[serde(alias = "errorType", default)]
    pub error_type: Option<String>,
    #[serde(alias = "errorNote", default)]
    pub error_note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseTransaction {
    #[serde(alias = "txHash")]
    pub tx_hash: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseSnapshot {
    pub id: String,
    #[serde(alias = "onChainState", default)]
    pub on_chain_state: Option<String>,
    #[serde(alias = "inputHash", default)]
    pub input_hash: Option<String>,
    #[serde(alias = "resultHash", default)]
    pub result_hash: Option<String>,
    #[serde(rename = "NextAction")]
    pub next_action: PurchaseNextAction,
    #[serde(rename = "CurrentTransaction", default)]
    pub current_transaction: Option<PurchaseTransaction>,
    #[serde(alias = "unlockTime", default)]
    pub unlock_time: Option<i64>,
    #[serde(alias = "externalDisputeUnlockTime", default)]
    pub external_dispute_unlock_time: Option<i64>,
    #[serde(alias = "submitResultTime", default)]
    pub submit_result_time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct PurchasePage {
    purchases: Vec<PurchaseSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub name: String,
    #[serde(alias = "apiBaseUrl")]
    pub api_base_url: String,
    #[serde(alias = "sellerVkey", default)]
    pub seller_vkey: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RegistryPage {
    entries: Vec<RegistryEntry>,
}

pub async fn fetch_purchase_page(
    state: &AppState,
    cursor: Option<&str>,
    limit: usize,
) -> Result<Vec<PurchaseSnapshot>, String> {
    let url = format!(
        "{}/purchases",
        state.config.payment_node_base_url.trim_end_matches('/')
    );
    let mut request = client(state)?.get(url).query(&[("limit", limit.to_string())]);
    if let Some(cursor) = cursor {
        request = request.query(&[("cursor", cursor)]);
    }
    if let Some(key) = &state.config.payment_node_api_key {
        request = request.header("token", key);
    }
    let response = request
        .send()
        .await
        .map_err(|e| format!("purchase page fetch failed: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("purchase page fetch failed: status {}", status.as_u16()));
    }
    let page = response
        .json::<PurchasePage>()
        .await
        .map_err(|e| format!("purchase page decode failed: {e}"))?;
    Ok(page.purchases)
}

pub async fn fetch_registry_page(
    state: &AppState,
    cursor: Option<&str>,
    limit: usize,
) -> Result<Vec<RegistryEntry>, String> {
    let url = format!(
        "{}/registry",
        state.config.payment_node_base_url.trim_end_matches('/')
    );
    let mut request = client(state)?.get(url).query(&[("limit", limit.to_string())]);
    if let Some(cursor) = cursor {
        request = request.query(&[("cursor", cursor)]);
    }
    if let Some(key) = &state.config.payment_node_api_key {
        request = request.header("token", key);
    }
    let response = request
        .send()
        .await
        .map_err(|e| format!("registry page fetch failed: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("registry page fetch failed: status {}", status.as_u16()));
    }
    let page = response
        .json::<RegistryPage>()
        .await
        .map_err(|e| format!("registry page decode failed: {e}"))?;
    Ok(page.entries)
}

pub async fn request_purchase_refund(
    state: &AppState,
    blockchain_identifier: &str,
) -> Result<(), String> {
    let url = format!(
        "{}/purchases/{}/request-refund",
        state.config.payment_node_base_url.trim_end_matches('/'),
        blockchain_identifier
    );
    let mut request = client(state)?.post(url);
    if let Some(key) = &state.config.payment_node_api_key {
        request = request.header("token", key);
    }
    let response = request
        .send()
        .await
        .map_err(|e| format!("refund request failed: {e}"))?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(format!(
            "refund request rejected: status {} body {}",
            status.as_u16(),
            trim_body(&body)
        ));
    }
    Ok(())
}

fn client(state: &AppState) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(state.config.payment_node_timeout_ms))
        .build()
        .map_err(|e| format!("http client build failed: {e}"))
}

fn trim_body(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.len() > 400 {
        format!("{}...", &trimmed[..400])
    } else {
        trimmed.to_string()
    }
}
