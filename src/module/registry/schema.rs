use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTriggerResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntryView {
    pub id: String,
    pub name: String,
    pub api_base_url: String,
    pub seller_vkey: Option<String>,
    pub tags: Vec<String>,
    pub last_synced_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAgentsResponse {
    pub found: bool,
    pub agents: Vec<AgentEntryView>,
    pub tags: Vec<String>,
    pub error_code: Option<String>,
    pub reason: String,
}
