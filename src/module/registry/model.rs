use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntryRecord {
    pub id: String,
    pub name: String,
    pub api_base_url: String,
    pub seller_vkey: Option<String>,
    pub tags: Vec<String>,
    pub first_synced_at: i64,
    pub last_synced_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    pub name: String,
    pub first_seen_at: i64,
    pub last_seen_at: i64,
}
