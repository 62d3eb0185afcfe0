use super::model::{AgentEntryRecord, TagRecord};
use super::schema::{AgentEntryView, ListAgentsResponse};
use crate::app::AppState;
use crate::module::job::error::AppError;
use crate::service::payment_node_service::RegistryEntry;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct RegistryStore {
    inner: Mutex<RegistryStoreInner>,
}

#[derive(Debug, Default)]
struct RegistryStoreInner {
    agents_by_id: HashMap<String, AgentEntryRecord>,
    tags_by_name: HashMap<String, TagRecord>,
}

fn lock_store(store: &RegistryStore) -> Result<MutexGuard<'_, RegistryStoreInner>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_POISONED", "registry store lock poisoned"))
}

pub async fn upsert_tag(state: &AppState, name: &str) -> Result<(), AppError> {
    let mut inner = lock_store(&state.registry)?;
    let now = Utc::now().timestamp();
    inner
        .tags_by_name
        .entry(name.to_string())
        .and_modify(|tag| tag.last_seen_at = now)
        .or_insert_with(|| TagRecord {
            name: name.to_string(),
            first_seen_at: now,
            last_seen_at: now,
        });
    Ok(())
}

pub async fn upsert_agent_entry(state: &AppState, entry: &RegistryEntry) -> Result<(), AppError> {
    let mut inner = lock_store(&state.registry)?;
    let now = Utc::now().timestamp();
    inner
        .agents_by_id
        .entry(entry.id.clone())
        .and_modify(|record| {
            record.name = entry.name.clone();
            record.api_base_url = entry.api_base_url.clone();
            record.seller_vkey = entry.seller_vkey.clone();
            record.tags = entry.tags.clone();
            record.last_synced_at = now;
        })
        .or_insert_with(|| AgentEntryRecord {
            id: entry.id.clone(),
            name: entry.name.clone(),
            api_base_url: entry.api_base_url.clone(),
            seller_vkey: entry.seller_vkey.clone(),
            tags: entry.tags.clone(),
            first_synced_at: now,
            last_synced_at: now,
        });
    Ok(())
}

pub fn get_agent_entry(
    state: &AppState,
    agent_id: &str,
) -> Result<Option<AgentEntryRecord>, AppError> {
    let inner = lock_store(&state.registry)?;
    Ok(inner.agents_by_id.get(agent_id).cloned())
}

pub async fn list_agents(state: &AppState) -> Result<ListAgentsResponse, AppError> {
    let inner = lock_store(&state.registry)?;
    let mut agents = inner
        .agents_by_id
        .values()
        .map(|record| AgentEntryView {
            id: record.id.clone(),
            name: record.name.clone(),
            api_base_url: record.api_base_url.clone(),
            seller_vkey: record.seller_vkey.clone(),
            tags: record.tags.clone(),
            last_synced_at: record.last_synced_at,
        })
        .collect::<Vec<_>>();
    agents.sort_by(|a, b| a.name.cmp(&b.name));
    let mut tags = inner.tags_by_name.keys().cloned().collect::<Vec<_>>();
    tags.sort();
    let found = !agents.is_empty();
    Ok(ListAgentsResponse {
        found,
        agents,
        tags,
        error_code: None,
        reason: if found {
            "agents found".to_string()
        } else {
            "no agents synced yet".to_string()
        },
    })
}
