use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockError {
    #[error("lock `{0}` is held by another instance")]
    Locked(String),
    #[error("lock store poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockRecord {
    pub key: String,
    pub is_locked: bool,
    pub locked_by: Option<String>,
    pub locked_at: Option<i64>,
}

#[derive(Debug, Default)]
pub struct LockStore {
    inner: Mutex<HashMap<String, LockRecord>>,
}

impl LockStore {
    pub fn acquire(&self, key: &str, instance_id: &str) -> Result<(), LockError> {
        let mut inner = self.inner.lock().map_err(|_| LockError::Poisoned)?;
        let record = inner.entry(key.to_string()).or_insert_with(|| LockRecord {
            key: key.to_string(),
            is_locked: false,
            locked_by: None,
            locked_at: None,
        });
        if record.is_locked {
            return Err(LockError::Locked(key.to_string()));
        }
        record.is_locked = true;
        record.locked_by = Some(instance_id.to_string());
        record.locked_at = Some(Utc::now().timestamp());
        Ok(())
    }

    /// Release is not owner-checked: the acquiring code path is responsible
    /// for being the only caller, and must release even after a panic.
    pub fn release(&self, key: &str) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(record) = inner.get_mut(key) {
            record.is_locked = false;
            record.locked_by = None;
            record.locked_at = None;
        }
    }

    pub fn get(&self, key: &str) -> Option<LockRecord> {
        self.inner.lock().ok().and_then(|inner| inner.get(key).cloned())
    }
}
