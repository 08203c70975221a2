use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use super::{EntryRecord, PersistenceSink};
use crate::error::{CatalogError, Result};
use crate::model::Decision;

/// In-memory sink. Ids registered with [`MemorySink::fail_on`] reject writes.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<HashMap<String, EntryRecord>>,
    failing: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, entry_id: impl Into<String>) -> Self {
        self.failing.insert(entry_id.into());
        self
    }

    /// Seed a record, e.g. to simulate an earlier run.
    pub async fn insert(&self, record: EntryRecord) {
        self.records
            .lock()
            .await
            .insert(record.entry_id.clone(), record);
    }

    pub async fn get(&self, entry_id: &str) -> Option<EntryRecord> {
        self.records.lock().await.get(entry_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn upsert(&self, entry_id: &str, decision: &Decision) -> Result<EntryRecord> {
        if self.failing.contains(entry_id) {
            return Err(CatalogError::Persistence {
                entry_id: entry_id.to_string(),
                message: "write conflict".to_string(),
            });
        }
        let record = EntryRecord::from_decision(entry_id, decision, Utc::now());
        self.records
            .lock()
            .await
            .insert(entry_id.to_string(), record.clone());
        Ok(record)
    }

    async fn last_validated(&self, entry_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .records
            .lock()
            .await
            .get(entry_id)
            .map(|r| r.validated_at))
    }
}
