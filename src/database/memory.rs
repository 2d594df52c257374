//! In-memory record store keyed on (user_id, flashcard_id).
use super::RecordStore;
use crate::error::Result;
use crate::models::{RecordKey, SchedulingRecord};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<RecordKey, SchedulingRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get_record(&self, key: &RecordKey) -> Result<Option<SchedulingRecord>> {
        let Some(record) = self.records.get(key) else {
            return Ok(None);
        };
        record.validate()?;
        Ok(Some(record.clone()))
    }

    fn upsert_record(&mut self, record: &SchedulingRecord) -> Result<()> {
        record.validate()?;
        self.records.insert(record.key(), record.clone());
        Ok(())
    }

    fn records_for_user(&self, user_id: &str) -> Result<Vec<SchedulingRecord>> {
        let mut records = Vec::new();
        for record in self.records.values().filter(|r| r.user_id == user_id) {
            match record.validate() {
                Ok(()) => records.push(record.clone()),
                Err(err) => tracing::warn!(
                    user_id,
                    flashcard_id = %record.flashcard_id,
                    error = %err,
                    "skipping malformed record"
                ),
            }
        }
        records.sort_by_key(|r| r.due_date);
        Ok(records)
    }

    fn delete_record(&mut self, key: &RecordKey) -> Result<bool> {
        Ok(self.records.remove(key).is_some())
    }

    fn delete_all_for_user(&mut self, user_id: &str) -> Result<usize> {
        let before = self.records.len();
        self.records.retain(|key, _| key.user_id != user_id);
        Ok(before - self.records.len())
    }
}
