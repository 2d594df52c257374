//! Persistence for scheduling records.
//!
//! The scheduler never touches storage; callers fetch and persist through a
//! [`RecordStore`]. SQLite is the real backend, [`MemoryStore`] serves tests
//! and embedding.

pub mod db;
pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{RecordKey, SchedulingRecord};
use rusqlite::Connection;

pub trait RecordStore {
    fn get_record(&self, key: &RecordKey) -> Result<Option<SchedulingRecord>>;

    fn upsert_record(&mut self, record: &SchedulingRecord) -> Result<()>;

    /// All of a user's records, oldest due date first.
    fn records_for_user(&self, user_id: &str) -> Result<Vec<SchedulingRecord>>;

    fn delete_record(&mut self, key: &RecordKey) -> Result<bool>;

    fn delete_all_for_user(&mut self, user_id: &str) -> Result<usize>;
}

impl RecordStore for Connection {
    fn get_record(&self, key: &RecordKey) -> Result<Option<SchedulingRecord>> {
        db::get_record(key, self)
    }

    fn upsert_record(&mut self, record: &SchedulingRecord) -> Result<()> {
        db::upsert_record(record, self)
    }

    fn records_for_user(&self, user_id: &str) -> Result<Vec<SchedulingRecord>> {
        db::records_for_user(user_id, self)
    }

    fn delete_record(&mut self, key: &RecordKey) -> Result<bool> {
        db::delete_record(key, self)
    }

    fn delete_all_for_user(&mut self, user_id: &str) -> Result<usize> {
        db::delete_all_for_user(user_id, self)
    }
}
