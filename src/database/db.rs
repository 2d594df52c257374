//! SQLite persistence for scheduling records
//!
//! Handles database initialization, record CRUD keyed on (user_id, flashcard_id),
//! and the simulated "current date" used to try out spaced repetition by hand.

use crate::error::{Error, Result, ValidationError};
use crate::models::{RecordKey, SchedulingRecord};
use chrono::{DateTime, Duration, TimeDelta, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

/// Opens (or creates) the database file and makes sure all tables exist.
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

/// Creates tables on an already open connection.
///
/// Seeds the simulated current date with the wall clock if not set yet.
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Timestamps are epoch milliseconds
    conn.execute(
        "CREATE TABLE IF NOT EXISTS scheduling_records (
            user_id TEXT NOT NULL,
            flashcard_id TEXT NOT NULL,
            easiness_factor REAL NOT NULL DEFAULT 2.5,
            repetitions INTEGER NOT NULL DEFAULT 0,
            interval_days INTEGER NOT NULL DEFAULT 0,
            due_date INTEGER NOT NULL,
            last_reviewed INTEGER NOT NULL,
            original_collection_id TEXT,
            collection_name TEXT,
            PRIMARY KEY (user_id, flashcard_id)
        )",
        (),
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_scheduling_records_due
         ON scheduling_records (user_id, due_date)",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp_millis().to_string()],
    )?;

    Ok(())
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| ValidationError::TimestampOutOfRange(ms).into())
}

/// Column values as stored, before timestamp conversion and validation.
struct RecordRow {
    user_id: String,
    flashcard_id: String,
    easiness_factor: f64,
    repetitions: u32,
    interval_days: u32,
    due_date: i64,
    last_reviewed: i64,
    original_collection_id: Option<String>,
    collection_name: Option<String>,
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            flashcard_id: row.get(1)?,
            easiness_factor: row.get(2)?,
            repetitions: row.get(3)?,
            interval_days: row.get(4)?,
            due_date: row.get(5)?,
            last_reviewed: row.get(6)?,
            original_collection_id: row.get(7)?,
            collection_name: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<SchedulingRecord> {
        let record = SchedulingRecord {
            user_id: self.user_id,
            flashcard_id: self.flashcard_id,
            easiness_factor: self.easiness_factor,
            repetitions: self.repetitions,
            interval_days: self.interval_days,
            due_date: from_millis(self.due_date)?,
            last_reviewed: from_millis(self.last_reviewed)?,
            original_collection_id: self.original_collection_id,
            collection_name: self.collection_name,
        };
        record.validate()?;
        Ok(record)
    }
}

const SELECT_COLUMNS: &str = "SELECT user_id, flashcard_id, easiness_factor, repetitions,
        interval_days, due_date, last_reviewed, original_collection_id, collection_name
     FROM scheduling_records";

/// Fetches one record; `Ok(None)` when the card was never reviewed.
///
/// A stored row that fails validation is an error.
pub fn get_record(key: &RecordKey, conn: &Connection) -> Result<Option<SchedulingRecord>> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE user_id = ?1 AND flashcard_id = ?2"),
            params![key.user_id, key.flashcard_id],
            RecordRow::from_row,
        )
        .optional()?;

    row.map(RecordRow::into_record).transpose()
}

/// Inserts a record or replaces the one with the same (user, flashcard) key.
pub fn upsert_record(record: &SchedulingRecord, conn: &Connection) -> Result<()> {
    record.validate()?;

    conn.execute(
        "INSERT INTO scheduling_records (
            user_id, flashcard_id, easiness_factor, repetitions, interval_days,
            due_date, last_reviewed, original_collection_id, collection_name
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT (user_id, flashcard_id) DO UPDATE SET
            easiness_factor = excluded.easiness_factor,
            repetitions = excluded.repetitions,
            interval_days = excluded.interval_days,
            due_date = excluded.due_date,
            last_reviewed = excluded.last_reviewed,
            original_collection_id = excluded.original_collection_id,
            collection_name = excluded.collection_name",
        params![
            record.user_id,
            record.flashcard_id,
            record.easiness_factor,
            record.repetitions,
            record.interval_days,
            record.due_date.timestamp_millis(),
            record.last_reviewed.timestamp_millis(),
            record.original_collection_id,
            record.collection_name,
        ],
    )?;

    Ok(())
}

/// Retrieves all records of a user, ordered by due date (oldest first).
///
/// Rows that fail validation are skipped with a warning so one bad row
/// cannot take down the whole review queue.
pub fn records_for_user(user_id: &str, conn: &Connection) -> Result<Vec<SchedulingRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY due_date ASC"
    ))?;

    let rows = stmt
        .query_map(params![user_id], RecordRow::from_row)?
        .collect::<rusqlite::Result<Vec<RecordRow>>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let flashcard_id = row.flashcard_id.clone();
        match row.into_record() {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(user_id, %flashcard_id, error = %err, "skipping malformed record")
            }
        }
    }

    Ok(records)
}

/// Returns true if a record was deleted.
pub fn delete_record(key: &RecordKey, conn: &Connection) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM scheduling_records WHERE user_id = ?1 AND flashcard_id = ?2",
        params![key.user_id, key.flashcard_id],
    )?;
    Ok(deleted > 0)
}

/// Deletes every record of a user, returning how many were removed.
pub fn delete_all_for_user(user_id: &str, conn: &Connection) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM scheduling_records WHERE user_id = ?1",
        params![user_id],
    )?;
    Ok(deleted)
}

/// Retrieves the simulated current date
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    let ms = value.parse::<i64>().map_err(|_| {
        Error::Validation(ValidationError::MissingField("app_state.current_date"))
    })?;
    from_millis(ms)
}

/// Moves the simulated date forward by `days` and returns the new date.
pub fn advance_days(days: i64, conn: &Connection) -> Result<DateTime<Utc>> {
    let current = get_current_date(conn)?;
    let next = TimeDelta::try_days(days)
        .and_then(|delta| current.checked_add_signed(delta))
        .ok_or(ValidationError::DayOffsetOutOfRange(days))?;

    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![next.timestamp_millis().to_string()],
    )?;

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardContext;
    use chrono::TimeZone;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap()
    }

    fn record(user: &str, card: &str, due_offset: i64) -> SchedulingRecord {
        let mut rec = SchedulingRecord::seed(
            RecordKey::new(user, card),
            CardContext::new("col", Some("Deck".to_string())),
            t0(),
        );
        rec.interval_days = due_offset.max(0) as u32;
        rec.due_date = t0() + Duration::days(due_offset);
        rec.last_reviewed = rec.due_date.min(t0());
        rec
    }

    #[test]
    fn test_upsert_and_get() {
        let conn = conn();
        let mut rec = record("u1", "c1", 3);
        upsert_record(&rec, &conn).unwrap();
        assert_eq!(get_record(&rec.key(), &conn).unwrap(), Some(rec.clone()));

        rec.repetitions = 4;
        rec.easiness_factor = 2.9;
        upsert_record(&rec, &conn).unwrap();
        assert_eq!(get_record(&rec.key(), &conn).unwrap(), Some(rec));
    }

    #[test]
    fn test_get_missing_is_none() {
        let conn = conn();
        assert_eq!(get_record(&RecordKey::new("u1", "nope"), &conn).unwrap(), None);
    }

    #[test]
    fn test_upsert_rejects_invalid() {
        let conn = conn();
        let mut rec = record("u1", "c1", 1);
        rec.easiness_factor = 0.5;
        assert!(matches!(
            upsert_record(&rec, &conn),
            Err(Error::Validation(ValidationError::EasinessBelowFloor(_)))
        ));
    }

    #[test]
    fn test_records_for_user_ordered_and_scoped() {
        let conn = conn();
        upsert_record(&record("u1", "late", 5), &conn).unwrap();
        upsert_record(&record("u1", "early", -2), &conn).unwrap();
        upsert_record(&record("u2", "other", 0), &conn).unwrap();

        let ids: Vec<_> = records_for_user("u1", &conn)
            .unwrap()
            .into_iter()
            .map(|r| r.flashcard_id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_malformed_row_skipped_in_listing() {
        let conn = conn();
        upsert_record(&record("u1", "good", 1), &conn).unwrap();
        conn.execute(
            "INSERT INTO scheduling_records VALUES ('u1', 'bad', 0.2, 0, 0, 0, 0, 'col', NULL)",
            (),
        )
        .unwrap();

        let records = records_for_user("u1", &conn).unwrap();
        assert_eq!(records.len(), 1);
        assert!(get_record(&RecordKey::new("u1", "bad"), &conn).is_err());
    }

    #[test]
    fn test_delete() {
        let conn = conn();
        upsert_record(&record("u1", "a", 1), &conn).unwrap();
        upsert_record(&record("u1", "b", 1), &conn).unwrap();
        upsert_record(&record("u2", "a", 1), &conn).unwrap();

        assert!(delete_record(&RecordKey::new("u1", "a"), &conn).unwrap());
        assert!(!delete_record(&RecordKey::new("u1", "a"), &conn).unwrap());
        assert_eq!(delete_all_for_user("u1", &conn).unwrap(), 1);
        assert_eq!(records_for_user("u2", &conn).unwrap().len(), 1);
    }

    #[test]
    fn test_advance_days() {
        let conn = conn();
        let start = get_current_date(&conn).unwrap();
        let next = advance_days(2, &conn).unwrap();
        assert_eq!(next, start + Duration::days(2));
        assert_eq!(get_current_date(&conn).unwrap(), next);
    }

    #[test]
    fn test_advance_days_out_of_range_is_error() {
        let conn = conn();
        let start = get_current_date(&conn).unwrap();

        for days in [200_000_000_000, i64::MAX, i64::MIN, 100_000_000] {
            assert!(matches!(
                advance_days(days, &conn),
                Err(Error::Validation(ValidationError::DayOffsetOutOfRange(d))) if d == days
            ));
        }
        assert_eq!(get_current_date(&conn).unwrap(), start);
    }
}
