//! JSON export of due-card reports and full record backups.
//! Backups use the persisted record shape and are validated on import.

use crate::error::{Error, Result};
use crate::models::{SchedulingRecord, SuggestedCard};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// One line of the due-card report.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReportRow {
    pub flashcard_id: String,
    pub collection_id: String,
    pub collection_name: String,
    pub due_date: DateTime<Utc>,
    /// Two decimal places
    pub easiness_factor: String,
    pub interval_days: u32,
    pub repetitions: u32,
}

pub fn due_report(cards: &[SuggestedCard]) -> Vec<DueReportRow> {
    cards
        .iter()
        .map(|card| DueReportRow {
            flashcard_id: card.flashcard_id.clone(),
            collection_id: card.collection_id.clone(),
            collection_name: card
                .sm2_parameters
                .collection_name
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            due_date: card.due_date,
            easiness_factor: format!("{:.2}", card.sm2_parameters.easiness_factor),
            interval_days: card.sm2_parameters.interval_days,
            repetitions: card.sm2_parameters.repetitions,
        })
        .collect()
}

/// Writes the due-card report to `path`.
/// Fails with `NothingToExport` when there are no rows.
pub fn export_due_report_to_path(rows: &[DueReportRow], path: &Path) -> Result<()> {
    if rows.is_empty() {
        return Err(Error::NothingToExport);
    }
    write_pretty(rows, path)?;
    tracing::info!(path = %path.display(), cards = rows.len(), "due report exported");
    Ok(())
}

/// Exports scheduling records to a JSON backup file.
pub fn export_records_to_path(records: &[SchedulingRecord], path: &Path) -> Result<()> {
    write_pretty(records, path)?;
    tracing::info!(path = %path.display(), records = records.len(), "records exported");
    Ok(())
}

/// Imports scheduling records from a JSON backup file.
///
/// Every record is validated; the first invalid one fails the import.
pub fn import_records(path: &Path) -> Result<Vec<SchedulingRecord>> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let records: Vec<SchedulingRecord> = serde_json::from_str(&contents)?;
    for record in &records {
        record.validate()?;
    }

    tracing::info!(path = %path.display(), records = records.len(), "records imported");
    Ok(records)
}

fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}
