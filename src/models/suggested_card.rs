//! Read-only view of a card that is due for review.
use super::SchedulingRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedCard {
    pub flashcard_id: String,
    pub collection_id: String,
    pub due_date: DateTime<Utc>,
    pub sm2_parameters: SchedulingRecord,
}

impl SuggestedCard {
    /// Builds the view, or `None` when the record has no collection context.
    pub fn from_record(record: &SchedulingRecord) -> Option<Self> {
        if !record.has_collection() {
            return None;
        }
        Some(Self {
            flashcard_id: record.flashcard_id.clone(),
            collection_id: record.original_collection_id.clone()?,
            due_date: record.due_date,
            sm2_parameters: record.clone(),
        })
    }
}
