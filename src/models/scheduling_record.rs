//! Per-(user, flashcard) spaced repetition state.
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EASINESS_FACTOR: f64 = 2.5;
pub const MIN_EASINESS_FACTOR: f64 = 1.3;

/// Composite identity of a scheduling record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub user_id: String,
    pub flashcard_id: String,
}

impl RecordKey {
    pub fn new(user_id: impl Into<String>, flashcard_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            flashcard_id: flashcard_id.into(),
        }
    }
}

/// Denormalized collection info carried on a record for display and filtering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardContext {
    pub original_collection_id: Option<String>,
    pub collection_name: Option<String>,
}

impl CardContext {
    pub fn new(collection_id: impl Into<String>, collection_name: Option<String>) -> Self {
        Self {
            original_collection_id: Some(collection_id.into()),
            collection_name,
        }
    }

    /// Collection id is present and non-empty.
    pub fn has_collection(&self) -> bool {
        is_present(self.original_collection_id.as_deref())
    }
}

fn is_present(collection_id: Option<&str>) -> bool {
    collection_id.is_some_and(|id| !id.trim().is_empty())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingRecord {
    pub user_id: String,
    pub flashcard_id: String,
    pub easiness_factor: f64,
    pub repetitions: u32,
    pub interval_days: u32,
    pub due_date: DateTime<Utc>,
    pub last_reviewed: DateTime<Utc>,
    pub original_collection_id: Option<String>,
    pub collection_name: Option<String>,
}

impl SchedulingRecord {
    /// Fresh record for a card that has never been reviewed.
    pub fn seed(key: RecordKey, context: CardContext, now: DateTime<Utc>) -> Self {
        Self {
            user_id: key.user_id,
            flashcard_id: key.flashcard_id,
            easiness_factor: DEFAULT_EASINESS_FACTOR,
            repetitions: 0,
            interval_days: 0,
            due_date: now,
            last_reviewed: now,
            original_collection_id: context.original_collection_id,
            collection_name: context.collection_name,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.user_id.clone(), self.flashcard_id.clone())
    }

    pub fn context(&self) -> CardContext {
        CardContext {
            original_collection_id: self.original_collection_id.clone(),
            collection_name: self.collection_name.clone(),
        }
    }

    /// Collection id is present and non-empty.
    pub fn has_collection(&self) -> bool {
        is_present(self.original_collection_id.as_deref())
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date <= now
    }

    /// Checks a record arriving from storage or an import file.
    ///
    /// Missing collection context is allowed here; the due-set selector
    /// filters such records out on its own.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("userId"));
        }
        if self.flashcard_id.trim().is_empty() {
            return Err(ValidationError::MissingField("flashcardId"));
        }
        if !self.easiness_factor.is_finite() || self.easiness_factor < MIN_EASINESS_FACTOR {
            return Err(ValidationError::EasinessBelowFloor(self.easiness_factor));
        }
        if self.due_date < self.last_reviewed {
            return Err(ValidationError::DueBeforeReview);
        }
        Ok(())
    }
}
