//! Review orchestration on top of a record store.
//! Fetches the current record, runs the SM-2 update and persists the result.

use super::{
    CardContext, Quality, RecordKey, SchedulingRecord, SuggestedCard, compute_next_schedule,
    select_due_cards,
};
use crate::database::RecordStore;
use crate::error::{Error, Result, ValidationError};
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Grades cards for any number of users against a shared store.
///
/// The store lock is held for the whole fetch-compute-persist cycle, so two
/// grades for the same card never lose an update.
pub struct ReviewSession<S: RecordStore> {
    store: Arc<Mutex<S>>,
    strict_quality: bool,
}

impl<S: RecordStore> Clone for ReviewSession<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            strict_quality: self.strict_quality,
        }
    }
}

impl<S: RecordStore> ReviewSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_shared_store(Arc::new(Mutex::new(store)))
    }

    pub fn with_shared_store(store: Arc<Mutex<S>>) -> Self {
        Self {
            store,
            strict_quality: false,
        }
    }

    /// Reject out-of-range quality instead of clamping it.
    pub fn strict_quality(mut self, strict: bool) -> Self {
        self.strict_quality = strict;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>> {
        self.store.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Grades a card and stores the new schedule.
    ///
    /// `context` is used to seed a first record, and when it names a
    /// collection it also refreshes the stored collection fields. A first
    /// review must name a collection, otherwise the card could never be due.
    ///
    /// `now` is truncated to milliseconds, the precision records are stored at.
    pub fn grade(
        &self,
        key: &RecordKey,
        context: &CardContext,
        raw_quality: i64,
        now: DateTime<Utc>,
    ) -> Result<SchedulingRecord> {
        let quality = Quality::parse(raw_quality, self.strict_quality)?;
        let now = now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now);

        let mut store = self.lock()?;
        let current = store.get_record(key)?;
        if current.is_none() && !context.has_collection() {
            return Err(ValidationError::MissingField("originalCollectionId").into());
        }
        let mut next = compute_next_schedule(current.as_ref(), key, context, quality, now);

        if context.has_collection() {
            next.original_collection_id = context.original_collection_id.clone();
            next.collection_name = context.collection_name.clone();
        }

        store.upsert_record(&next)?;

        tracing::info!(
            user_id = %key.user_id,
            flashcard_id = %key.flashcard_id,
            %quality,
            first_review = current.is_none(),
            interval_days = next.interval_days,
            due_date = %next.due_date,
            "review recorded"
        );

        Ok(next)
    }

    pub fn record(&self, key: &RecordKey) -> Result<Option<SchedulingRecord>> {
        self.lock()?.get_record(key)
    }

    pub fn records_for_user(&self, user_id: &str) -> Result<Vec<SchedulingRecord>> {
        self.lock()?.records_for_user(user_id)
    }

    /// The user's review queue at `now`, capped at `limit`.
    pub fn due_cards(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SuggestedCard>> {
        let records = self.records_for_user(user_id)?;
        let due = select_due_cards(&records, now, limit);
        tracing::debug!(user_id, total = records.len(), due = due.len(), "selected due cards");
        Ok(due)
    }

    /// Forgets a single card's schedule.
    pub fn reset_card(&self, key: &RecordKey) -> Result<()> {
        if !self.lock()?.delete_record(key)? {
            return Err(Error::RecordNotFound {
                user_id: key.user_id.clone(),
                flashcard_id: key.flashcard_id.clone(),
            });
        }
        tracing::info!(user_id = %key.user_id, flashcard_id = %key.flashcard_id, "record reset");
        Ok(())
    }

    /// Forgets all of a user's schedules. Returns the number removed.
    pub fn reset_user(&self, user_id: &str) -> Result<usize> {
        let removed = self.lock()?.delete_all_for_user(user_id)?;
        tracing::info!(user_id, removed, "all records reset");
        Ok(removed)
    }

    /// Writes already-validated records, e.g. from a backup file.
    pub fn restore(&self, records: &[SchedulingRecord]) -> Result<usize> {
        let mut store = self.lock()?;
        for record in records {
            store.upsert_record(record)?;
        }
        Ok(records.len())
    }
}
