//! Selection of the cards a user should review next.
//!
//! Keeps records that are due and carry collection context, orders them
//! longest-overdue first and truncates to a caller-supplied limit.

use super::{SchedulingRecord, SuggestedCard};
use chrono::{DateTime, Utc};

/// Size of a normal "what to study next" queue.
pub const DEFAULT_DUE_LIMIT: usize = 20;
/// Size used when fetching due cards for bulk export.
pub const EXPORT_DUE_LIMIT: usize = 1000;

/// Returns at most `limit` due cards, oldest due date first.
///
/// Cards with equal due dates keep their input order. Records without a
/// collection id are skipped rather than failing the whole call.
pub fn select_due_cards(
    records: &[SchedulingRecord],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<SuggestedCard> {
    let mut due: Vec<SuggestedCard> = records
        .iter()
        .filter(|record| record.is_due(now))
        .filter_map(SuggestedCard::from_record)
        .collect();

    // sort_by_key is stable, which gives the tie-break
    due.sort_by_key(|card| card.due_date);
    due.truncate(limit);
    due
}
