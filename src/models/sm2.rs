//! SM-2 (SuperMemo 2) spaced repetition scheduler.
//!
//! Maps a prior scheduling state and a recall quality to the next state:
//! - The easiness factor (EF) is recomputed on every review, floored at 1.3
//! - Quality grades 0-2 are a lapse: repetitions reset, card comes back tomorrow
//! - Quality grades 3-5 grow the interval: 1 day → 6 days → previous interval × EF
//!
//! Pure function of its arguments. `now` is passed in by the caller.

use super::quality::Quality;
use super::scheduling_record::{CardContext, MIN_EASINESS_FACTOR, RecordKey, SchedulingRecord};
use chrono::{DateTime, Duration, Utc};

/// Upper bound on any interval.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// EF' = max(1.3, EF - 0.8 + 0.28q - 0.02q²)
pub fn next_easiness_factor(easiness_factor: f64, quality: Quality) -> f64 {
    let q = quality.value() as f64;
    // f64::max ignores NaN, so a corrupt EF lands on the floor
    (easiness_factor - 0.8 + 0.28 * q - 0.02 * q * q).max(MIN_EASINESS_FACTOR)
}

/// Computes the record that results from grading a card at `now`.
///
/// `current` is `None` on the first ever review; the record is then seeded
/// from `key` and `context`. Otherwise identity and collection context are
/// carried over from `current` and `key`/`context` are ignored.
pub fn compute_next_schedule(
    current: Option<&SchedulingRecord>,
    key: &RecordKey,
    context: &CardContext,
    quality: Quality,
    now: DateTime<Utc>,
) -> SchedulingRecord {
    let prev = match current {
        Some(record) => record.clone(),
        None => SchedulingRecord::seed(key.clone(), context.clone(), now),
    };

    let easiness_factor = next_easiness_factor(prev.easiness_factor, quality);

    let (repetitions, interval_days) = if quality.is_lapse() {
        (0, 1)
    } else {
        let reps = prev.repetitions.saturating_add(1);
        let interval = match reps {
            1 => 1,
            2 => 6,
            // A zero seed interval would multiply to zero forever
            _ => (prev.interval_days.max(1) as f64 * easiness_factor).ceil() as u32,
        };
        (reps, interval.clamp(1, MAX_INTERVAL_DAYS))
    };

    // Saturates at the last representable instant
    let due_date = now
        .checked_add_signed(Duration::days(interval_days as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    tracing::debug!(
        user_id = %prev.user_id,
        flashcard_id = %prev.flashcard_id,
        %quality,
        easiness_factor,
        repetitions,
        interval_days,
        "computed next schedule"
    );

    SchedulingRecord {
        easiness_factor,
        repetitions,
        interval_days,
        due_date,
        last_reviewed: now,
        ..prev
    }
}
