use chrono::{DateTime, Duration, TimeDelta, TimeZone, Utc};
use flashcards_sm2::database::db;
use flashcards_sm2::{CardContext, RecordKey, ReviewSession};
use tempfile::tempdir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 18, 0, 0).unwrap()
}

#[test]
fn sqlite_backed_review_cycle() {
    let dir = tempdir().unwrap();
    let conn = db::init_database(&dir.path().join("flow.sqlite3")).unwrap();
    let session = ReviewSession::new(conn);
    let key = RecordKey::new("alice", "ser-vs-estar");
    let ctx = CardContext::new("spanish-101", Some("Spanish 101".to_string()));

    let first = session.grade(&key, &ctx, 5, t0()).unwrap();
    assert_eq!((first.repetitions, first.interval_days), (1, 1));
    assert_eq!(first.due_date, t0() + Duration::days(1));

    let second = session.grade(&key, &ctx, 5, t0() + Duration::days(1)).unwrap();
    assert_eq!((second.repetitions, second.interval_days), (2, 6));
    assert_eq!(second.due_date, t0() + Duration::days(7));

    let third = session.grade(&key, &ctx, 5, t0() + Duration::days(7)).unwrap();
    assert_eq!(third.repetitions, 3);
    assert_eq!(third.interval_days, 17);

    let lapse = session.grade(&key, &ctx, 1, t0() + Duration::days(24)).unwrap();
    assert_eq!((lapse.repetitions, lapse.interval_days), (0, 1));
    assert!((lapse.easiness_factor - (third.easiness_factor - 0.54)).abs() < 1e-9);

    // What was persisted is what the scheduler returned
    assert_eq!(session.record(&key).unwrap(), Some(lapse));
}

#[test]
fn due_queue_across_cards() {
    let dir = tempdir().unwrap();
    let conn = db::init_database(&dir.path().join("queue.sqlite3")).unwrap();
    let session = ReviewSession::new(conn);
    let ctx = CardContext::new("col", None);

    // Lapses come back one day after the review
    let lapses = [
        ("bob", "two-days-ago", 3),
        ("bob", "yesterday", 2),
        ("bob", "tomorrow", 0),
        ("carol", "elsewhere", 5),
    ];
    for (user, card, days_ago) in lapses {
        let reviewed_at = t0() - Duration::days(days_ago);
        session.grade(&RecordKey::new(user, card), &ctx, 0, reviewed_at).unwrap();
    }

    let due = session.due_cards("bob", t0(), 20).unwrap();
    let ids: Vec<_> = due.iter().map(|c| c.flashcard_id.as_str()).collect();
    assert_eq!(ids, vec!["two-days-ago", "yesterday"]);
    assert!(due.iter().all(|c| c.collection_id == "col"));

    assert_eq!(session.due_cards("bob", t0(), 1).unwrap().len(), 1);
    assert_eq!(session.reset_user("bob").unwrap(), 3);
    assert!(session.due_cards("bob", t0() + Duration::days(10), 20).unwrap().is_empty());
    assert_eq!(session.records_for_user("carol").unwrap().len(), 1);
}

#[test]
fn returned_record_matches_stored_at_sub_millisecond_time() {
    let dir = tempdir().unwrap();
    let conn = db::init_database(&dir.path().join("precision.sqlite3")).unwrap();
    let session = ReviewSession::new(conn);
    let key = RecordKey::new("dana", "ephemeral");
    let ctx = CardContext::new("col", None);
    let now = t0() + TimeDelta::nanoseconds(123_456_789);

    let returned = session.grade(&key, &ctx, 4, now).unwrap();
    let stored = session.record(&key).unwrap().unwrap();

    assert_eq!(stored, returned);
    assert_eq!(returned.last_reviewed, t0() + TimeDelta::milliseconds(123));
}
