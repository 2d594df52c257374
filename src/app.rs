//! Command-line application state and command handlers.
//! Owns the database connection and configuration, resolves "now" and
//! drives the review session for each command.

use crate::config::Config;
use crate::database::db;
use crate::error::{Error, Result};
use crate::export::json::{
    due_report, export_due_report_to_path, export_records_to_path, import_records,
};
use crate::models::{CardContext, Clock, FixedClock, RecordKey, ReviewSession, SystemClock};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Grade a card (quality 0-5) and reschedule it
    Review {
        user: String,
        flashcard: String,
        quality: i64,
        /// Collection the card belongs to, required on its first review
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        collection_name: Option<String>,
    },
    /// List cards due for review, oldest first
    Due {
        user: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the scheduling record of one card
    Show { user: String, flashcard: String },
    /// Write due cards to a JSON report
    Export { user: String, path: PathBuf },
    /// Back up all of a user's records to JSON
    Backup { user: String, path: PathBuf },
    /// Load records from a JSON backup
    Restore { path: PathBuf },
    /// Delete one card's schedule, or all of the user's with --all
    Reset {
        user: String,
        flashcard: Option<String>,
        #[arg(long, conflicts_with = "flashcard")]
        all: bool,
    },
    /// Move the simulated date forward
    AdvanceDay {
        #[arg(default_value_t = 1)]
        days: i64,
    },
    /// Print the date used for scheduling
    Today,
}

/// Formats a timestamp as YYYY-MM-DD HH:MM
fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

pub struct App {
    config: Config,
    conn: Arc<Mutex<Connection>>,
    session: ReviewSession<Connection>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let conn = Arc::new(Mutex::new(db::init_database(&config.database.path)?));
        let session = ReviewSession::with_shared_store(Arc::clone(&conn))
            .strict_quality(config.review.strict_quality);
        Ok(Self {
            config,
            conn,
            session,
        })
    }

    /// Simulated date from the database, or the wall clock.
    fn clock(&self) -> Result<Box<dyn Clock>> {
        if self.config.clock.simulated {
            let date = self.with_conn(db::get_current_date)?;
            Ok(Box::new(FixedClock(date)))
        } else {
            Ok(Box::new(SystemClock))
        }
    }

    fn now(&self) -> Result<DateTime<Utc>> {
        Ok(self.clock()?.now())
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        f(&conn)
    }

    pub fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Review {
                user,
                flashcard,
                quality,
                collection,
                collection_name,
            } => {
                let context = CardContext {
                    original_collection_id: collection,
                    collection_name,
                };
                let key = RecordKey::new(user, flashcard);
                let record = self.session.grade(&key, &context, quality, self.now()?)?;
                println!(
                    "'{}' next due {} (interval {} days, EF {:.2}, repetitions {})",
                    record.flashcard_id,
                    format_time(record.due_date),
                    record.interval_days,
                    record.easiness_factor,
                    record.repetitions
                );
            }
            Command::Due { user, limit } => {
                let limit = limit.unwrap_or(self.config.review.default_limit);
                let due = self.session.due_cards(&user, self.now()?, limit)?;
                if due.is_empty() {
                    println!("No cards are due for review.");
                }
                for card in due {
                    println!(
                        "{}\t{}\t{}",
                        format_time(card.due_date),
                        card.collection_id,
                        card.flashcard_id
                    );
                }
            }
            Command::Show { user, flashcard } => {
                let key = RecordKey::new(user, flashcard);
                match self.session.record(&key)? {
                    Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                    None => println!("'{}' has not been reviewed yet.", key.flashcard_id),
                }
            }
            Command::Export { user, path } => {
                let due =
                    self.session
                        .due_cards(&user, self.now()?, self.config.review.export_limit)?;
                let rows = due_report(&due);
                export_due_report_to_path(&rows, &path)?;
                println!("Exported {} due cards to '{}'", rows.len(), path.display());
            }
            Command::Backup { user, path } => {
                let records = self.session.records_for_user(&user)?;
                export_records_to_path(&records, &path)?;
                println!("Backed up {} records to '{}'", records.len(), path.display());
            }
            Command::Restore { path } => {
                let records = import_records(&path)?;
                let restored = self.session.restore(&records)?;
                println!("Restored {} records from '{}'", restored, path.display());
            }
            Command::Reset {
                user,
                flashcard,
                all,
            } => {
                if all {
                    let removed = self.session.reset_user(&user)?;
                    println!("Reset {removed} records for '{user}'.");
                } else if let Some(flashcard) = flashcard {
                    self.session.reset_card(&RecordKey::new(user, flashcard.clone()))?;
                    println!("Schedule for '{flashcard}' reset.");
                } else {
                    println!("Name a flashcard or pass --all.");
                }
            }
            Command::AdvanceDay { days } => {
                let date = self.with_conn(|conn| db::advance_days(days, conn))?;
                if !self.config.clock.simulated {
                    tracing::warn!("clock.simulated is off; the advanced date is not used");
                }
                println!("Simulated date is now {}", format_time(date));
            }
            Command::Today => println!("{}", format_time(self.now()?)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn app_in(dir: &std::path::Path) -> App {
        let mut config = Config::default();
        config.database.path = dir.join("test.sqlite3");
        config.clock.simulated = true;
        App::new(config).unwrap()
    }

    #[test]
    fn test_review_then_due_with_simulated_clock() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());

        app.run(Command::Review {
            user: "u1".to_string(),
            flashcard: "c1".to_string(),
            quality: 5,
            collection: Some("col".to_string()),
            collection_name: None,
        })
        .unwrap();

        let today = app.now().unwrap();
        assert!(app.session.due_cards("u1", today, 20).unwrap().is_empty());

        app.run(Command::AdvanceDay { days: 1 }).unwrap();
        let tomorrow = app.now().unwrap();
        assert_eq!(app.session.due_cards("u1", tomorrow, 20).unwrap().len(), 1);
    }

    #[test]
    fn test_export_backup_restore() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path());
        app.run(Command::Review {
            user: "u1".to_string(),
            flashcard: "c1".to_string(),
            quality: 2,
            collection: Some("col".to_string()),
            collection_name: Some("Basics".to_string()),
        })
        .unwrap();

        // Nothing due yet
        assert!(
            app.run(Command::Export {
                user: "u1".to_string(),
                path: dir.path().join("due.json"),
            })
            .is_err()
        );

        let backup = dir.path().join("backup.json");
        app.run(Command::Backup {
            user: "u1".to_string(),
            path: backup.clone(),
        })
        .unwrap();
        app.run(Command::Reset {
            user: "u1".to_string(),
            flashcard: None,
            all: true,
        })
        .unwrap();
        assert!(app.session.records_for_user("u1").unwrap().is_empty());

        app.run(Command::Restore { path: backup }).unwrap();
        assert_eq!(app.session.records_for_user("u1").unwrap().len(), 1);
    }
}
