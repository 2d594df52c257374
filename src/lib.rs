pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{Error, Result};
pub use models::{
    CardContext, Quality, RecordKey, ReviewSession, SchedulingRecord, SuggestedCard,
    compute_next_schedule, select_due_cards,
};
