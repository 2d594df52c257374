pub mod clock;
pub mod due_set;
pub mod quality;
pub mod review_session;
pub mod scheduling_record;
pub mod sm2;
pub mod suggested_card;

pub use clock::{Clock, FixedClock, SystemClock};
pub use due_set::{DEFAULT_DUE_LIMIT, EXPORT_DUE_LIMIT, select_due_cards};
pub use quality::Quality;
pub use review_session::ReviewSession;
pub use scheduling_record::{CardContext, RecordKey, SchedulingRecord};
pub use sm2::compute_next_schedule;
pub use suggested_card::SuggestedCard;
