pub mod scheduler;
pub mod selector;
pub mod session;

pub use scheduler::{add_days, record_review, EASY_BONUS, GOOD_DAMPING};
pub use selector::{due_count, next_review_time, select_due, select_due_with};
pub use session::{ReviewSession, SessionState};
