//! Session records and the session log.
//!
//! A session starts life as the pending record held by the timer. Confirming
//! the annotation moves it into the [`SessionLog`]; skipping discards it.

mod log;
mod record;

pub use log::SessionLog;
pub use record::{duration_between, parse_tags, session_id, PendingSession, Session};
