//! Session records.
//!
//! A pending session and a finalized session share one shape. The timer
//! creates the record on expiry; annotation fills in `note` and `tags`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::storage::lenient;

const ID_SUFFIX_LEN: usize = 6;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One completed interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient::millis")]
    pub started_at: i64,
    /// Epoch milliseconds, never earlier than `started_at`.
    #[serde(default, deserialize_with = "lenient::millis")]
    pub ended_at: i64,
    #[serde(default, deserialize_with = "lenient::seconds")]
    pub duration_seconds: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
}

/// A session that has expired but is not yet confirmed or skipped.
pub type PendingSession = Session;

impl Session {
    /// Build the record for a run of `planned_seconds` that began at
    /// `started_at`. The end is derived from the plan, not from when the
    /// expiry was observed.
    pub fn expired(started_at: i64, planned_seconds: u64) -> Self {
        let ended_at = started_at.saturating_add(planned_seconds as i64 * 1000);
        Self {
            id: session_id(ended_at),
            started_at,
            ended_at,
            duration_seconds: duration_between(started_at, ended_at),
            note: String::new(),
            tags: Vec::new(),
        }
    }

    /// Replace the annotation using raw user input.
    pub fn annotate(&mut self, note: &str, tags_input: &str) {
        self.note = note.trim().to_string();
        self.tags = parse_tags(tags_input);
    }

    /// Label used when grouping: the trimmed note, if any.
    pub fn label(&self) -> Option<&str> {
        let trimmed = self.note.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Whole seconds between two epoch-millisecond instants, rounded.
pub fn duration_between(started_at: i64, ended_at: i64) -> u64 {
    let ms = ended_at.saturating_sub(started_at).max(0) as u64;
    (ms + 500) / 1000
}

/// Split comma-separated tag input. Entries are trimmed, blanks dropped,
/// order and duplicates kept.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"{ended_at}-{random base36 suffix}"`. Unique enough for one user's log.
pub fn session_id(ended_at: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{ended_at}-{suffix}")
}
