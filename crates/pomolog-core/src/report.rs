//! Daily totals over the session log.
//!
//! Pure functions: they read a slice of sessions and never touch storage.
//! A day is `[local midnight, local midnight + 24h)` in the supplied zone,
//! matched against each session's `ended_at`.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Label for sessions without a note.
pub const NO_NAME_LABEL: &str = "(no name)";
/// Label for sessions without tags when grouping by tag.
pub const UNTAGGED_LABEL: &str = "(untagged)";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTotal {
    pub label: String,
    pub total_seconds: u64,
    pub sessions: usize,
}

/// Grouped totals for one day, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    pub day: NaiveDate,
    pub rows: Vec<LabelTotal>,
    pub total_seconds: u64,
}

impl DailyReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Epoch-millisecond bounds of `day` in `tz`.
pub fn day_bounds<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> (i64, i64) {
    let midnight = day.and_time(NaiveTime::MIN);
    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump: fall back to the UTC reading.
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        .timestamp_millis();
    (start, start + DAY_MS)
}

/// Total duration per note label for sessions ending on `day`.
pub fn aggregate_by_label<Tz: TimeZone>(sessions: &[Session], day: NaiveDate, tz: &Tz) -> DailyReport {
    aggregate(sessions, day, tz, |session| {
        vec![session.label().unwrap_or(NO_NAME_LABEL).to_string()]
    })
}

/// Total duration per tag for sessions ending on `day`. A session counts
/// once toward each distinct tag it carries; the grand total counts it once.
pub fn aggregate_by_tag<Tz: TimeZone>(sessions: &[Session], day: NaiveDate, tz: &Tz) -> DailyReport {
    aggregate(sessions, day, tz, |session| {
        let mut tags: Vec<String> = Vec::new();
        for tag in &session.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        if tags.is_empty() {
            tags.push(UNTAGGED_LABEL.to_string());
        }
        tags
    })
}

fn aggregate<Tz, F>(sessions: &[Session], day: NaiveDate, tz: &Tz, labels: F) -> DailyReport
where
    Tz: TimeZone,
    F: Fn(&Session) -> Vec<String>,
{
    let (start, end) = day_bounds(day, tz);
    let mut rows: Vec<LabelTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total_seconds = 0;

    for session in sessions
        .iter()
        .filter(|s| s.ended_at >= start && s.ended_at < end)
    {
        total_seconds += session.duration_seconds;
        for label in labels(session) {
            let slot = *index.entry(label.clone()).or_insert_with(|| {
                rows.push(LabelTotal {
                    label,
                    total_seconds: 0,
                    sessions: 0,
                });
                rows.len() - 1
            });
            rows[slot].total_seconds += session.duration_seconds;
            rows[slot].sessions += 1;
        }
    }

    // Stable: equal totals keep first-seen order.
    rows.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));

    DailyReport {
        day,
        rows,
        total_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn at(hour: u32) -> i64 {
        day().and_hms_opt(hour, 0, 0).unwrap().and_utc().timestamp_millis()
    }

    fn session(id: &str, note: &str, tags: &[&str], ended_at: i64, secs: u64) -> Session {
        Session {
            id: id.to_string(),
            started_at: ended_at - secs as i64 * 1000,
            ended_at,
            duration_seconds: secs,
            note: note.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn groups_by_note_and_sorts_descending() {
        let sessions = vec![
            session("1", "", &[], at(9), 30),
            session("2", "focus", &[], at(10), 90),
        ];
        let report = aggregate_by_label(&sessions, day(), &Utc);
        let rows: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.label.as_str(), r.total_seconds))
            .collect();
        assert_eq!(rows, vec![("focus", 90), (NO_NAME_LABEL, 30)]);
        assert_eq!(report.total_seconds, 120);
    }

    #[test]
    fn trims_notes_and_merges_equal_labels() {
        let sessions = vec![
            session("1", " write ", &[], at(9), 60),
            session("2", "write", &[], at(11), 60),
            session("3", "   ", &[], at(12), 10),
        ];
        let report = aggregate_by_label(&sessions, day(), &Utc);
        assert_eq!(report.rows[0].label, "write");
        assert_eq!(report.rows[0].total_seconds, 120);
        assert_eq!(report.rows[0].sessions, 2);
        assert_eq!(report.rows[1].label, NO_NAME_LABEL);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let sessions = vec![
            session("1", "b", &[], at(9), 60),
            session("2", "a", &[], at(10), 60),
            session("3", "c", &[], at(11), 60),
        ];
        let report = aggregate_by_label(&sessions, day(), &Utc);
        let labels: Vec<_> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn filters_to_half_open_day_window() {
        let (start, end) = day_bounds(day(), &Utc);
        let sessions = vec![
            session("1", "before", &[], start - 1, 10),
            session("2", "first", &[], start, 10),
            session("3", "last", &[], end - 1, 10),
            session("4", "after", &[], end, 10),
        ];
        let report = aggregate_by_label(&sessions, day(), &Utc);
        let labels: Vec<_> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "last"]);
    }

    #[test]
    fn day_follows_time_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let (start, end) = day_bounds(day(), &tokyo);
        assert_eq!(start, at(0) - 9 * 3_600_000);
        assert_eq!(end - start, DAY_MS);

        // 20:00 UTC on the 14th is already the 15th in Tokyo
        let sessions = vec![session("1", "late", &[], at(20), 60)];
        assert!(aggregate_by_label(&sessions, day(), &tokyo).is_empty());
        assert!(!aggregate_by_label(&sessions, day(), &Utc).is_empty());
    }

    #[test]
    fn empty_log_is_empty_report() {
        let report = aggregate_by_label(&[], day(), &Utc);
        assert!(report.is_empty());
        assert_eq!(report.total_seconds, 0);
        assert_eq!(report.day, day());
    }

    #[test]
    fn by_tag_counts_each_distinct_tag() {
        let sessions = vec![
            session("1", "", &["work", "writing", "work"], at(9), 60),
            session("2", "", &["work"], at(10), 30),
            session("3", "", &[], at(11), 15),
        ];
        let report = aggregate_by_tag(&sessions, day(), &Utc);
        let rows: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.label.as_str(), r.total_seconds))
            .collect();
        assert_eq!(rows, vec![("work", 90), ("writing", 60), (UNTAGGED_LABEL, 15)]);
        assert_eq!(report.total_seconds, 105);
    }
}
