//! The persisted timer record.

use serde::{Deserialize, Deserializer, Serialize};

use crate::session::PendingSession;
use crate::storage::lenient;

/// Upper bound for the seconds input.
pub const MAX_INPUT_SECONDS: u64 = 59;

/// Where the timer is in its lifecycle. Derived from [`TimerState`], never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    /// The countdown expired and the session waits for confirm or skip.
    AwaitingAnnotation,
}

/// Everything needed to rebuild the timer after a restart.
///
/// `remaining_seconds` is only meaningful while the timer is stopped. While
/// running, the true remaining time is derived from `run_started_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    #[serde(default, deserialize_with = "lenient::seconds")]
    pub planned_seconds: u64,
    #[serde(default, deserialize_with = "lenient::seconds")]
    pub remaining_seconds: u64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_running: bool,
    #[serde(default, deserialize_with = "lenient::opt_millis")]
    pub run_started_at: Option<i64>,
    #[serde(default, deserialize_with = "pending_or_none")]
    pub pending_session: Option<PendingSession>,
    #[serde(default, deserialize_with = "lenient::seconds")]
    pub input_minutes: u64,
    #[serde(default, deserialize_with = "lenient::seconds")]
    pub input_seconds: u64,
}

fn pending_or_none<'de, D>(deserializer: D) -> Result<Option<PendingSession>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

impl Default for TimerState {
    fn default() -> Self {
        Self::with_input(0, 0)
    }
}

impl TimerState {
    /// Fresh idle state for the given minute/second inputs.
    pub fn with_input(minutes: u64, seconds: u64) -> Self {
        let seconds = seconds.min(MAX_INPUT_SECONDS);
        let total = minutes.saturating_mul(60).saturating_add(seconds);
        Self {
            planned_seconds: total,
            remaining_seconds: total,
            is_running: false,
            run_started_at: None,
            pending_session: None,
            input_minutes: minutes,
            input_seconds: seconds,
        }
    }

    /// Duration selected by the minute/second inputs.
    pub fn configured_seconds(&self) -> u64 {
        self.input_minutes
            .saturating_mul(60)
            .saturating_add(self.input_seconds.min(MAX_INPUT_SECONDS))
    }

    pub fn phase(&self) -> TimerPhase {
        if self.pending_session.is_some() {
            TimerPhase::AwaitingAnnotation
        } else if self.is_running {
            TimerPhase::Running
        } else {
            TimerPhase::Idle
        }
    }

    /// Clamp inputs and repair broken invariants in a freshly loaded record.
    /// Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();
        self.input_seconds = self.input_seconds.min(MAX_INPUT_SECONDS);
        if self.is_running && self.run_started_at.is_none() {
            self.is_running = false;
        }
        if self.pending_session.is_some() {
            self.is_running = false;
        }
        if !self.is_running {
            self.run_started_at = None;
        }
        *self != before
    }

    /// Remaining whole seconds at `now_ms`.
    pub fn remaining_at(&self, now_ms: i64) -> u64 {
        match (self.is_running, self.run_started_at) {
            (true, Some(started)) => {
                let elapsed = (now_ms.saturating_sub(started).max(0) / 1000) as u64;
                self.planned_seconds.saturating_sub(elapsed)
            }
            _ => self.remaining_seconds,
        }
    }
}
