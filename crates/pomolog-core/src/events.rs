use serde::{Deserialize, Serialize};

use crate::session::{PendingSession, Session};
use crate::timer::TimerPhase;

/// Every state change in the system produces an Event.
/// The CLI prints them; side effects are derived from them via [`Event::intents`].
///
/// Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        planned_seconds: u64,
        at: i64,
    },
    TimerStopped {
        remaining_seconds: u64,
        at: i64,
    },
    TimerReset {
        remaining_seconds: u64,
        at: i64,
    },
    /// The minute/second inputs changed.
    DurationApplied {
        total_seconds: u64,
        at: i64,
    },
    /// The countdown reached zero. Emitted exactly once per run, either by a
    /// live tick or while rehydrating.
    SessionCompleted {
        pending: PendingSession,
    },
    SessionLogged {
        session: Session,
    },
    SessionDiscarded {
        id: String,
    },
    SessionEdited {
        session: Session,
    },
    SessionDeleted {
        id: String,
    },
    StateSnapshot {
        phase: TimerPhase,
        remaining_seconds: u64,
        planned_seconds: u64,
        pending: Option<PendingSession>,
        at: i64,
    },
}

/// A side effect the core asks its host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Warm up audio/notification permissions while the user is present.
    PrimeAlerts,
    PlaySound,
    Notify,
    FlashTitle,
    Vibrate,
}

impl Intent {
    /// Side effects requested when a countdown completes, in execution order.
    pub const COMPLETION: [Intent; 4] = [
        Intent::PlaySound,
        Intent::Notify,
        Intent::FlashTitle,
        Intent::Vibrate,
    ];
}

impl Event {
    /// Side effects the host should run, once, for this event.
    pub fn intents(&self) -> &'static [Intent] {
        match self {
            Event::TimerStarted { .. } => &[Intent::PrimeAlerts],
            Event::SessionCompleted { .. } => &Intent::COMPLETION,
            _ => &[],
        }
    }
}
