//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` periodically.
//! Ticks only schedule work: remaining time is always recomputed from
//! `run_started_at`, so late, skipped or doubled ticks give the same result.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Idle                      (stop)
//!         Running -> AwaitingAnnotation -> Idle (expire, then confirm/skip)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let (mut engine, expired) = TimerEngine::rehydrate(SystemClock, persisted);
//! engine.start();
//! // In a loop:
//! engine.tick(); // Returns Some(Event::SessionCompleted) on expiry
//! ```

use tracing::{debug, info, warn};

use super::state::{TimerPhase, TimerState, MAX_INPUT_SECONDS};
use crate::clock::{Clock, SystemClock};
use crate::events::Event;
use crate::session::{PendingSession, Session};

/// Core timer engine.
///
/// Owns the [`TimerState`] and reads time only from the injected clock.
#[derive(Debug, Clone)]
pub struct TimerEngine<C: Clock = SystemClock> {
    clock: C,
    state: TimerState,
}

impl<C: Clock> TimerEngine<C> {
    /// Create an engine over a state that needs no reconciliation, such as
    /// fresh defaults.
    pub fn new(clock: C, mut state: TimerState) -> Self {
        state.normalize();
        Self { clock, state }
    }

    /// Rebuild the engine from a persisted snapshot.
    ///
    /// A run that was in progress is recomputed against the current clock.
    /// If it ran out while nobody was watching, the expiry is replayed once,
    /// ending at `run_started_at + planned`, and the completion event is
    /// returned.
    pub fn rehydrate(clock: C, mut state: TimerState) -> (Self, Option<Event>) {
        if state.normalize() {
            warn!("repaired inconsistent persisted timer state");
        }
        let mut engine = Self { clock, state };
        let event = if engine.state.is_running {
            engine.tick()
        } else {
            None
        };
        match &event {
            Some(Event::SessionCompleted { pending }) => info!(
                session_id = %pending.id,
                duration_seconds = pending.duration_seconds,
                "countdown expired while away"
            ),
            _ if engine.state.is_running => debug!(
                remaining_seconds = engine.state.remaining_seconds,
                "resumed running countdown"
            ),
            _ => {}
        }
        (engine, event)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn phase(&self) -> TimerPhase {
        self.state.phase()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Live remaining seconds. Computed from the clock while running.
    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_at(self.clock.now_ms())
    }

    pub fn planned_seconds(&self) -> u64 {
        self.state.planned_seconds
    }

    pub fn pending(&self) -> Option<&PendingSession> {
        self.state.pending_session.as_ref()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            remaining_seconds: self.remaining_seconds(),
            planned_seconds: self.state.planned_seconds,
            pending: self.state.pending_session.clone(),
            at: self.clock.now_ms(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.phase() {
            TimerPhase::Running => None, // Already running.
            TimerPhase::AwaitingAnnotation => {
                debug!("start ignored: session awaits annotation");
                None
            }
            TimerPhase::Idle => {
                if self.state.remaining_seconds == 0 {
                    self.state.remaining_seconds = self.state.configured_seconds();
                }
                let now = self.clock.now_ms();
                // A resumed partial run plans only what was left.
                self.state.planned_seconds = self.state.remaining_seconds;
                self.state.run_started_at = Some(now);
                self.state.is_running = true;
                Some(Event::TimerStarted {
                    planned_seconds: self.state.planned_seconds,
                    at: now,
                })
            }
        }
    }

    /// Call periodically. Returns `Some(Event::SessionCompleted)` when the
    /// countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        let remaining = self.remaining_seconds();
        if remaining > 0 {
            self.state.remaining_seconds = remaining;
            return None;
        }
        self.expire()
    }

    pub fn stop(&mut self) -> Option<Event> {
        if !self.state.is_running {
            debug!("stop ignored: timer not running");
            return None;
        }
        let remaining = self.remaining_seconds();
        if remaining == 0 {
            // The run finished before the stop arrived.
            return self.expire();
        }
        self.state.remaining_seconds = remaining;
        self.state.is_running = false;
        self.state.run_started_at = None;
        Some(Event::TimerStopped {
            remaining_seconds: remaining,
            at: self.clock.now_ms(),
        })
    }

    /// Back to the configured duration. A pending session is left for
    /// annotation.
    pub fn reset(&mut self) -> Option<Event> {
        let total = self.state.configured_seconds();
        self.state.is_running = false;
        self.state.run_started_at = None;
        self.state.planned_seconds = total;
        self.state.remaining_seconds = total;
        Some(Event::TimerReset {
            remaining_seconds: total,
            at: self.clock.now_ms(),
        })
    }

    /// Store new minute/second inputs and load them into the timer.
    ///
    /// A nonzero total starts the run immediately; setting the duration
    /// doubles as pressing start. Any run in progress is discarded without
    /// creating a session.
    pub fn apply_configured_duration(&mut self, minutes: u64, seconds: u64) -> Option<Event> {
        if self.phase() == TimerPhase::AwaitingAnnotation {
            debug!("duration change ignored: session awaits annotation");
            return None;
        }
        self.state.input_minutes = minutes;
        self.state.input_seconds = seconds.min(MAX_INPUT_SECONDS);
        let total = self.state.configured_seconds();
        self.state.is_running = false;
        self.state.run_started_at = None;
        self.state.planned_seconds = total;
        self.state.remaining_seconds = total;
        if total > 0 {
            return self.start();
        }
        Some(Event::DurationApplied {
            total_seconds: total,
            at: self.clock.now_ms(),
        })
    }

    /// Update the draft note/tags of the pending session.
    pub fn annotate_pending(&mut self, note: &str, tags_input: &str) -> Option<&PendingSession> {
        let pending = self.state.pending_session.as_mut()?;
        pending.annotate(note, tags_input);
        Some(&*pending)
    }

    /// Remove the pending session, returning the timer to idle.
    pub fn take_pending(&mut self) -> Option<PendingSession> {
        self.state.pending_session.take()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(&mut self) -> Option<Event> {
        let Some(started_at) = self.state.run_started_at else {
            self.state.is_running = false;
            return None;
        };
        if self.state.pending_session.is_some() {
            return None;
        }
        let pending = Session::expired(started_at, self.state.planned_seconds);
        self.state.is_running = false;
        self.state.run_started_at = None;
        self.state.remaining_seconds = 0;
        self.state.pending_session = Some(pending.clone());
        Some(Event::SessionCompleted { pending })
    }
}
