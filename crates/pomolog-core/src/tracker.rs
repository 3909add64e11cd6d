//! The tracker: one timer, one session log, one store.
//!
//! Every mutating call updates memory first and then writes the affected
//! record(s) to the store before returning. Writes are best-effort; a
//! failed write is logged and the in-memory value stays authoritative.

use chrono::{NaiveDate, TimeZone};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::events::Event;
use crate::report::{aggregate_by_label, aggregate_by_tag, DailyReport};
use crate::session::{PendingSession, Session, SessionLog};
use crate::storage::{load_record, persist, Store, SESSION_LOG_KEY, TIMER_STATE_KEY};
use crate::timer::{TimerEngine, TimerPhase, TimerState};

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

pub struct Tracker<S: Store, C: Clock = SystemClock> {
    store: S,
    timer: TimerEngine<C>,
    log: SessionLog,
}

impl<S: Store, C: Clock> Tracker<S, C> {
    /// Rehydrate from `store`, seeding a fresh timer with `defaults` when
    /// nothing usable was saved.
    ///
    /// Returns the `SessionCompleted` event if a run expired while the
    /// process was not running. Its side effects have not been performed yet.
    pub fn open(store: S, clock: C, defaults: TimerState) -> (Self, Option<Event>) {
        let state = load_record::<TimerState>(&store, TIMER_STATE_KEY).unwrap_or(defaults);
        let log = load_record::<SessionLog>(&store, SESSION_LOG_KEY).unwrap_or_default();
        let (timer, event) = TimerEngine::rehydrate(clock, state);
        let tracker = Self { store, timer, log };
        tracker.save_timer();
        (tracker, event)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &TimerEngine<C> {
        &self.timer
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> TimerPhase {
        self.timer.phase()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.timer.remaining_seconds()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn pending(&self) -> Option<&PendingSession> {
        self.timer.pending()
    }

    pub fn sessions(&self) -> &[Session] {
        self.log.sessions()
    }

    pub fn report<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> DailyReport {
        aggregate_by_label(self.log.sessions(), day, tz)
    }

    pub fn report_by_tag<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> DailyReport {
        aggregate_by_tag(self.log.sessions(), day, tz)
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let event = self.timer.start();
        self.save_timer();
        event
    }

    pub fn stop(&mut self) -> Option<Event> {
        let event = self.timer.stop();
        self.save_timer();
        event
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.timer.reset();
        self.save_timer();
        event
    }

    pub fn tick(&mut self) -> Option<Event> {
        let event = self.timer.tick();
        self.save_timer();
        event
    }

    pub fn apply_configured_duration(&mut self, minutes: u64, seconds: u64) -> Option<Event> {
        let event = self.timer.apply_configured_duration(minutes, seconds);
        self.save_timer();
        event
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Edit the draft annotation of the pending session.
    pub fn update_pending(&mut self, note: &str, tags_input: &str) -> Option<&PendingSession> {
        if self.timer.annotate_pending(note, tags_input).is_none() {
            debug!("no pending session to annotate");
            return None;
        }
        self.save_timer();
        self.timer.pending()
    }

    /// Confirm (log) or skip (discard) the pending session.
    ///
    /// Confirming trims the note, splits `tags_input` on commas and
    /// prepends the session to the log. Both branches return the timer to
    /// idle. Without a pending session this does nothing.
    pub fn resolve_annotation(&mut self, confirm: bool, note: &str, tags_input: &str) -> Option<Event> {
        let Some(mut pending) = self.timer.take_pending() else {
            debug!("no pending session to resolve");
            return None;
        };
        let event = if confirm {
            pending.annotate(note, tags_input);
            if self.log.prepend(pending.clone()) {
                self.save_log();
            } else {
                debug!(session_id = %pending.id, "session already logged");
            }
            Event::SessionLogged { session: pending }
        } else {
            Event::SessionDiscarded { id: pending.id }
        };
        self.save_timer();
        Some(event)
    }

    /// Replace note and tags of a logged session. Unknown ids do nothing.
    pub fn edit_session(&mut self, id: &str, note: &str, tags_input: &str) -> Option<Event> {
        let Some(session) = self.log.edit(id, note, tags_input) else {
            debug!(session_id = id, "edit ignored: no such session");
            return None;
        };
        let event = Event::SessionEdited {
            session: session.clone(),
        };
        self.save_log();
        Some(event)
    }

    /// Remove a logged session after `confirmer` agrees.
    pub fn delete_session(&mut self, id: &str, confirmer: &mut impl Confirm) -> Option<Event> {
        let Some(session) = self.log.get(id) else {
            debug!(session_id = id, "delete ignored: no such session");
            return None;
        };
        let message = match session.label() {
            Some(label) => format!("Delete session \"{label}\"?"),
            None => "Delete this session?".to_string(),
        };
        if !confirmer.confirm(&message) {
            debug!(session_id = id, "delete declined");
            return None;
        }
        let removed = self.log.remove(id)?;
        self.save_log();
        Some(Event::SessionDeleted { id: removed.id })
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Write both records, e.g. before the host goes away.
    pub fn persist_all(&self) {
        self.save_timer();
        self.save_log();
    }

    fn save_timer(&self) {
        persist(&self.store, TIMER_STATE_KEY, self.timer.state());
    }

    fn save_log(&self) {
        persist(&self.store, SESSION_LOG_KEY, &self.log);
    }
}
