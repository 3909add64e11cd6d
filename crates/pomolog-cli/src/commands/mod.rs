pub mod config;
pub mod report;
pub mod session;
pub mod timer;

use std::error::Error;

use pomolog_core::{Config, Database, Event, SystemClock, Tracker};

use crate::alerts;

/// A tracker rehydrated from the on-disk database, plus the configuration
/// it was opened with.
pub struct Context {
    pub tracker: Tracker<Database>,
    pub config: Config,
}

impl Context {
    /// Load config and rehydrate the tracker. A countdown that ran out since
    /// the last invocation is reported (and alerted) here, exactly once.
    pub fn open() -> Result<Self, Box<dyn Error>> {
        let config = Config::load()?;
        let db = Database::open()?;
        let (tracker, expired) = Tracker::open(db, SystemClock, config.initial_state());
        let ctx = Self { tracker, config };
        if let Some(event) = expired {
            ctx.emit(&event)?;
        }
        Ok(ctx)
    }

    /// Print an event and perform the side effects it requests.
    pub fn emit(&self, event: &Event) -> Result<(), Box<dyn Error>> {
        print_json(event)?;
        alerts::execute(event, &self.config.alerts);
        Ok(())
    }

    pub fn emit_or_note(&self, event: Option<Event>, note: &str) -> Result<(), Box<dyn Error>> {
        match event {
            Some(event) => self.emit(&event),
            None => {
                eprintln!("{note}");
                Ok(())
            }
        }
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_switches_to_hours() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(90), "1:30");
        assert_eq!(format_duration(3_599), "59:59");
        assert_eq!(format_duration(3_600), "1:00:00");
        assert_eq!(format_duration(3_725), "1:02:05");
    }
}
