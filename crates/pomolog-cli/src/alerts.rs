//! Terminal rendition of the side effects the core requests.
//!
//! Every effect is best-effort; nothing here can fail a command.

use std::io::{IsTerminal, Write};

use pomolog_core::storage::AlertsConfig;
use pomolog_core::{Event, Intent};
use tracing::debug;

use crate::commands::format_duration;

/// Run each intent of `event` once, honouring the `[alerts]` switches.
pub fn execute(event: &Event, config: &AlertsConfig) {
    for &intent in event.intents() {
        if enabled(intent, config) {
            perform(intent, event);
        } else {
            debug!(?intent, "alert disabled by config");
        }
    }
}

fn enabled(intent: Intent, config: &AlertsConfig) -> bool {
    match intent {
        Intent::PrimeAlerts => true,
        Intent::PlaySound => config.sound,
        Intent::Notify => config.notification,
        Intent::FlashTitle => config.title_flash,
        Intent::Vibrate => config.vibration,
    }
}

fn perform(intent: Intent, event: &Event) {
    let mut stderr = std::io::stderr();
    let interactive = stderr.is_terminal();
    match intent {
        Intent::PrimeAlerts => debug!("terminal alerts need no priming"),
        Intent::PlaySound if interactive => {
            let _ = write!(stderr, "\x07");
        }
        Intent::Notify => {
            let _ = writeln!(stderr, "pomolog: {}", message(event));
        }
        Intent::FlashTitle if interactive => {
            let _ = write!(stderr, "\x1b]0;pomolog: {}\x07", message(event));
        }
        Intent::Vibrate => debug!("vibration is not available in a terminal"),
        _ => debug!(?intent, "skipped: stderr is not a terminal"),
    }
    let _ = stderr.flush();
}

fn message(event: &Event) -> String {
    match event {
        Event::SessionCompleted { pending } => format!(
            "session complete ({})",
            format_duration(pending.duration_seconds)
        ),
        _ => "timer update".to_string(),
    }
}
