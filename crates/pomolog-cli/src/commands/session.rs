use std::io::{BufRead, Write};

use chrono::{DateTime, Local};
use clap::Subcommand;
use pomolog_core::{Confirm, Session};

use super::{format_duration, print_json, Context};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show the session awaiting annotation
    Pending,
    /// Save a draft note and tags on the pending session
    Annotate {
        #[arg(long)]
        note: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Log the pending session (defaults to its draft annotation)
    Confirm {
        #[arg(long)]
        note: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Discard the pending session
    Skip,
    /// List logged sessions, newest first
    List {
        /// Print the raw records as JSON
        #[arg(long)]
        json: bool,
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Replace the note and tags of a logged session
    Edit {
        id: String,
        #[arg(long)]
        note: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a logged session
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

/// Asks on stderr and reads a y/N answer from stdin.
struct Prompt;

impl Confirm for Prompt {
    fn confirm(&mut self, message: &str) -> bool {
        eprint!("{message} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Fill omitted fields from an existing annotation.
fn merged(session: &Session, note: Option<String>, tags: Option<String>) -> (String, String) {
    (
        note.unwrap_or_else(|| session.note.clone()),
        tags.unwrap_or_else(|| session.tags.join(", ")),
    )
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::open()?;
    match action {
        SessionAction::Pending => match ctx.tracker.pending() {
            Some(pending) => print_json(pending)?,
            None => eprintln!("no session awaiting annotation"),
        },
        SessionAction::Annotate { note, tags } => {
            let Some(pending) = ctx.tracker.pending() else {
                eprintln!("no session awaiting annotation");
                return Ok(());
            };
            let (note, tags) = merged(pending, note, tags);
            if let Some(pending) = ctx.tracker.update_pending(&note, &tags) {
                print_json(pending)?;
            }
        }
        SessionAction::Confirm { note, tags } => {
            let Some(pending) = ctx.tracker.pending() else {
                eprintln!("no session awaiting annotation");
                return Ok(());
            };
            let (note, tags) = merged(pending, note, tags);
            let event = ctx.tracker.resolve_annotation(true, &note, &tags);
            ctx.emit_or_note(event, "no session awaiting annotation")?;
        }
        SessionAction::Skip => {
            let event = ctx.tracker.resolve_annotation(false, "", "");
            ctx.emit_or_note(event, "no session awaiting annotation")?;
        }
        SessionAction::List { json, limit } => {
            let sessions = ctx.tracker.sessions();
            let shown = &sessions[..limit.unwrap_or(sessions.len()).min(sessions.len())];
            if json {
                print_json(&shown)?;
            } else if shown.is_empty() {
                println!("no sessions logged");
            } else {
                for session in shown {
                    println!("{}", list_line(session));
                }
            }
        }
        SessionAction::Edit { id, note, tags } => {
            let Some(session) = ctx.tracker.log().get(&id) else {
                eprintln!("no session with id {id}");
                return Ok(());
            };
            let (note, tags) = merged(session, note, tags);
            let event = ctx.tracker.edit_session(&id, &note, &tags);
            ctx.emit_or_note(event, "session not edited")?;
        }
        SessionAction::Delete { id, yes } => {
            if !ctx.tracker.log().contains(&id) {
                eprintln!("no session with id {id}");
                return Ok(());
            }
            let event = if yes {
                ctx.tracker.delete_session(&id, &mut |_: &str| true)
            } else {
                ctx.tracker.delete_session(&id, &mut Prompt)
            };
            ctx.emit_or_note(event, "session kept")?;
        }
    }
    Ok(())
}

fn list_line(session: &Session) -> String {
    let ended = DateTime::from_timestamp_millis(session.ended_at)
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{}  {}  {:>8}  {}",
        session.id,
        ended,
        format_duration(session.duration_seconds),
        session.label().unwrap_or("(no name)"),
    );
    if !session.tags.is_empty() {
        line.push_str(&format!("  [{}]", session.tags.join(", ")));
    }
    line
}
