use std::io::Write;
use std::time::Duration;

use clap::Subcommand;

use super::{format_duration, print_json, Context};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Stop the countdown, keeping the remaining time
    Stop,
    /// Return to the configured duration
    Reset,
    /// Set the duration; a nonzero duration starts immediately
    Set {
        /// Minutes
        minutes: u64,
        /// Seconds (0-59)
        #[arg(default_value = "0")]
        seconds: u64,
    },
    /// Print current timer state as JSON
    Status,
    /// Follow the running countdown until it ends or is stopped
    Watch,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::open()?;
    match action {
        TimerAction::Start => {
            let event = ctx.tracker.start();
            ctx.emit_or_note(event, "timer is already running or awaiting annotation")?;
        }
        TimerAction::Stop => {
            let event = ctx.tracker.stop();
            ctx.emit_or_note(event, "timer is not running")?;
        }
        TimerAction::Reset => {
            let event = ctx.tracker.reset();
            ctx.emit_or_note(event, "timer is awaiting annotation")?;
        }
        TimerAction::Set { minutes, seconds } => {
            let event = ctx.tracker.apply_configured_duration(minutes, seconds);
            ctx.emit_or_note(event, "resolve the pending session before changing the duration")?;
        }
        TimerAction::Status => {
            if let Some(event) = ctx.tracker.tick() {
                ctx.emit(&event)?;
            }
            print_json(&ctx.tracker.timer().snapshot())?;
        }
        TimerAction::Watch => watch(&mut ctx)?,
    }
    Ok(())
}

fn watch(ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut stderr = std::io::stderr();
    while ctx.tracker.is_running() {
        if let Some(event) = ctx.tracker.tick() {
            let _ = writeln!(stderr);
            ctx.emit(&event)?;
            return Ok(());
        }
        let _ = write!(stderr, "\r{:>8}", format_duration(ctx.tracker.remaining_seconds()));
        let _ = stderr.flush();
        std::thread::sleep(Duration::from_secs(1));
    }
    print_json(&ctx.tracker.timer().snapshot())?;
    Ok(())
}
