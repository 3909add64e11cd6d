//! # Pomolog Core Library
//!
//! This library provides the core logic for the Pomolog interval timer:
//! a countdown that survives restarts and a log of annotated sessions.
//! The CLI binary is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()` for progress updates
//! - **Sessions**: Pending and finalized session records plus the session log
//! - **Tracker**: Owns the engine, the log and a store; persists after
//!   every mutation
//! - **Storage**: SQLite key-value records and TOML-based configuration
//! - **Report**: Per-day totals derived from the log
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Tracker`]: Timer plus session lifecycle
//! - [`Database`]: Durable key-value store
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod report;
pub mod session;
pub mod storage;
pub mod timer;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, StoreError};
pub use events::{Event, Intent};
pub use report::{aggregate_by_label, aggregate_by_tag, DailyReport, LabelTotal};
pub use session::{parse_tags, PendingSession, Session, SessionLog};
pub use storage::{Config, Database, MemoryStore, Store};
pub use timer::{TimerEngine, TimerPhase, TimerState};
pub use tracker::{Confirm, Tracker};
