mod config;
pub mod database;
pub(crate) mod lenient;
mod store;

pub use config::{AlertsConfig, Config, ReportConfig, TimerConfig};
pub use database::Database;
pub use store::{
    load_record, persist, save_record, MemoryStore, Store, SESSION_LOG_KEY, TIMER_STATE_KEY,
};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `POMOLOG_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/pomolog[-dev]/`, with the `-dev` suffix when
/// `POMOLOG_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOLOG_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOLOG_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pomolog-dev")
            } else {
                base_dir.join("pomolog")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
