mod config;
pub mod database;
pub mod state;

pub use config::{Config, RewardsConfig, TimerConfig};
pub use database::{Database, SessionRecord};
pub use state::{CardStorage, PersistedState};

use std::path::PathBuf;

/// Returns `~/.config/studymeow[-dev]/` based on STUDYMEOW_ENV.
///
/// Set STUDYMEOW_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYMEOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studymeow-dev")
    } else {
        base_dir.join("studymeow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
