//! Keyed state blobs.
//!
//! Each part of the engine state lives under its own key as plain JSON.
//! Loading never fails: a missing blob yields the default, and a blob that
//! no longer parses is logged and replaced by the default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::config::Config;
use super::database::Database;
use crate::cards::{CardCollection, Catalog};
use crate::error::Result;
use crate::progression::Progression;
use crate::task::TaskStore;
use crate::timer::SessionTimer;

pub const AUTH_KEY: &str = "auth-storage";
pub const TASK_KEY: &str = "task-storage";
pub const CARD_KEY: &str = "card-storage";
pub const TIMER_KEY: &str = "timer-session";

/// Owned cards together with the catalog they were drawn from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardStorage {
    #[serde(default)]
    pub cards: CardCollection,
    #[serde(default)]
    pub library: Catalog,
}

/// Everything the engine persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub progression: Progression,
    pub tasks: TaskStore,
    pub cards: CardStorage,
    pub timer: SessionTimer,
}

impl PersistedState {
    /// Fresh state for a first run.
    pub fn fresh(config: &Config) -> Self {
        Self {
            progression: Progression::default(),
            tasks: TaskStore::default(),
            cards: CardStorage::default(),
            timer: config.timer.session_timer(),
        }
    }

    pub fn load(db: &Database, config: &Config) -> Self {
        Self {
            progression: load_or(db, AUTH_KEY, Progression::default),
            tasks: load_or(db, TASK_KEY, TaskStore::default),
            cards: load_or(db, CARD_KEY, CardStorage::default),
            timer: load_or(db, TIMER_KEY, || config.timer.session_timer()),
        }
    }

    pub fn save(&self, db: &Database) -> Result<()> {
        save(db, AUTH_KEY, &self.progression)?;
        save(db, TASK_KEY, &self.tasks)?;
        save(db, CARD_KEY, &self.cards)?;
        save(db, TIMER_KEY, &self.timer)?;
        Ok(())
    }
}

fn load_or<T, F>(db: &Database, key: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match db.kv_get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable state blob");
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(e) => {
            tracing::warn!(key, error = %e, "state read failed, using defaults");
            fallback()
        }
    }
}

fn save<T: Serialize>(db: &Database, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    db.kv_set(key, &json)
}
