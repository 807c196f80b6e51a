//! # StudyMeow Core Library
//!
//! This library provides the core logic for StudyMeow, a study timer that
//! turns focused time into experience, levels and collectible cards. All
//! operations are available through the standalone `studymeow` CLI, which is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: A tick-driven focus/break state machine. The caller decides
//!   where ticks come from; [`Ticker`] is the tokio-backed source.
//! - **Progression**: Study minutes, experience and level.
//! - **Cards**: A fixed catalog, a difficulty-weighted drop table and the
//!   owned collection.
//! - **Storage**: SQLite-backed state blobs and session history, TOML
//!   configuration.
//!
//! ## Key Components
//!
//! - [`StudyEngine`]: Owns all state and emits [`Event`]s to subscribers
//! - [`SessionTimer`]: Session state machine
//! - [`Database`]: Persistence
//! - [`Config`]: Application configuration management

pub mod cards;
pub mod engine;
pub mod error;
pub mod events;
pub mod progression;
pub mod random;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use cards::{Acquisition, CardCollection, CardInstance, Catalog, Rarity, Subject, Theme};
pub use engine::{SessionReport, StudyEngine, SubscriptionId};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use progression::{Progression, StudyOutcome};
pub use random::{FixedSequence, RandomSource, SeededSource};
pub use stats::StudyStats;
pub use storage::{Config, Database, PersistedState};
pub use task::{Difficulty, NewTask, Priority, Task, TaskPatch, TaskStatus, TaskStore};
pub use timer::{SessionKind, SessionSnapshot, SessionTimer, TickToken, Ticker, TimerState};
