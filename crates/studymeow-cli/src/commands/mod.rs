pub mod cards;
pub mod config;
pub mod progress;
pub mod stats;
pub mod task;
pub mod timer;

use serde::Serialize;
use studymeow_core::{Config, Database, PersistedState, SeededSource, SessionReport, StudyEngine};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Loaded configuration, database and engine for one command invocation.
pub struct Workspace {
    pub db: Database,
    pub config: Config,
    pub engine: StudyEngine,
}

impl Workspace {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open()?;
        let state = PersistedState::load(&db, &config);
        let rng = Box::new(SeededSource::new(config.rewards.seed));
        let mut engine = StudyEngine::new(state, &config, rng);
        engine.subscribe(|event| tracing::debug!(event = event.name(), "{event:?}"));
        Ok(Self { db, config, engine })
    }

    pub fn save(&self) -> CmdResult {
        self.engine.state().save(&self.db)?;
        Ok(())
    }

    /// Append a finished session to the history table.
    pub fn record(&self, report: &SessionReport) -> CmdResult {
        let c = &report.completion;
        self.db
            .record_session(c.kind, c.task_id.as_deref(), c.elapsed_secs, chrono::Utc::now())?;
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
