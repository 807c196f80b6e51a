use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::CardInstance;
use crate::task::TaskStatus;
use crate::timer::SessionKind;

/// Every state change in the engine produces an Event.
/// The presentation layer subscribes to them through
/// [`StudyEngine::subscribe`](crate::StudyEngine::subscribe).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        kind: SessionKind,
        target_secs: u64,
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
    SessionPaused {
        kind: SessionKind,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        kind: SessionKind,
        elapsed_secs: u64,
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
    FocusDurationChanged {
        secs: u64,
        at: DateTime<Utc>,
    },
    TaskCreated {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskUpdated {
        task_id: String,
        status: TaskStatus,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        actual_minutes: u32,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    StudyRecorded {
        minutes: u32,
        xp_gained: u64,
        level: u32,
        experience: u64,
        at: DateTime<Utc>,
    },
    LeveledUp {
        old_level: u32,
        new_level: u32,
        at: DateTime<Utc>,
    },
    CardAwarded {
        card: CardInstance,
        at: DateTime<Utc>,
    },
    /// A card already in the collection was received again.
    CardDuplicated {
        card: CardInstance,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::SessionPaused { .. } => "session_paused",
            Event::SessionStopped { .. } => "session_stopped",
            Event::SessionCompleted { .. } => "session_completed",
            Event::FocusDurationChanged { .. } => "focus_duration_changed",
            Event::TaskCreated { .. } => "task_created",
            Event::TaskUpdated { .. } => "task_updated",
            Event::TaskCompleted { .. } => "task_completed",
            Event::TaskDeleted { .. } => "task_deleted",
            Event::StudyRecorded { .. } => "study_recorded",
            Event::LeveledUp { .. } => "leveled_up",
            Event::CardAwarded { .. } => "card_awarded",
            Event::CardDuplicated { .. } => "card_duplicated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::SessionStopped { at: Utc::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_stopped");
        assert_eq!(event.name(), "session_stopped");
    }
}
