//! Application root.
//!
//! [`StudyEngine`] owns the whole state tree and is the only place that
//! coordinates the timer, the task list, the progression record and the card
//! collection. Each public method is one read-modify-write; the events it
//! produces are delivered to subscribers after the state change is complete.
//!
//! This is also the validating layer: the models underneath assume
//! well-formed input, so zero minutes, zero durations and unknown ids are
//! rejected here.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cards::{
    clamp_ratio, Acquisition, CardCollection, CardInstance, Catalog, CollectionProgress,
    DropEngine, Rarity, Subject, Theme,
};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::progression::{Progression, StudyOutcome};
use crate::random::{RandomSource, SeededSource};
use crate::stats::{self, StudyStats};
use crate::storage::{CardStorage, Config, PersistedState};
use crate::task::{Difficulty, NewTask, Task, TaskPatch, TaskStatus, TaskStore};
use crate::timer::{Completion, SessionKind, SessionSnapshot, SessionTimer, TickToken, TimerState};

pub type Subscriber = Box<dyn FnMut(&Event) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Everything that followed from one finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub completion: Completion,
    /// The task, after it was marked completed.
    pub task: Option<Task>,
    pub study: Option<StudyOutcome>,
    pub reward: Option<Acquisition>,
}

pub struct StudyEngine {
    progression: Progression,
    tasks: TaskStore,
    collection: CardCollection,
    catalog: Catalog,
    timer: SessionTimer,
    drops: DropEngine,
    rng: Box<dyn RandomSource>,
    completion_threshold: f64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl StudyEngine {
    pub fn new(state: PersistedState, config: &Config, rng: Box<dyn RandomSource>) -> Self {
        let mut timer = state.timer;
        timer.configure(config.timer.focus_duration_secs, config.timer.break_duration_secs);
        timer.set_auto_continue(config.timer.auto_continue);
        Self {
            progression: state.progression,
            tasks: state.tasks,
            collection: state.cards.cards,
            catalog: state.cards.library,
            timer,
            drops: DropEngine::default(),
            rng,
            completion_threshold: config.timer.completion_threshold,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Fresh state, randomness seeded from `rewards.seed` when set.
    pub fn from_config(config: &Config) -> Self {
        let rng = Box::new(SeededSource::new(config.rewards.seed));
        Self::new(PersistedState::fresh(config), config, rng)
    }

    /// Copy of everything that should be persisted.
    pub fn state(&self) -> PersistedState {
        PersistedState {
            progression: self.progression.clone(),
            tasks: self.tasks.clone(),
            cards: CardStorage {
                cards: self.collection.clone(),
                library: self.catalog.clone(),
            },
            timer: self.timer.clone(),
        }
    }

    // ── Subscribers ──────────────────────────────────────────────────

    pub fn subscribe(&mut self, subscriber: impl FnMut(&Event) + Send + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn emit(&mut self, events: Vec<Event>) {
        for event in &events {
            tracing::trace!(event = event.name(), "emit");
            for (_, subscriber) in self.subscribers.iter_mut() {
                subscriber(event);
            }
        }
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn session(&self) -> SessionSnapshot {
        self.timer.snapshot()
    }

    /// Start or resume the session, optionally against a task.
    ///
    /// From idle, `task_id` selects the task (`None` for free study). From
    /// paused, a given `task_id` replaces the attached one and `None` keeps
    /// it. Returns the new tick token, or `None` if already running.
    pub fn start_session(&mut self, task_id: Option<&str>) -> Result<Option<TickToken>> {
        if let Some(id) = task_id {
            if self.tasks.get(id).is_none() {
                return Err(CoreError::TaskNotFound(id.to_string()));
            }
        }
        if self.timer.is_running() {
            return Ok(None);
        }

        match (self.timer.state(), task_id) {
            (TimerState::Idle, id) => self.timer.attach_task(id.map(str::to_string)),
            (_, Some(id)) => self.timer.attach_task(Some(id.to_string())),
            (_, None) => {}
        }
        let token = self.timer.start();

        let mut events = Vec::new();
        let now = Utc::now();
        if let Some(id) = self.timer.task_id().map(str::to_string) {
            let pending = self
                .tasks
                .get(&id)
                .is_some_and(|t| t.status == TaskStatus::Pending);
            if pending {
                self.tasks.start(&id)?;
                events.push(Event::TaskUpdated {
                    task_id: id,
                    status: TaskStatus::InProgress,
                    at: now,
                });
            }
        }
        tracing::info!(
            kind = ?self.timer.kind(),
            target_secs = self.timer.target_secs(),
            task = self.timer.task_id().unwrap_or("free study"),
            "session started"
        );
        events.insert(
            0,
            Event::SessionStarted {
                kind: self.timer.kind(),
                target_secs: self.timer.target_secs(),
                task_id: self.timer.task_id().map(str::to_string),
                at: now,
            },
        );
        self.emit(events);
        Ok(token)
    }

    /// Returns `false` (and emits nothing) when not running.
    pub fn pause_session(&mut self) -> bool {
        if !self.timer.pause() {
            return false;
        }
        tracing::info!(elapsed_secs = self.timer.elapsed_secs(), "session paused");
        self.emit(vec![Event::SessionPaused {
            kind: self.timer.kind(),
            elapsed_secs: self.timer.elapsed_secs(),
            at: Utc::now(),
        }]);
        true
    }

    pub fn stop_session(&mut self) {
        self.timer.stop();
        tracing::info!("session stopped");
        self.emit(vec![Event::SessionStopped { at: Utc::now() }]);
    }

    pub fn set_focus_duration(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(ValidationError::invalid("focus_duration_secs", "must be greater than 0").into());
        }
        self.timer.set_focus_duration(secs);
        self.emit(vec![Event::FocusDurationChanged {
            secs,
            at: Utc::now(),
        }]);
        Ok(())
    }

    /// Advance the running session by one second.
    pub fn tick(&mut self) -> Option<SessionReport> {
        let completion = self.timer.tick()?;
        Some(self.finish_session(completion))
    }

    /// Tick from a specific source; stale tokens are ignored.
    pub fn tick_with(&mut self, token: TickToken) -> Option<SessionReport> {
        let completion = self.timer.tick_with(token)?;
        Some(self.finish_session(completion))
    }

    fn finish_session(&mut self, completion: Completion) -> SessionReport {
        let now = Utc::now();
        tracing::info!(kind = ?completion.kind, elapsed_secs = completion.elapsed_secs, "session complete");
        let mut events = vec![Event::SessionCompleted {
            kind: completion.kind,
            elapsed_secs: completion.elapsed_secs,
            task_id: completion.task_id.clone(),
            at: now,
        }];
        let mut report = SessionReport {
            completion: completion.clone(),
            task: None,
            study: None,
            reward: None,
        };

        let task = match (&completion.kind, &completion.task_id) {
            (SessionKind::Focus, Some(id)) => self.tasks.get(id).cloned(),
            _ => None,
        };
        if let Some(task) = task {
            let estimated_secs = task.estimated_secs();
            let required = self.completion_threshold * estimated_secs as f64;
            if completion.elapsed_secs as f64 >= required {
                let minutes = completion.elapsed_secs.div_ceil(60) as u32;
                let ratio = clamp_ratio(completion.elapsed_secs as f64 / estimated_secs as f64);

                match self.tasks.complete(&task.id, minutes) {
                    Ok(done) => {
                        report.task = Some(done.clone());
                        events.push(Event::TaskCompleted {
                            task_id: task.id.clone(),
                            actual_minutes: minutes,
                            at: now,
                        });
                        report.study = Some(self.record_study(minutes, &mut events));
                        report.reward = self.draw_card(task.difficulty, ratio, &mut events);
                    }
                    Err(e) => {
                        tracing::warn!(task_id = %task.id, error = %e, "task vanished before completion");
                    }
                }

                // The finished task no longer accrues time.
                self.timer.attach_task(None);
            } else {
                tracing::debug!(
                    task_id = %task.id,
                    elapsed_secs = completion.elapsed_secs,
                    required_secs = required,
                    "focus session too short to complete task"
                );
            }
        }

        self.emit(events);
        report
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn add_task(&mut self, spec: NewTask) -> Result<Task> {
        let task = self.tasks.add(spec)?.clone();
        self.emit(vec![Event::TaskCreated {
            task_id: task.id.clone(),
            at: Utc::now(),
        }]);
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        if patch.estimated_minutes == Some(0) {
            return Err(ValidationError::invalid("estimated_minutes", "must be greater than 0").into());
        }
        let task = self.tasks.update(id, patch)?.clone();
        self.emit(vec![Event::TaskUpdated {
            task_id: task.id.clone(),
            status: task.status,
            at: Utc::now(),
        }]);
        Ok(task)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.delete(id)?;
        if self.timer.task_id() == Some(id) {
            self.timer.attach_task(None);
        }
        self.emit(vec![Event::TaskDeleted {
            task_id: task.id.clone(),
            at: Utc::now(),
        }]);
        Ok(task)
    }

    pub fn start_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.start(id)?.clone();
        self.emit(vec![Event::TaskUpdated {
            task_id: task.id.clone(),
            status: task.status,
            at: Utc::now(),
        }]);
        Ok(task)
    }

    /// Mark a task completed. Does not award experience.
    pub fn complete_task(&mut self, id: &str, actual_minutes: u32) -> Result<Task> {
        if actual_minutes == 0 {
            return Err(ValidationError::invalid("actual_minutes", "must be greater than 0").into());
        }
        let task = self.tasks.complete(id, actual_minutes)?.clone();
        self.emit(vec![Event::TaskCompleted {
            task_id: task.id.clone(),
            actual_minutes,
            at: Utc::now(),
        }]);
        Ok(task)
    }

    pub fn list_tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.by_status(status)
    }

    pub fn today_tasks(&self) -> Vec<&Task> {
        self.tasks.today()
    }

    // ── Progression ──────────────────────────────────────────────────

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Replace the progression record with a fresh one.
    pub fn register(&mut self, username: &str, email: &str) -> Result<&Progression> {
        if username.trim().is_empty() {
            return Err(ValidationError::invalid("username", "must not be empty").into());
        }
        self.progression = Progression::register(username, email);
        Ok(&self.progression)
    }

    pub fn apply_study_minutes(&mut self, minutes: u32) -> Result<StudyOutcome> {
        if minutes == 0 {
            return Err(ValidationError::invalid("minutes", "must be greater than 0").into());
        }
        let mut events = Vec::new();
        let outcome = self.record_study(minutes, &mut events);
        self.emit(events);
        Ok(outcome)
    }

    fn record_study(&mut self, minutes: u32, events: &mut Vec<Event>) -> StudyOutcome {
        let outcome = self.progression.apply_study_minutes(minutes);
        let now = Utc::now();
        events.push(Event::StudyRecorded {
            minutes,
            xp_gained: outcome.xp_gained,
            level: self.progression.level,
            experience: self.progression.experience,
            at: now,
        });
        if outcome.leveled_up {
            tracing::info!(from = outcome.old_level, to = outcome.new_level, "level up");
            events.push(Event::LeveledUp {
                old_level: outcome.old_level,
                new_level: outcome.new_level,
                at: now,
            });
        }
        outcome
    }

    // ── Cards ────────────────────────────────────────────────────────

    /// Roll for a reward and reconcile it against the collection.
    pub fn roll_for_card(&mut self, difficulty: Difficulty, completion_ratio: f64) -> Option<Acquisition> {
        let mut events = Vec::new();
        let acquisition = self.draw_card(difficulty, completion_ratio, &mut events);
        self.emit(events);
        acquisition
    }

    fn draw_card(
        &mut self,
        difficulty: Difficulty,
        completion_ratio: f64,
        events: &mut Vec<Event>,
    ) -> Option<Acquisition> {
        let card = self
            .drops
            .roll(&self.catalog, self.rng.as_mut(), difficulty, completion_ratio)?;
        self.progression.add_cards(1);
        let acquisition = self.collection.acquire(card);
        let at = Utc::now();
        events.push(match &acquisition {
            Acquisition::Added { card } => Event::CardAwarded {
                card: card.clone(),
                at,
            },
            Acquisition::Duplicate { existing } => Event::CardDuplicated {
                card: existing.clone(),
                at,
            },
        });
        Some(acquisition)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn collection(&self) -> &CardCollection {
        &self.collection
    }

    pub fn collection_progress(&self) -> CollectionProgress {
        self.collection.progress(&self.catalog)
    }

    pub fn cards_by_rarity(&self, rarity: Rarity) -> Vec<&CardInstance> {
        self.collection.by_rarity(rarity)
    }

    pub fn cards_by_theme(&self, theme: Theme) -> Vec<&CardInstance> {
        self.collection.by_theme(theme)
    }

    pub fn cards_by_subject(&self, subject: Subject) -> Vec<&CardInstance> {
        self.collection.by_subject(subject)
    }

    pub fn remove_card(&mut self, id: &str) -> Result<CardInstance> {
        self.collection.remove(id)
    }

    pub fn mark_card_duplicated(&mut self, id: &str) -> Result<CardInstance> {
        self.collection.mark_duplicated(id).cloned()
    }

    // ── Statistics ───────────────────────────────────────────────────

    pub fn stats(&self) -> StudyStats {
        stats::compute(
            &self.progression,
            &self.tasks,
            self.collection_progress(),
            Utc::now(),
        )
    }
}
