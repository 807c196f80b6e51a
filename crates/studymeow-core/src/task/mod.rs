//! Task records and their lifecycle.
//!
//! ```text
//! PENDING ──start──> IN-PROGRESS ──complete──> COMPLETED
//!                    (OVERDUE is only ever set from outside)
//! ```
//!
//! Transitions are not validated. `update` may force any status, and
//! `start`/`complete` apply from whatever state the task is in.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "overdue" => Ok(TaskStatus::Overdue),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Drives the card-drop odds when a task is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Estimated duration in minutes, always > 0.
    pub estimated_minutes: u32,
    pub difficulty: Difficulty,
    pub priority: Priority,
    pub category: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Minutes actually spent, stamped on completion.
    #[serde(default)]
    pub actual_minutes: Option<u32>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn estimated_secs(&self) -> u64 {
        u64::from(self.estimated_minutes) * 60
    }
}

/// User input for a new task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, estimated_minutes: u32) -> Self {
        Self {
            title: title.into(),
            estimated_minutes,
            difficulty: Difficulty::default(),
            priority: Priority::default(),
            category: String::new(),
            due_date: None,
        }
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Field-by-field patch. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub estimated_minutes: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub actual_minutes: Option<u32>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(minutes) = self.estimated_minutes {
            task.estimated_minutes = minutes;
        }
        if let Some(difficulty) = self.difficulty {
            task.difficulty = difficulty;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due) = self.due_date {
            task.due_date = Some(due);
        }
        if let Some(actual) = self.actual_minutes {
            task.actual_minutes = Some(actual);
        }
        if let Some(at) = self.completed_at {
            task.completed_at = Some(at);
        }
    }
}

/// Ordered list of the user's tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))
    }

    /// Create a task in the pending state.
    pub fn add(&mut self, spec: NewTask) -> Result<&Task> {
        if spec.estimated_minutes == 0 {
            return Err(ValidationError::invalid("estimated_minutes", "must be greater than 0").into());
        }
        if spec.title.trim().is_empty() {
            return Err(ValidationError::invalid("title", "must not be empty").into());
        }
        let now = Utc::now();
        self.tasks.push(Task {
            id: format!("task-{}-{}", now.timestamp(), uuid::Uuid::new_v4().simple()),
            title: spec.title,
            estimated_minutes: spec.estimated_minutes,
            difficulty: spec.difficulty,
            priority: spec.priority,
            category: spec.category,
            status: TaskStatus::Pending,
            created_at: now,
            due_date: spec.due_date,
            actual_minutes: None,
            completed_at: None,
        });
        let task = &self.tasks[self.tasks.len() - 1];
        tracing::debug!(task_id = %task.id, title = %task.title, "task created");
        Ok(task)
    }

    /// Apply an arbitrary patch, status included.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<&Task> {
        let task = self.get_mut(id)?;
        patch.apply(task);
        Ok(task)
    }

    pub fn start(&mut self, id: &str) -> Result<&Task> {
        let task = self.get_mut(id)?;
        task.status = TaskStatus::InProgress;
        tracing::debug!(task_id = %id, "task started");
        Ok(task)
    }

    pub fn complete(&mut self, id: &str, actual_minutes: u32) -> Result<&Task> {
        let task = self.get_mut(id)?;
        task.status = TaskStatus::Completed;
        task.actual_minutes = Some(actual_minutes);
        task.completed_at = Some(Utc::now());
        tracing::debug!(task_id = %id, actual_minutes, "task completed");
        Ok(task)
    }

    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;
        Ok(self.tasks.remove(index))
    }

    pub fn by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Tasks created on the current local calendar day.
    pub fn today(&self) -> Vec<&Task> {
        self.created_on(Local::now().date_naive())
    }

    pub fn created_on(&self, day: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.created_at.with_timezone(&Local).date_naive() == day)
            .collect()
    }
}
