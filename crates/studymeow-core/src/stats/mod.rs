//! Study statistics.
//!
//! Read-only figures derived from the progression record, the task list and
//! the card collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::CollectionProgress;
use crate::progression::Progression;
use crate::task::{TaskStatus, TaskStore};

/// Upper bound for the simplified streak figure.
pub const MAX_STREAK_DAYS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub pending_tasks: usize,
    /// Rounded percent of tasks completed.
    pub completion_rate: u32,
    pub total_study_minutes: u64,
    pub days_since_join: i64,
    pub average_daily_minutes: u64,
    /// One day per hour studied, capped at [`MAX_STREAK_DAYS`].
    pub streak_days: u64,
    pub level: u32,
    pub experience: u64,
    pub required_xp: u64,
    pub experience_progress_pct: u32,
    pub card_count: u32,
    pub collection: CollectionProgress,
}

pub fn compute(
    progression: &Progression,
    tasks: &TaskStore,
    collection: CollectionProgress,
    now: DateTime<Utc>,
) -> StudyStats {
    let total_tasks = tasks.len();
    let completed_tasks = tasks.by_status(TaskStatus::Completed).len();
    let completion_rate = if total_tasks > 0 {
        (completed_tasks as f64 / total_tasks as f64 * 100.0).round() as u32
    } else {
        0
    };

    let days_since_join = (now - progression.joined_at).num_days().max(1);
    let average_daily_minutes = progression.total_study_minutes / days_since_join as u64;
    let streak_days = (progression.total_study_minutes / 60).min(MAX_STREAK_DAYS);

    StudyStats {
        total_tasks,
        completed_tasks,
        in_progress_tasks: tasks.by_status(TaskStatus::InProgress).len(),
        pending_tasks: tasks.by_status(TaskStatus::Pending).len(),
        completion_rate,
        total_study_minutes: progression.total_study_minutes,
        days_since_join,
        average_daily_minutes,
        streak_days,
        level: progression.level,
        experience: progression.experience,
        required_xp: progression.required_xp(),
        experience_progress_pct: progression.experience_progress_pct(),
        card_count: progression.card_count,
        collection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCollection, Catalog};
    use crate::task::NewTask;
    use chrono::Duration;

    #[test]
    fn empty_state_has_zero_rates() {
        let progression = Progression::default();
        let tasks = TaskStore::new();
        let progress = CardCollection::new().progress(&Catalog::standard());
        let stats = compute(&progression, &tasks, progress, Utc::now());
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.days_since_join, 1);
        assert_eq!(stats.average_daily_minutes, 0);
        assert_eq!(stats.collection.total, 8);
    }

    #[test]
    fn rates_and_averages() {
        let mut progression = Progression::default();
        progression.joined_at = Utc::now() - Duration::days(10);
        progression.total_study_minutes = 1200;

        let mut tasks = TaskStore::new();
        let a = tasks.add(NewTask::new("A", 10)).unwrap().id.clone();
        let b = tasks.add(NewTask::new("B", 10)).unwrap().id.clone();
        tasks.add(NewTask::new("C", 10)).unwrap();
        tasks.complete(&a, 10).unwrap();
        tasks.start(&b).unwrap();

        let progress = CardCollection::new().progress(&Catalog::standard());
        let stats = compute(&progression, &tasks, progress, Utc::now());
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.completion_rate, 33);
        assert_eq!(stats.days_since_join, 10);
        assert_eq!(stats.average_daily_minutes, 120);
        assert_eq!(stats.streak_days, 20);
    }

    #[test]
    fn streak_is_capped() {
        let mut progression = Progression::default();
        progression.total_study_minutes = 60 * 100;
        let progress = CardCollection::new().progress(&Catalog::standard());
        let stats = compute(&progression, &TaskStore::new(), progress, Utc::now());
        assert_eq!(stats.streak_days, MAX_STREAK_DAYS);
    }
}
