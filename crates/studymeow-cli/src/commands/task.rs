//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use studymeow_core::{Difficulty, NewTask, Priority, TaskPatch, TaskStatus};

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Estimated minutes
        #[arg(long, default_value = "25")]
        minutes: u32,
        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "")]
        category: String,
        /// Due date (RFC 3339)
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
    /// List tasks
    List {
        /// Filter by status (pending, in-progress, completed, overdue)
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Tasks created today
    Today,
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        category: Option<String>,
        /// Force a status
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
    /// Mark a task in progress
    Start {
        /// Task ID
        id: String,
    },
    /// Mark a task completed without awarding experience
    Complete {
        /// Task ID
        id: String,
        /// Minutes actually spent
        #[arg(long)]
        minutes: u32,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        TaskAction::Add {
            title,
            minutes,
            difficulty,
            priority,
            category,
            due,
        } => {
            let mut spec = NewTask::new(title, minutes)
                .difficulty(difficulty)
                .priority(priority)
                .category(category);
            spec.due_date = due;
            let task = ws.engine.add_task(spec)?;
            print_json(&task)?;
        }
        TaskAction::List { status } => {
            let tasks: Vec<_> = match status {
                Some(status) => ws.engine.list_tasks_by_status(status),
                None => ws.engine.tasks().all().iter().collect(),
            };
            print_json(&tasks)?;
        }
        TaskAction::Today => {
            print_json(&ws.engine.today_tasks())?;
        }
        TaskAction::Get { id } => match ws.engine.task(&id) {
            Some(task) => print_json(task)?,
            None => return Err(format!("task not found: {id}").into()),
        },
        TaskAction::Update {
            id,
            title,
            minutes,
            difficulty,
            priority,
            category,
            status,
            due,
        } => {
            let patch = TaskPatch {
                title,
                estimated_minutes: minutes,
                difficulty,
                priority,
                category,
                status,
                due_date: due,
                ..TaskPatch::default()
            };
            let task = ws.engine.update_task(&id, patch)?;
            print_json(&task)?;
        }
        TaskAction::Start { id } => {
            let task = ws.engine.start_task(&id)?;
            print_json(&task)?;
        }
        TaskAction::Complete { id, minutes } => {
            let task = ws.engine.complete_task(&id, minutes)?;
            print_json(&task)?;
        }
        TaskAction::Delete { id } => {
            let task = ws.engine.delete_task(&id)?;
            println!("Task deleted: {}", task.id);
        }
    }

    ws.save()?;
    Ok(())
}
