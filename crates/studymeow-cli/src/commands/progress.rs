use clap::Subcommand;
use serde::Serialize;
use studymeow_core::Progression;

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show level, experience and study totals
    Show,
    /// Record study minutes outside a timed session
    Study { minutes: u32 },
    /// Start a fresh progression record
    Register {
        username: String,
        #[arg(long, default_value = "")]
        email: String,
    },
}

#[derive(Serialize)]
struct ProgressView<'a> {
    #[serde(flatten)]
    progression: &'a Progression,
    required_xp: u64,
    experience_progress_pct: u32,
}

impl<'a> ProgressView<'a> {
    fn new(progression: &'a Progression) -> Self {
        Self {
            progression,
            required_xp: progression.required_xp(),
            experience_progress_pct: progression.experience_progress_pct(),
        }
    }
}

pub fn run(action: ProgressAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        ProgressAction::Show => {
            print_json(&ProgressView::new(ws.engine.progression()))?;
        }
        ProgressAction::Study { minutes } => {
            let outcome = ws.engine.apply_study_minutes(minutes)?;
            print_json(&outcome)?;
        }
        ProgressAction::Register { username, email } => {
            let progression = ws.engine.register(&username, &email)?;
            print_json(&ProgressView::new(progression))?;
        }
    }

    ws.save()?;
    Ok(())
}
