use serde::Serialize;
use studymeow_core::StudyStats;

use super::{print_json, CmdResult, Workspace};

#[derive(Serialize)]
struct StatsView {
    #[serde(flatten)]
    study: StudyStats,
    today_focus_minutes: u64,
    sessions_recorded: usize,
}

pub fn run() -> CmdResult {
    let ws = Workspace::open()?;
    let view = StatsView {
        study: ws.engine.stats(),
        today_focus_minutes: ws.db.today_focus_minutes()?,
        sessions_recorded: ws.db.sessions()?.len(),
    };
    print_json(&view)
}
