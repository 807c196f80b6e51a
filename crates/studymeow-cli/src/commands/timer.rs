use clap::Subcommand;
use studymeow_core::timer::{FOCUS_PRESETS_SECS, TICK_PERIOD};
use studymeow_core::{TickToken, Ticker};
use tokio::sync::mpsc;

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the session
    Start {
        /// Task to study (free study when omitted)
        #[arg(long)]
        task: Option<String>,
    },
    /// Pause the running session
    Pause,
    /// Stop and reset to an idle focus session
    Stop,
    /// Advance the running session by whole seconds
    Tick {
        #[arg(long, default_value = "1")]
        count: u64,
    },
    /// Set the focus length in seconds and store it in the config
    Duration { secs: u64 },
    /// List the suggested focus lengths in seconds
    Presets,
    /// Print current timer state as JSON
    Status,
    /// Run the timer in the foreground until the sessions finish or Ctrl-C
    Run {
        #[arg(long)]
        task: Option<String>,
        /// Number of sessions (focus or break) to complete before exiting
        #[arg(long, default_value = "1")]
        sessions: u32,
    },
}

pub fn run(action: TimerAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        TimerAction::Start { task } => {
            ws.engine.start_session(task.as_deref())?;
            print_json(&ws.engine.session())?;
        }
        TimerAction::Pause => {
            if !ws.engine.pause_session() {
                eprintln!("timer is not running");
            }
            print_json(&ws.engine.session())?;
        }
        TimerAction::Stop => {
            ws.engine.stop_session();
            print_json(&serde_json::json!({ "type": "timer_stopped" }))?;
        }
        TimerAction::Tick { count } => {
            for _ in 0..count {
                if let Some(report) = ws.engine.tick() {
                    ws.record(&report)?;
                    print_json(&report)?;
                }
            }
            print_json(&ws.engine.session())?;
        }
        TimerAction::Duration { secs } => {
            ws.engine.set_focus_duration(secs)?;
            if !FOCUS_PRESETS_SECS.contains(&secs) {
                tracing::debug!(secs, presets = ?FOCUS_PRESETS_SECS, "custom focus length");
            }
            ws.config.timer.focus_duration_secs = secs;
            ws.config.save()?;
            print_json(&ws.engine.session())?;
        }
        TimerAction::Presets => {
            print_json(&FOCUS_PRESETS_SECS)?;
        }
        TimerAction::Status => {
            print_json(&ws.engine.session())?;
        }
        TimerAction::Run { task, sessions } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_foreground(&mut ws, task, sessions))?;
        }
    }

    ws.save()?;
    Ok(())
}

/// Begin (or pick up) the session and hand back the token ticks must carry.
fn begin(ws: &mut Workspace, task: Option<&str>) -> Result<TickToken, Box<dyn std::error::Error>> {
    if let Some(token) = ws.engine.start_session(task)? {
        return Ok(token);
    }
    ws.engine
        .timer()
        .live_token()
        .ok_or_else(|| "timer is running without a tick source".into())
}

async fn run_foreground(ws: &mut Workspace, task: Option<String>, sessions: u32) -> CmdResult {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ticker = Ticker::new();
    ticker.arm(begin(ws, task.as_deref())?, TICK_PERIOD, tx.clone());
    eprintln!("running, Ctrl-C to pause");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut finished = 0;
    loop {
        tokio::select! {
            Some(token) = rx.recv() => {
                let Some(report) = ws.engine.tick_with(token) else {
                    continue;
                };
                ws.record(&report)?;
                print_json(&report)?;
                ws.save()?;

                finished += 1;
                if finished >= sessions {
                    break;
                }
                // Without auto-continue the next session waits paused.
                let next = match ws.engine.timer().live_token() {
                    Some(token) => token,
                    None => begin(ws, None)?,
                };
                ticker.arm(next, TICK_PERIOD, tx.clone());
            }
            _ = &mut ctrl_c => {
                ws.engine.pause_session();
                eprintln!("paused");
                break;
            }
        }
    }

    ticker.disarm();
    print_json(&ws.engine.session())
}
