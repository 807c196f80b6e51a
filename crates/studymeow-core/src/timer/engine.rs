//! Focus/break session timer.
//!
//! The timer is a counting state machine with no internal thread. The caller
//! delivers one `tick()` per second while the session is running; see
//! [`Ticker`](super::Ticker) for a tokio-backed tick source.
//!
//! ## State Transitions
//!
//! ```text
//! Idle ──start──> Focus(running) ──pause──> Focus(paused) ──start──> Focus(running)
//!                      │ target reached
//!                      v
//!                 Break(paused) ──start──> Break(running) ── target reached ──> Focus(paused)
//!
//! stop: any ──> Idle
//! ```
//!
//! Every `start` mints a fresh [`TickToken`]. Pausing, stopping and session
//! completion retire it, and `tick_with` drops ticks that carry anything but
//! the live token.

use serde::{Deserialize, Serialize};

/// Default focus duration (25 minutes).
pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
/// Focus durations offered to the user.
pub const FOCUS_PRESETS_SECS: [u64; 3] = [25 * 60, 45 * 60, 60 * 60];
/// Break duration after every focus session.
pub const DEFAULT_BREAK_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Focus,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Identifies one armed tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickToken(pub u64);

/// A session that just reached its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Kind of the session that finished.
    pub kind: SessionKind,
    /// Seconds counted in the finished session.
    pub elapsed_secs: u64,
    /// Task attached while it ran.
    pub task_id: Option<String>,
}

/// Read-only view for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: TimerState,
    pub kind: SessionKind,
    pub elapsed_secs: u64,
    pub target_secs: u64,
    pub remaining_secs: u64,
    pub progress: f64,
    pub is_break: bool,
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTimer {
    state: TimerState,
    kind: SessionKind,
    elapsed_secs: u64,
    target_secs: u64,
    /// Configured focus length; `stop` and break completion return to it.
    focus_secs: u64,
    break_secs: u64,
    is_break: bool,
    task_id: Option<String>,
    /// Keep running into the next session instead of pausing on completion.
    #[serde(default)]
    auto_continue: bool,
    #[serde(default)]
    live_token: Option<TickToken>,
    #[serde(default)]
    next_token: u64,
}

impl SessionTimer {
    pub fn new(focus_secs: u64, break_secs: u64) -> Self {
        let focus_secs = focus_secs.max(1);
        Self {
            state: TimerState::Idle,
            kind: SessionKind::Focus,
            elapsed_secs: 0,
            target_secs: focus_secs,
            focus_secs,
            break_secs: break_secs.max(1),
            is_break: false,
            task_id: None,
            auto_continue: false,
            live_token: None,
            next_token: 0,
        }
    }

    pub fn with_auto_continue(mut self, auto_continue: bool) -> Self {
        self.auto_continue = auto_continue;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_break(&self) -> bool {
        self.is_break
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn target_secs(&self) -> u64 {
        self.target_secs
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.target_secs.saturating_sub(self.elapsed_secs)
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self) -> f64 {
        if self.target_secs == 0 {
            return 0.0;
        }
        self.elapsed_secs as f64 / self.target_secs as f64
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Token of the armed tick source, if running.
    pub fn live_token(&self) -> Option<TickToken> {
        self.live_token
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            kind: self.kind,
            elapsed_secs: self.elapsed_secs,
            target_secs: self.target_secs,
            remaining_secs: self.remaining_secs(),
            progress: self.progress(),
            is_break: self.is_break,
            task_id: self.task_id.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Attach a task, or `None` for free study.
    pub fn attach_task(&mut self, task_id: Option<String>) {
        self.task_id = task_id;
    }

    /// Begin or resume counting. Returns the new tick token, or `None` when
    /// already running.
    pub fn start(&mut self) -> Option<TickToken> {
        if self.state == TimerState::Running {
            return None;
        }
        self.state = TimerState::Running;
        Some(self.mint_token())
    }

    /// Returns `false` when there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.state = TimerState::Paused;
        self.live_token = None;
        true
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Idle;
        self.kind = SessionKind::Focus;
        self.elapsed_secs = 0;
        self.target_secs = self.focus_secs;
        self.is_break = false;
        self.task_id = None;
        self.live_token = None;
    }

    /// Change the focus length. Applies immediately during a focus session.
    pub fn set_focus_duration(&mut self, secs: u64) {
        let secs = secs.max(1);
        self.focus_secs = secs;
        if self.kind == SessionKind::Focus {
            self.target_secs = secs;
            if self.elapsed_secs >= secs {
                self.elapsed_secs = 0;
            }
        }
    }

    pub fn set_auto_continue(&mut self, auto_continue: bool) {
        self.auto_continue = auto_continue;
    }

    /// Replace the stored session lengths. An idle timer picks up the new
    /// focus target at once; a live session keeps its target until the next
    /// transition.
    pub fn configure(&mut self, focus_secs: u64, break_secs: u64) {
        self.focus_secs = focus_secs.max(1);
        self.break_secs = break_secs.max(1);
        if self.state == TimerState::Idle && self.kind == SessionKind::Focus {
            self.target_secs = self.focus_secs;
        }
    }

    /// Advance one second. Returns the completion when the target is reached.
    pub fn tick(&mut self) -> Option<Completion> {
        if self.state != TimerState::Running {
            return None;
        }
        let next = self.elapsed_secs + 1;
        if next >= self.target_secs {
            return Some(self.complete(next));
        }
        self.elapsed_secs = next;
        None
    }

    /// Like [`tick`](Self::tick) but ignores ticks from a retired source.
    pub fn tick_with(&mut self, token: TickToken) -> Option<Completion> {
        if self.live_token != Some(token) {
            tracing::trace!(?token, live = ?self.live_token, "stale tick ignored");
            return None;
        }
        self.tick()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn mint_token(&mut self) -> TickToken {
        self.next_token = self.next_token.wrapping_add(1);
        let token = TickToken(self.next_token);
        self.live_token = Some(token);
        token
    }

    fn complete(&mut self, elapsed_secs: u64) -> Completion {
        let finished = self.kind;
        match finished {
            SessionKind::Focus => {
                self.kind = SessionKind::Break;
                self.target_secs = self.break_secs;
                self.is_break = true;
            }
            SessionKind::Break => {
                self.kind = SessionKind::Focus;
                self.target_secs = self.focus_secs;
                self.is_break = false;
            }
        }
        self.elapsed_secs = 0;
        if self.auto_continue {
            self.mint_token();
        } else {
            self.state = TimerState::Paused;
            self.live_token = None;
        }
        Completion {
            kind: finished,
            elapsed_secs,
            task_id: self.task_id.clone(),
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_SECS, DEFAULT_BREAK_SECS)
    }
}
