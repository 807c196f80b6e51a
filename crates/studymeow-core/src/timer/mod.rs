mod engine;
mod ticker;

pub use engine::{
    Completion, SessionKind, SessionSnapshot, SessionTimer, TickToken, TimerState,
    DEFAULT_BREAK_SECS, DEFAULT_FOCUS_SECS, FOCUS_PRESETS_SECS,
};
pub use ticker::{Ticker, TICK_PERIOD};
