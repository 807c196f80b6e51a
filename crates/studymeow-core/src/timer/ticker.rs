//! Periodic tick source on top of `tokio::time`.
//!
//! A [`Ticker`] owns at most one background task. Arming it aborts whatever
//! was armed before, and every tick carries the [`TickToken`] it was armed
//! with so [`SessionTimer::tick_with`](super::SessionTimer::tick_with) can drop
//! anything that was already in flight when the source was retired.
//!
//! `arm` must be called from inside a tokio runtime.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::engine::TickToken;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
    token: Option<TickToken>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start delivering `token` to `tx` every `period`, first tick one period
    /// from now. Replaces any previously armed source.
    pub fn arm(&mut self, token: TickToken, period: Duration, tx: UnboundedSender<TickToken>) {
        self.disarm();
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(token).is_err() {
                    break;
                }
            }
        });
        self.handle = Some(handle);
        self.token = Some(token);
    }

    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.token = None;
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn token(&self) -> Option<TickToken> {
        self.token
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn delivers_one_token_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new();
        ticker.arm(TickToken(1), TICK_PERIOD, tx);

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(TickToken(1)));
        }
        assert!(ticker.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_stops_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new();
        ticker.arm(TickToken(1), TICK_PERIOD, tx);
        assert_eq!(rx.recv().await, Some(TickToken(1)));

        ticker.disarm();
        assert!(!ticker.is_armed());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_previous_source() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new();
        ticker.arm(TickToken(1), TICK_PERIOD, tx.clone());
        assert_eq!(rx.recv().await, Some(TickToken(1)));

        ticker.arm(TickToken(2), TICK_PERIOD, tx);
        assert_eq!(ticker.token(), Some(TickToken(2)));
        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(TickToken(2)));
        }
    }
}
