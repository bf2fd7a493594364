//! Per-seat turn countdowns.
//!
//! A countdown owns a small tick task that only ever writes to its own watch
//! channel, so readers can follow it without touching the board mirror.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, interval_at},
};

/// Wall-clock source in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Wall clock that advances with tokio's clock, so it follows paused and
/// advanced time in tests.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    base_ms: i64,
    anchor: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn starting_at(base_ms: i64) -> Self {
        Self {
            base_ms,
            anchor: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.base_ms.saturating_add(elapsed)
    }
}

/// Whole seconds left until `expire_at`, or `None` once it has passed.
pub fn remaining_secs(expire_at: i64, now: i64) -> Option<u64> {
    if now >= expire_at {
        return None;
    }
    u64::try_from((expire_at - now) / 1000).ok()
}

/// A ticking display of the seconds left in a turn.
pub struct Countdown {
    clock: Arc<dyn Clock>,
    tick: Duration,
    expire_at: Option<i64>,
    display: Arc<watch::Sender<Option<u64>>>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new(clock: Arc<dyn Clock>, tick: Duration) -> Self {
        let (display, _) = watch::channel(None);
        Self {
            clock,
            tick,
            expire_at: None,
            display: Arc::new(display),
            task: None,
        }
    }

    /// Start counting down to `expire_at`. Does nothing while already
    /// running; an expiry already in the past shows nothing.
    pub fn start(&mut self, expire_at: i64) {
        if self.is_running() {
            return;
        }
        self.task = None;

        let Some(first) = remaining_secs(expire_at, self.clock.now_ms()) else {
            self.expire_at = None;
            self.display.send_replace(None);
            return;
        };
        self.expire_at = Some(expire_at);
        self.display.send_replace(Some(first));

        let display = Arc::clone(&self.display);
        let clock = Arc::clone(&self.clock);
        let tick = self.tick;
        self.task = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + tick, tick);
            loop {
                ticks.tick().await;
                match remaining_secs(expire_at, clock.now_ms()) {
                    Some(secs) => {
                        display.send_replace(Some(secs));
                    }
                    None => {
                        display.send_replace(None);
                        break;
                    }
                }
            }
        }));
    }

    /// Stop ticking and hide the display.
    pub fn clear(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.expire_at = None;
        self.display.send_replace(None);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Seconds currently displayed.
    pub fn remaining(&self) -> Option<u64> {
        *self.display.borrow()
    }

    /// Expiry of the most recent start, cleared on [`Countdown::clear`].
    pub fn expire_at(&self) -> Option<i64> {
        self.expire_at
    }

    /// Follow the displayed value.
    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.display.subscribe()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Countdown")
            .field("expire_at", &self.expire_at)
            .field("remaining", &self.remaining())
            .finish()
    }
}
