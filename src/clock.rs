//! Tick scheduling
//!
//! The game drives its own cadence through the [`Scheduler`] trait. In the
//! terminal the cadence travels over a watch channel: the game holds a
//! [`ClockControl`], the event loop awaits a [`Ticker`]. Tests use
//! [`ManualScheduler`] and call `tick()` by hand.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Whether ticks are currently being produced, and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cadence {
    #[default]
    Stopped,
    Every(Duration),
}

/// Something that calls `tick()` on the game at a fixed interval
pub trait Scheduler {
    /// Begin ticking every `interval`, replacing any running cadence
    fn start(&mut self, interval: Duration);
    fn stop(&mut self);
    /// Switch a running cadence to a new interval
    fn reschedule(&mut self, interval: Duration);
}

/// Create the two ends of a tick channel
pub fn channel() -> (ClockControl, Ticker) {
    let (tx, rx) = watch::channel(Cadence::Stopped);
    (
        ClockControl { tx },
        Ticker {
            rx,
            interval: None,
        },
    )
}

/// Sending end, owned by the game
#[derive(Debug)]
pub struct ClockControl {
    tx: watch::Sender<Cadence>,
}

impl ClockControl {
    pub fn cadence(&self) -> Cadence {
        *self.tx.borrow()
    }
}

impl Scheduler for ClockControl {
    fn start(&mut self, interval: Duration) {
        self.tx.send_replace(Cadence::Every(interval));
    }

    fn stop(&mut self) {
        self.tx.send_replace(Cadence::Stopped);
    }

    fn reschedule(&mut self, interval: Duration) {
        self.start(interval);
    }
}

/// Receiving end, awaited by the event loop
#[derive(Debug)]
pub struct Ticker {
    rx: watch::Receiver<Cadence>,
    interval: Option<Interval>,
}

impl Ticker {
    /// Resolves at the next tick. Pending forever while stopped.
    ///
    /// Cancel safe: dropping the future keeps the current cadence.
    pub async fn tick(&mut self) {
        if self.rx.has_changed().unwrap_or(false) {
            self.apply_cadence();
        }

        loop {
            let Some(interval) = self.interval.as_mut() else {
                if self.rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
                self.apply_cadence();
                continue;
            };

            let control_alive = tokio::select! {
                _ = interval.tick() => return,
                changed = self.rx.changed() => changed.is_ok(),
            };

            if control_alive {
                self.apply_cadence();
            } else {
                // Control dropped, keep ticking at the last cadence
                if let Some(interval) = self.interval.as_mut() {
                    interval.tick().await;
                }
                return;
            }
        }
    }

    fn apply_cadence(&mut self) {
        let cadence = *self.rx.borrow_and_update();
        self.interval = match cadence {
            Cadence::Stopped => None,
            Cadence::Every(period) => {
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Some(interval)
            }
        };
    }
}

/// Scheduler that only records its cadence
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    cadence: Cadence,
    /// Number of times the cadence was (re)started
    pub starts: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn is_running(&self) -> bool {
        matches!(self.cadence, Cadence::Every(_))
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, interval: Duration) {
        self.cadence = Cadence::Every(interval);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.cadence = Cadence::Stopped;
    }

    fn reschedule(&mut self, interval: Duration) {
        self.start(interval);
    }
}
