//! One-second session countdown.
//!
//! Each [`SessionTimer::start`] stops and joins the previous countdown task
//! before spawning a new one, and tags every event with a generation number
//! so the consumer can drop events from a countdown that has since been
//! replaced.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// What happened on a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEventKind {
    /// One second elapsed; `remaining` is still positive.
    Tick {
        /// Seconds left.
        remaining: i64,
    },
    /// The low-time notice threshold was crossed.
    Warning {
        /// Seconds left.
        remaining: i64,
    },
    /// The countdown reached zero. Sent once per generation.
    Expired,
}

/// A countdown event tagged with the generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    /// Countdown generation.
    pub generation: u64,
    /// Event payload.
    pub kind: TimerEventKind,
}

struct Countdown {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Restartable countdown driving the session clock.
pub struct SessionTimer {
    events: mpsc::UnboundedSender<TimerEvent>,
    warn_at: i64,
    remaining: Arc<AtomicI64>,
    generation: u64,
    running: Option<Countdown>,
}

impl std::fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimer")
            .field("generation", &self.generation)
            .field("remaining", &self.remaining())
            .field("running", &self.running.is_some())
            .finish()
    }
}

impl SessionTimer {
    /// Create an idle timer that reports on `events`.
    pub fn new(events: mpsc::UnboundedSender<TimerEvent>, warn_at: i64) -> Self {
        Self {
            events,
            warn_at,
            remaining: Arc::new(AtomicI64::new(0)),
            generation: 0,
            running: None,
        }
    }

    /// Generation of the most recently started countdown.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Seconds left on the current countdown, 0 when idle or expired.
    pub fn remaining(&self) -> i64 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Replace any running countdown with one starting at `initial_seconds`.
    ///
    /// Returns the new generation. A non-positive start expires immediately.
    pub async fn start(&mut self, initial_seconds: i64) -> u64 {
        self.stop().await;
        self.generation += 1;
        let generation = self.generation;

        if initial_seconds <= 0 {
            self.remaining.store(0, Ordering::SeqCst);
            let _ = self.events.send(TimerEvent {
                generation,
                kind: TimerEventKind::Expired,
            });
            return generation;
        }

        self.remaining.store(initial_seconds, Ordering::SeqCst);

        let (cancel, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(run_countdown(
            generation,
            Arc::clone(&self.remaining),
            self.warn_at,
            self.events.clone(),
            cancel_rx,
        ));

        self.running = Some(Countdown { cancel, handle });
        tracing::debug!(generation, initial_seconds, "Countdown started");
        generation
    }

    /// Cancel and join the running countdown. Calling it when idle is a no-op.
    pub async fn stop(&mut self) {
        if let Some(countdown) = self.running.take() {
            let _ = countdown.cancel.send(true);
            let _ = countdown.handle.await;
        }
    }
}

async fn run_countdown(
    generation: u64,
    remaining: Arc<AtomicI64>,
    warn_at: i64,
    events: mpsc::UnboundedSender<TimerEvent>,
    mut cancel: watch::Receiver<bool>,
) {
    let period = Duration::from_secs(1);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = ticker.tick() => {
                let left = (remaining.load(Ordering::SeqCst) - 1).max(0);
                remaining.store(left, Ordering::SeqCst);

                if left == 0 {
                    let _ = events.send(TimerEvent { generation, kind: TimerEventKind::Expired });
                    break;
                }

                let _ = events.send(TimerEvent {
                    generation,
                    kind: TimerEventKind::Tick { remaining: left },
                });
                if left == warn_at {
                    let _ = events.send(TimerEvent {
                        generation,
                        kind: TimerEventKind::Warning { remaining: left },
                    });
                }
            }
        }
    }
}
