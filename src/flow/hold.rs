//! Hold-to-Confirm Gesture Controller
//!
//! A sustained press arms two cooperating timers: a one-shot submission
//! deadline and a repeating progress ticker (+1% per tick, 100 ticks to
//! the deadline). Both are owned by this controller and torn down
//! together - release, step change, or flow teardown cancels them, so a
//! completed gesture can fire at most one submission.

use std::pin::Pin;

use tokio::time::{Duration, Instant, Interval, Sleep, interval_at, sleep_until};
use tracing::trace;

/// Signal produced while a press is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldSignal {
    /// Progress ticked (0-100)
    Progress(u8),
    /// Deadline reached - trigger exactly one submission
    Complete,
}

struct ArmedTimers {
    deadline: Pin<Box<Sleep>>,
    ticker: Interval,
}

/// Per-flow gesture state. Lives only while the confirm button is
/// pressed; release or completion destroys the timers.
pub struct HoldGesture {
    duration: Duration,
    tick: Duration,
    armed: Option<ArmedTimers>,
    progress: u8,
}

impl HoldGesture {
    pub fn new(duration_ms: u64, tick_ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(duration_ms),
            tick: Duration::from_millis(tick_ms),
            armed: None,
            progress: 0,
        }
    }

    /// Press-start. Any existing timers are cancelled first so
    /// overlapping activations cannot double-fire.
    pub fn press(&mut self) {
        self.cancel();
        let start = Instant::now();
        self.armed = Some(ArmedTimers {
            deadline: Box::pin(sleep_until(start + self.duration)),
            ticker: interval_at(start + self.tick, self.tick),
        });
        trace!(duration_ms = self.duration.as_millis() as u64, "Hold armed");
    }

    /// Press-end (or pointer-leave). Cancels both timers, progress
    /// resets to 0, no submission occurs.
    pub fn release(&mut self) {
        self.cancel();
    }

    /// Tear down outstanding timers (release, step change, teardown)
    pub fn cancel(&mut self) {
        self.armed = None;
        self.progress = 0;
    }

    /// Whether a press is currently held
    pub fn is_active(&self) -> bool {
        self.armed.is_some()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Await the next gesture signal. Must only be polled while active
    /// (the coordinator guards its select arm with `is_active`).
    ///
    /// `Complete` disarms the controller, so it is produced at most once
    /// per press.
    pub async fn signal(&mut self) -> HoldSignal {
        enum Fired {
            Deadline,
            Tick,
        }

        let fired = {
            let timers = self.armed.as_mut().expect("signal polled while inactive");
            tokio::select! {
                _ = timers.deadline.as_mut() => Fired::Deadline,
                _ = timers.ticker.tick() => Fired::Tick,
            }
        };

        match fired {
            Fired::Deadline => {
                self.armed = None;
                self.progress = 100;
                HoldSignal::Complete
            }
            Fired::Tick => {
                self.progress = (self.progress + 1).min(100);
                HoldSignal::Progress(self.progress)
            }
        }
    }
}
