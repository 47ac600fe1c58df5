use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

const TICK: Duration = Duration::from_secs(1);

/// One-second heartbeat for `ExamSessionController::tick`.
///
/// The first tick fires one second after creation. Ticks missed while the
/// host was busy are delayed rather than burst, so the countdown never jumps.
#[derive(Debug)]
pub struct ExamTicker {
    interval: Interval,
}

impl ExamTicker {
    #[must_use]
    pub fn new() -> Self {
        let mut interval = interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next second. Cancel safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

impl Default for ExamTicker {
    fn default() -> Self {
        Self::new()
    }
}
