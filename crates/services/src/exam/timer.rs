use nihongo_core::time::format_countdown;

/// Remaining exam time, advanced one second per `tick`.
///
/// The countdown only moves while running and stops itself at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining_secs: u32,
    running: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(total_secs: u32) -> Self {
        Self {
            remaining_secs: total_secs,
            running: false,
        }
    }

    /// Start counting. An expired countdown stays stopped.
    pub fn start(&mut self) {
        self.running = self.remaining_secs > 0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Consume one second. Returns the new remaining time, or `None` when the
    /// countdown is not running.
    pub fn tick(&mut self) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
        }
        Some(self.remaining_secs)
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// `H:MM:SS` or `M:SS`.
    #[must_use]
    pub fn display(&self) -> String {
        format_countdown(self.remaining_secs)
    }
}
