use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running(Instant),
    Stopped(Duration),
}

/// Session clock. Starts with the first reveal and stops at the end of the
/// game; stopping twice is harmless.
#[derive(Debug, Clone)]
pub struct Timer {
    state: TimerState,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running(_))
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        self.state = TimerState::Running(now);
    }

    /// Stops the clock and returns the final elapsed time.
    pub fn stop(&mut self) -> Duration {
        self.stop_at(Instant::now())
    }

    pub fn stop_at(&mut self, now: Instant) -> Duration {
        if let TimerState::Running(started) = self.state {
            let elapsed = now.saturating_duration_since(started);
            debug!(?elapsed, "timer stopped");
            self.state = TimerState::Stopped(elapsed);
        }
        self.elapsed_at(now)
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.state {
            TimerState::Idle => Duration::ZERO,
            TimerState::Running(started) => now.saturating_duration_since(started),
            TimerState::Stopped(elapsed) => elapsed,
        }
    }

    /// Once-a-second refresh: the display string while running, `None` once
    /// the timer has stopped.
    pub fn tick_at(&self, now: Instant) -> Option<String> {
        self.is_running()
            .then(|| format_elapsed(self.elapsed_at(now)))
    }

    pub fn display(&self) -> String {
        format_elapsed(self.elapsed())
    }
}

/// `HH:MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}
