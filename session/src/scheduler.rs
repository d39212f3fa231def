//! Fixed-interval tick scheduler driven by caller-supplied time.

use std::time::Duration;

/// Default pause between two scheduled steps.
pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration parameters required to construct a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    render_interval: Duration,
}

impl Config {
    /// Creates a configuration using the provided pacing between render
    /// frames, navigation steps and auto-replay steps.
    #[must_use]
    pub const fn new(render_interval: Duration) -> Self {
        Self { render_interval }
    }

    /// Pause between two scheduled steps.
    #[must_use]
    pub const fn render_interval(&self) -> Duration {
        self.render_interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_INTERVAL)
    }
}

/// Single cancellable timer owned by the session.
///
/// The scheduler never sleeps. Callers report elapsed time through
/// [`Scheduler::advance`], which returns how many steps fell due.
#[derive(Clone, Debug)]
pub struct Scheduler {
    interval: Duration,
    accumulator: Duration,
    running: bool,
}

impl Scheduler {
    /// Creates an idle scheduler firing every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            running: false,
        }
    }

    /// Arms the timer. Starting a running scheduler keeps its phase.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.accumulator = Duration::ZERO;
        }
    }

    /// Stops the timer and forgets any partially elapsed interval.
    pub fn cancel(&mut self) {
        self.running = false;
        self.accumulator = Duration::ZERO;
    }

    /// Reports whether steps are scheduled.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Pause between two steps.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulates elapsed time and returns the number of steps now due.
    ///
    /// A zero interval yields one step per call.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        if self.interval.is_zero() {
            return 1;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut due = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            due += 1;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_scheduler_never_fires() {
        let mut scheduler = Scheduler::new(Duration::from_millis(10));
        assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn fires_once_per_elapsed_interval() {
        let mut scheduler = Scheduler::new(Duration::from_millis(50));
        scheduler.start();

        assert_eq!(scheduler.advance(Duration::from_millis(30)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(30)), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(140)), 3);
    }

    #[test]
    fn cancel_drops_partial_interval() {
        let mut scheduler = Scheduler::new(Duration::from_millis(50));
        scheduler.start();
        assert_eq!(scheduler.advance(Duration::from_millis(40)), 0);

        scheduler.cancel();
        scheduler.start();

        assert_eq!(scheduler.advance(Duration::from_millis(40)), 0);
        assert!(scheduler.is_running());
    }

    #[test]
    fn restarting_keeps_phase() {
        let mut scheduler = Scheduler::new(Duration::from_millis(50));
        scheduler.start();
        assert_eq!(scheduler.advance(Duration::from_millis(40)), 0);

        scheduler.start();

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 1);
    }

    #[test]
    fn default_config_uses_fifty_milliseconds() {
        assert_eq!(
            Config::default().render_interval(),
            Duration::from_millis(50)
        );
    }
}
