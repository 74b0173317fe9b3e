//! Kitchen timer - a single countdown with one-second ticks
//!
//! [`Countdown`] holds the remaining time and knows nothing about clocks.
//! [`Timer`] owns at most one countdown and drives it from a tokio interval,
//! so the event loop can `select!` on [`Timer::tick`] alongside other input.

use std::fmt;
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Countdown granularity
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Not a finite, positive duration of at least one second
    InvalidDuration,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::InvalidDuration => f.write_str("Please specify a valid number of minutes."),
        }
    }
}

impl std::error::Error for TimerError {}

/// Outcome of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u64),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
}

impl Countdown {
    pub fn from_minutes(minutes: f64) -> Result<Self, TimerError> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(TimerError::InvalidDuration);
        }
        let secs = (minutes * 60.0).round();
        if secs < 1.0 {
            return Err(TimerError::InvalidDuration);
        }
        Ok(Self {
            remaining_secs: secs as u64,
        })
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn tick(&mut self) -> Tick {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            Tick::Finished
        } else {
            Tick::Running(self.remaining_secs)
        }
    }

    pub fn display(&self) -> String {
        format_remaining(self.remaining_secs)
    }
}

/// `m:ss`, minutes unpadded
pub fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Display string once a countdown has run out
pub const FINISHED_DISPLAY: &str = "00:00";

pub struct Timer {
    countdown: Option<Countdown>,
    interval: Option<Interval>,
    period: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            countdown: None,
            interval: None,
            period: TICK,
        }
    }

    /// Replace whatever is running with a fresh countdown.
    /// On error the current countdown keeps running untouched.
    pub fn start(&mut self, minutes: f64) -> Result<&Countdown, TimerError> {
        let countdown = Countdown::from_minutes(minutes)?;
        if let Some(previous) = &self.countdown {
            tracing::debug!(
                discarded_secs = previous.remaining_secs(),
                "Replacing running timer"
            );
        }
        // Interval is armed lazily on the next tick() so the first tick lands
        // one full period after the start
        self.interval = None;
        Ok(self.countdown.insert(countdown))
    }

    pub fn is_active(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.countdown.as_ref().map(Countdown::remaining_secs)
    }

    /// Wait for the next tick and apply it. Never resolves while idle.
    /// Cancel safe: dropping the future before it resolves loses no time.
    pub async fn tick(&mut self) -> Tick {
        let Some(countdown) = self.countdown.as_mut() else {
            return std::future::pending().await;
        };

        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        interval.tick().await;

        let tick = countdown.tick();
        if tick == Tick::Finished {
            self.countdown = None;
            self.interval = None;
        }
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_validation() {
        assert_eq!(Countdown::from_minutes(5.0).unwrap().remaining_secs(), 300);
        assert_eq!(Countdown::from_minutes(0.5).unwrap().remaining_secs(), 30);
        assert_eq!(Countdown::from_minutes(0.0), Err(TimerError::InvalidDuration));
        assert_eq!(Countdown::from_minutes(-1.0), Err(TimerError::InvalidDuration));
        assert_eq!(Countdown::from_minutes(f64::NAN), Err(TimerError::InvalidDuration));
        assert_eq!(Countdown::from_minutes(f64::INFINITY), Err(TimerError::InvalidDuration));
        // Rounds to zero seconds
        assert_eq!(Countdown::from_minutes(0.001), Err(TimerError::InvalidDuration));
    }

    #[test]
    fn test_countdown_runs_out_once() {
        let mut countdown = Countdown::from_minutes(5.0).unwrap();
        let mut finished = 0;
        for i in 1..=300u64 {
            match countdown.tick() {
                Tick::Running(left) => assert_eq!(left, 300 - i),
                Tick::Finished => finished += 1,
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(countdown.remaining_secs(), 0);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(300), "5:00");
        assert_eq!(format_remaining(299), "4:59");
        assert_eq!(format_remaining(61), "1:01");
        assert_eq!(format_remaining(9), "0:09");
        assert_eq!(format_remaining(720), "12:00");
        assert_eq!(TimerError::InvalidDuration.to_string(), "Please specify a valid number of minutes.");
    }

    #[test]
    fn test_invalid_start_keeps_running_timer() {
        let mut timer = Timer::new();
        timer.start(2.0).unwrap();
        assert!(timer.start(0.0).is_err());
        assert!(timer.start(-1.0).is_err());
        assert!(timer.start(f64::NAN).is_err());
        assert_eq!(timer.remaining_secs(), Some(120));
    }

    #[test]
    fn test_restart_discards_previous() {
        let mut timer = Timer::new();
        assert!(!timer.is_active());
        timer.start(10.0).unwrap();
        let countdown = timer.start(3.0).unwrap();
        assert_eq!(countdown.remaining_secs(), 180);
        assert_eq!(timer.remaining_secs(), Some(180));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_second() {
        let mut timer = Timer::new();
        timer.start(1.0).unwrap();
        let started = Instant::now();

        let early = time::timeout(Duration::from_millis(999), timer.tick()).await;
        assert!(early.is_err());
        assert_eq!(timer.remaining_secs(), Some(60));

        assert_eq!(timer.tick().await, Tick::Running(59));
        assert_eq!(started.elapsed(), TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let mut timer = Timer::new();
        timer.start(5.0).unwrap();
        let started = Instant::now();

        let mut finished = 0;
        for _ in 0..300 {
            if timer.tick().await == Tick::Finished {
                finished += 1;
            }
        }

        assert_eq!(finished, 1);
        assert!(!timer.is_active());
        assert_eq!(started.elapsed(), Duration::from_secs(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timer_never_ticks() {
        let mut timer = Timer::new();
        let result = time::timeout(Duration::from_secs(3600), timer.tick()).await;
        assert!(result.is_err());
    }
}
