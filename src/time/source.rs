//! Process-wide clock.
//!
//! Everything that asks "what time is it" or waits goes through the global
//! [`TimeSource`]. The default is the system clock; `simulate` installs a
//! [`SimulatedTimeSource`] that runs a fixed UTC window either accelerated or
//! jumping straight through each sleep.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration as StdDuration;

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Clock and sleep primitive.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Block for `duration` of this source's time.
    fn sleep(&self, duration: StdDuration);

    fn is_simulated(&self) -> bool;

    /// True once a simulated window is exhausted. Never true for real time.
    fn is_ended(&self) -> bool {
        false
    }
}

/// System clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Clock that runs over `[start, end]`.
///
/// With a positive multiplier, simulated time passes `multiplier` times faster
/// than real time. A multiplier of `0.0` is fast-forward: every sleep advances
/// the clock immediately.
pub struct SimulatedTimeSource {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    multiplier: f64,
    /// Simulated time slept so far.
    elapsed: Mutex<ChronoDuration>,
}

impl SimulatedTimeSource {
    /// Negative or non-finite multipliers fall back to one hour per second.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, multiplier: f64) -> Self {
        let multiplier = if multiplier == 0.0 {
            0.0
        } else if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            3600.0
        };
        Self {
            start,
            end,
            multiplier,
            elapsed: Mutex::new(ChronoDuration::zero()),
        }
    }

    pub fn is_fast_forward(&self) -> bool {
        self.multiplier == 0.0
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    fn elapsed(&self) -> MutexGuard<'_, ChronoDuration> {
        // A panicked sleeper cannot leave the duration half-written.
        self.elapsed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current(&self) -> DateTime<Utc> {
        (self.start + *self.elapsed()).min(self.end)
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.current()
    }

    fn sleep(&self, duration: StdDuration) {
        let remaining = self.end - self.current();
        if remaining <= ChronoDuration::zero() {
            return;
        }
        let requested = ChronoDuration::from_std(duration).unwrap_or(remaining);
        let step = requested.min(remaining);

        if self.is_fast_forward() {
            // Yield so log output keeps up.
            std::thread::sleep(StdDuration::from_millis(1));
        } else if let Ok(real) = step.to_std() {
            std::thread::sleep(real.div_f64(self.multiplier));
        }

        *self.elapsed() += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current() >= self.end
    }
}

fn source() -> &'static Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource))
}

/// Install the global time source. Only the first call takes effect.
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

pub fn now() -> DateTime<Utc> {
    source().now()
}

pub fn sleep(duration: StdDuration) {
    source().sleep(duration)
}

pub fn is_simulated() -> bool {
    source().is_simulated()
}

pub fn simulation_ended() -> bool {
    source().is_ended()
}

/// Parse `YYYY-MM-DD HH:MM:SS` as a UTC instant.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2020, 6, 21, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 6, 21, 1, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_fast_forward_advances_by_sleep() {
        let (start, end) = window();
        let source = SimulatedTimeSource::new(start, end, 0.0);
        assert!(source.is_fast_forward());
        assert_eq!(source.now(), start);

        source.sleep(StdDuration::from_secs(600));
        assert_eq!(source.now(), start + ChronoDuration::minutes(10));
        assert!(!source.is_ended());
    }

    #[test]
    fn test_simulation_caps_at_end() {
        let (start, end) = window();
        let source = SimulatedTimeSource::new(start, end, 0.0);
        source.sleep(StdDuration::from_secs(7200));
        assert_eq!(source.now(), end);
        assert!(source.is_ended());

        // Further sleeps are no-ops.
        source.sleep(StdDuration::from_secs(60));
        assert_eq!(source.now(), end);
    }

    #[test]
    fn test_accelerated_sleep() {
        let (start, end) = window();
        // One simulated hour per real millisecond.
        let source = SimulatedTimeSource::new(start, end, 3_600_000.0);
        source.sleep(StdDuration::from_secs(1800));
        assert_eq!(source.now(), start + ChronoDuration::minutes(30));
    }

    #[test]
    fn test_invalid_multiplier_falls_back() {
        let (start, end) = window();
        let source = SimulatedTimeSource::new(start, end, -2.0);
        assert!(!source.is_fast_forward());
        assert!(source.is_simulated());
    }

    #[test]
    fn test_parse_datetime() {
        let parsed = parse_datetime("2020-06-21 13:45:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2020, 6, 21, 13, 45, 0).unwrap());
        assert!(parse_datetime("2020-06-21T13:45").is_err());
    }
}
