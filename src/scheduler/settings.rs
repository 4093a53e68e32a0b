//! Position cadence settings.
//!
//! The per-phase intervals and the suppression factor were chosen empirically.
//! Consumers rely on the resulting update pattern, so the defaults are kept
//! exactly and only overridden through configuration.

use chrono::Duration;

use crate::common::constants::DEFAULT_SUPPRESSION_FACTOR;
use crate::solar::phase::Phase;

/// Position-update interval for each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseIntervals {
    pub night: Duration,
    pub astronomical_twilight: Duration,
    pub nautical_twilight: Duration,
    pub twilight: Duration,
    pub small_day: Duration,
    pub day: Duration,
}

impl Default for PhaseIntervals {
    fn default() -> Self {
        Self {
            night: Phase::Night.default_interval(),
            astronomical_twilight: Phase::AstronomicalTwilight.default_interval(),
            nautical_twilight: Phase::NauticalTwilight.default_interval(),
            twilight: Phase::Twilight.default_interval(),
            small_day: Phase::SmallDay.default_interval(),
            day: Phase::Day.default_interval(),
        }
    }
}

impl PhaseIntervals {
    pub fn get(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Night => self.night,
            Phase::AstronomicalTwilight => self.astronomical_twilight,
            Phase::NauticalTwilight => self.nautical_twilight,
            Phase::Twilight => self.twilight,
            Phase::SmallDay => self.small_day,
            Phase::Day => self.day,
        }
    }

    pub fn set(&mut self, phase: Phase, interval: Duration) {
        let slot = match phase {
            Phase::Night => &mut self.night,
            Phase::AstronomicalTwilight => &mut self.astronomical_twilight,
            Phase::NauticalTwilight => &mut self.nautical_twilight,
            Phase::Twilight => &mut self.twilight,
            Phase::SmallDay => &mut self.small_day,
            Phase::Day => &mut self.day,
        };
        *slot = interval;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    pub intervals: PhaseIntervals,
    /// Multiple of the interval within which an upcoming horizon change
    /// suppresses the next position update.
    pub suppression_factor: f64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            intervals: PhaseIntervals::default(),
            suppression_factor: DEFAULT_SUPPRESSION_FACTOR,
        }
    }
}

impl SchedulerSettings {
    pub fn interval(&self, phase: Phase) -> Duration {
        self.intervals.get(phase)
    }

    /// `interval(phase) × suppression_factor`, to millisecond precision.
    pub fn suppression_window(&self, phase: Phase) -> Duration {
        let millis = self.interval(phase).num_milliseconds() as f64 * self.suppression_factor;
        Duration::milliseconds(millis.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_suppression_windows() {
        let settings = SchedulerSettings::default();
        assert_eq!(settings.suppression_window(Phase::Night), Duration::minutes(25));
        assert_eq!(settings.suppression_window(Phase::Twilight), Duration::minutes(5));
        assert_eq!(
            settings.suppression_window(Phase::SmallDay),
            Duration::seconds(150)
        );
    }

    #[test]
    fn test_override_interval() {
        let mut intervals = PhaseIntervals::default();
        intervals.set(Phase::Day, Duration::minutes(30));
        assert_eq!(intervals.get(Phase::Day), Duration::minutes(30));
        assert_eq!(intervals.get(Phase::SmallDay), Duration::minutes(2));
    }
}
