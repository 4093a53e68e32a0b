//! Solar phases and the elevation classifier.
//!
//! Phases follow the usual twilight bands: below -18° all stars are visible,
//! -18°..-12° some are not, -12°..-6° the horizon is visible, -6°..0° objects
//! are visible, 0°..10° the sun is low on the horizon, above 10° it is day.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::constants::*;

/// One of six discrete classifications of the sun's elevation.
///
/// Variants are declared from lowest to highest band, so the derived ordering
/// gives `Day > SmallDay > Twilight > NauticalTwilight > AstronomicalTwilight > Night`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Below -18°
    Night,
    /// -18° to -12°
    AstronomicalTwilight,
    /// -12° to -6°
    NauticalTwilight,
    /// -6° to 0°
    Twilight,
    /// 0° to 10°
    SmallDay,
    /// 10° and above
    Day,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Night,
        Phase::AstronomicalTwilight,
        Phase::NauticalTwilight,
        Phase::Twilight,
        Phase::SmallDay,
        Phase::Day,
    ];

    /// Classify an elevation in degrees. Lower band bounds are inclusive.
    pub fn from_elevation(elevation: f64) -> Self {
        if elevation >= DAY_MIN_ELEVATION {
            Phase::Day
        } else if elevation >= SMALL_DAY_MIN_ELEVATION {
            Phase::SmallDay
        } else if elevation >= TWILIGHT_MIN_ELEVATION {
            Phase::Twilight
        } else if elevation >= NAUTICAL_TWILIGHT_MIN_ELEVATION {
            Phase::NauticalTwilight
        } else if elevation >= ASTRONOMICAL_TWILIGHT_MIN_ELEVATION {
            Phase::AstronomicalTwilight
        } else {
            // NaN lands here as well
            Phase::Night
        }
    }

    /// Default position-update interval while in this phase.
    pub fn default_interval(&self) -> Duration {
        let minutes = match self {
            Phase::Night => NIGHT_INTERVAL_MINUTES,
            Phase::AstronomicalTwilight => ASTRONOMICAL_TWILIGHT_INTERVAL_MINUTES,
            Phase::NauticalTwilight => NAUTICAL_TWILIGHT_INTERVAL_MINUTES,
            Phase::Twilight => TWILIGHT_INTERVAL_MINUTES,
            Phase::SmallDay => SMALL_DAY_INTERVAL_MINUTES,
            Phase::Day => DAY_INTERVAL_MINUTES,
        };
        Duration::minutes(minutes)
    }

    /// Stable snake_case identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Night => "night",
            Phase::AstronomicalTwilight => "astronomical_twilight",
            Phase::NauticalTwilight => "nautical_twilight",
            Phase::Twilight => "twilight",
            Phase::SmallDay => "small_day",
            Phase::Day => "day",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Night => "Night",
            Phase::AstronomicalTwilight => "Astronomical twilight",
            Phase::NauticalTwilight => "Nautical twilight",
            Phase::Twilight => "Twilight",
            Phase::SmallDay => "Small day",
            Phase::Day => "Day",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Two-valued primary state published alongside the snapshot attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonState {
    AboveHorizon,
    BelowHorizon,
}

impl HorizonState {
    /// Above the horizon strictly above -0.833°, the same value used for sunrise.
    pub fn from_elevation(elevation: f64) -> Self {
        if elevation > HORIZON_ELEVATION {
            HorizonState::AboveHorizon
        } else {
            HorizonState::BelowHorizon
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HorizonState::AboveHorizon => "above_horizon",
            HorizonState::BelowHorizon => "below_horizon",
        }
    }
}

impl fmt::Display for HorizonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_band_boundaries_inclusive_on_high_side() {
        assert_eq!(Phase::from_elevation(10.0), Phase::Day);
        assert_eq!(Phase::from_elevation(9.99), Phase::SmallDay);
        assert_eq!(Phase::from_elevation(0.0), Phase::SmallDay);
        assert_eq!(Phase::from_elevation(-0.01), Phase::Twilight);
        assert_eq!(Phase::from_elevation(-6.0), Phase::Twilight);
        assert_eq!(Phase::from_elevation(-6.01), Phase::NauticalTwilight);
        assert_eq!(Phase::from_elevation(-12.0), Phase::NauticalTwilight);
        assert_eq!(Phase::from_elevation(-12.01), Phase::AstronomicalTwilight);
        assert_eq!(Phase::from_elevation(-18.0), Phase::AstronomicalTwilight);
        assert_eq!(Phase::from_elevation(-18.01), Phase::Night);
    }

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Day > Phase::SmallDay);
        assert!(Phase::SmallDay > Phase::Twilight);
        assert!(Phase::Twilight > Phase::NauticalTwilight);
        assert!(Phase::NauticalTwilight > Phase::AstronomicalTwilight);
        assert!(Phase::AstronomicalTwilight > Phase::Night);
    }

    #[test]
    fn test_default_intervals() {
        assert_eq!(Phase::Night.default_interval(), Duration::minutes(20));
        assert_eq!(Phase::AstronomicalTwilight.default_interval(), Duration::minutes(8));
        assert_eq!(Phase::NauticalTwilight.default_interval(), Duration::minutes(8));
        assert_eq!(Phase::Twilight.default_interval(), Duration::minutes(4));
        assert_eq!(Phase::SmallDay.default_interval(), Duration::minutes(2));
        assert_eq!(Phase::Day.default_interval(), Duration::minutes(4));
    }

    #[test]
    fn test_horizon_state_boundary() {
        assert_eq!(HorizonState::from_elevation(-0.80), HorizonState::AboveHorizon);
        assert_eq!(HorizonState::from_elevation(-0.90), HorizonState::BelowHorizon);
        assert_eq!(HorizonState::from_elevation(-0.833), HorizonState::BelowHorizon);
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&Phase::AstronomicalTwilight).unwrap();
        assert_eq!(json, "\"astronomical_twilight\"");
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
        }
        let state = serde_json::to_string(&HorizonState::BelowHorizon).unwrap();
        assert_eq!(state, "\"below_horizon\"");
    }

    proptest! {
        /// Higher elevation never yields a lower phase.
        #[test]
        fn test_classifier_monotone(a in -90.0f64..=90.0, b in -90.0f64..=90.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Phase::from_elevation(low) <= Phase::from_elevation(high));
        }

        #[test]
        fn test_classifier_total(e in proptest::num::f64::ANY) {
            let phase = Phase::from_elevation(e);
            prop_assert!(Phase::ALL.contains(&phase));
        }
    }
}
