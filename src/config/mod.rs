//! Configuration for suntrack.
//!
//! Settings live in `suntrack.toml`, by default under
//! `$XDG_CONFIG_HOME/suntrack/`, or in the directory given with `--config`:
//!
//! ```toml
//! #[Location]
//! latitude = 51.4769          # Observer latitude in degrees (-90 to 90)
//! longitude = -0.0005         # Observer longitude in degrees (-180 to 180)
//! elevation = 45.0            # Meters above sea level (optional)
//!
//! #[Cadence]
//! suppression_factor = 1.25   # Skip a position update this many intervals before a transition
//!
//! [intervals]                 # Position update interval per phase, in minutes
//! night = 20
//! astronomical_twilight = 8
//! nautical_twilight = 8
//! twilight = 4
//! small_day = 2
//! day = 4
//! ```
//!
//! Every field is optional in the file. Coordinates must be given as a pair;
//! without them the tracker refuses to start.

pub mod builder;
pub mod loading;
pub mod validation;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::common::constants::DEFAULT_SUPPRESSION_FACTOR;
use crate::error::{SunError, SunResult};
use crate::scheduler::settings::{PhaseIntervals, SchedulerSettings};
use crate::solar::{Location, Phase};

pub use builder::create_default_config;
pub use loading::{
    get_config_path, get_custom_config_dir, load, load_from_path, load_or_create, set_config_dir,
};

/// Per-phase position update intervals, in minutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalsConfig {
    pub night: Option<u64>,
    pub astronomical_twilight: Option<u64>,
    pub nautical_twilight: Option<u64>,
    pub twilight: Option<u64>,
    pub small_day: Option<u64>,
    pub day: Option<u64>,
}

impl IntervalsConfig {
    /// Configured minutes for `phase`, if any.
    pub fn minutes(&self, phase: Phase) -> Option<u64> {
        match phase {
            Phase::Night => self.night,
            Phase::AstronomicalTwilight => self.astronomical_twilight,
            Phase::NauticalTwilight => self.nautical_twilight,
            Phase::Twilight => self.twilight,
            Phase::SmallDay => self.small_day,
            Phase::Day => self.day,
        }
    }
}

/// Contents of `suntrack.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Meters above sea level.
    pub elevation: Option<f64>,
    pub suppression_factor: Option<f64>,
    pub intervals: Option<IntervalsConfig>,
}

impl Config {
    /// Load with automatic path detection, creating a default file if needed.
    pub fn load() -> anyhow::Result<Self> {
        load()
    }

    /// The configured observer, or `None` when no coordinates are set.
    ///
    /// Only one of the two coordinates, or an out-of-range value, is a
    /// configuration error.
    pub fn location(&self) -> SunResult<Option<Location>> {
        match (self.latitude, self.longitude) {
            (None, None) => Ok(None),
            (Some(latitude), Some(longitude)) => {
                let location = Location::new(latitude, longitude)?;
                match self.elevation {
                    Some(meters) => location.with_elevation(meters).map(Some),
                    None => Ok(Some(location)),
                }
            }
            _ => Err(SunError::Configuration(
                "latitude and longitude must be set together".to_string(),
            )),
        }
    }

    /// Scheduler cadence with defaults filled in.
    pub fn scheduler_settings(&self) -> SchedulerSettings {
        let mut intervals = PhaseIntervals::default();
        if let Some(configured) = &self.intervals {
            for phase in Phase::ALL {
                if let Some(minutes) = configured.minutes(phase) {
                    intervals.set(phase, Duration::minutes(minutes as i64));
                }
            }
        }
        SchedulerSettings {
            intervals,
            suppression_factor: self
                .suppression_factor
                .unwrap_or(DEFAULT_SUPPRESSION_FACTOR),
        }
    }

    /// Log the effective settings.
    pub fn log_config(&self) {
        match self.location() {
            Ok(Some(location)) => log_indented!("Location: {location}"),
            Ok(None) => log_indented!("Location: not configured"),
            Err(e) => log_indented!("Location: invalid ({e})"),
        }
        let settings = self.scheduler_settings();
        log_indented!("Suppression factor: {}", settings.suppression_factor);
        for phase in Phase::ALL {
            log_indented!(
                "{} interval: {} min",
                phase.display_name(),
                settings.interval(phase).num_minutes()
            );
        }
    }
}
