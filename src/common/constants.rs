//! Application-wide constants.
//!
//! Phase thresholds, depression angles, position-update cadence and the
//! brightness model's calibration live here so that the classifier, the
//! horizon scan and the scheduler agree on one set of numbers.

// # Phase elevation thresholds (degrees, inclusive lower bounds)

pub const DAY_MIN_ELEVATION: f64 = 10.0;
pub const SMALL_DAY_MIN_ELEVATION: f64 = 0.0;
pub const TWILIGHT_MIN_ELEVATION: f64 = -6.0;
pub const NAUTICAL_TWILIGHT_MIN_ELEVATION: f64 = -12.0;
pub const ASTRONOMICAL_TWILIGHT_MIN_ELEVATION: f64 = -18.0;

/// Published state switches to `above_horizon` strictly above this elevation.
pub const HORIZON_ELEVATION: f64 = -0.833;

// # Depression angles (degrees below the geometric horizon)

pub const ASTRONOMICAL_DEPRESSION: f64 = 18.0;
pub const NAUTICAL_DEPRESSION: f64 = 12.0;
pub const CIVIL_DEPRESSION: f64 = 6.0;
/// Refraction plus solar radius, as used for sunrise and sunset.
pub const SUNRISE_DEPRESSION: f64 = 0.833;
/// Negative depression: the sun 10° above the horizon.
pub const SMALL_DAY_DEPRESSION: f64 = -10.0;

// # Horizon scan

/// How far ahead of `now` the earliest-transition sentinel sits.
pub const HORIZON_SENTINEL_DAYS: i64 = 400;
/// Days a provider searches forward before reporting an event as absent.
/// Must not be shorter than the sentinel, so an absent event never wins.
pub const EVENT_LOOKAHEAD_DAYS: i64 = 400;

/// TT minus UT in seconds, fixed for the current decades.
pub const DELTA_T_SECONDS: f64 = 69.0;

// # Position cadence (minutes). 4 minutes is one degree of solar arc.

pub const NIGHT_INTERVAL_MINUTES: i64 = 4 * 5;
pub const ASTRONOMICAL_TWILIGHT_INTERVAL_MINUTES: i64 = 4 * 2;
pub const NAUTICAL_TWILIGHT_INTERVAL_MINUTES: i64 = 4 * 2;
pub const TWILIGHT_INTERVAL_MINUTES: i64 = 4;
pub const SMALL_DAY_INTERVAL_MINUTES: i64 = 2;
pub const DAY_INTERVAL_MINUTES: i64 = 4;

/// A position update closer than this many intervals to the next horizon
/// change is dropped; the horizon firing reads position itself.
pub const DEFAULT_SUPPRESSION_FACTOR: f64 = 1.25;

pub const MINIMUM_INTERVAL_MINUTES: i64 = 1;
pub const MAXIMUM_INTERVAL_MINUTES: i64 = 24 * 60;
pub const MINIMUM_SUPPRESSION_FACTOR: f64 = 1.0;
pub const MAXIMUM_SUPPRESSION_FACTOR: f64 = 10.0;

// # Brightness model

/// Theoretical maximum of the illuminance polynomial (sun at zenith).
pub const BRIGHTNESS_MODEL_MAX: f64 = 5.11;

// # Runtime

/// Upper bound on one real-time sleep slice, so signals are noticed promptly.
pub const MAX_SLEEP_SLICE_MS: u64 = 1000;

pub const CONFIG_FILE_NAME: &str = "suntrack.toml";
pub const CONFIG_DIR_NAME: &str = "suntrack";

pub const EXIT_FAILURE: i32 = 1;
