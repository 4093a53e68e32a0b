//! The position provider seam.
//!
//! Everything astronomical the tracker needs goes through
//! [`SolarPositionProvider`]. Depression angles are passed explicitly with each
//! call, so successive lookups never depend on each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Location;
use crate::error::SunResult;

/// Kind of solar event a provider can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarEventKind {
    /// Morning crossing of the given depression angle.
    Dawn,
    /// Evening crossing of the given depression angle.
    Dusk,
    /// Morning crossing of the standard horizon.
    Sunrise,
    /// Evening crossing of the standard horizon.
    Sunset,
    /// Upper transit. Ignores the depression angle.
    SolarNoon,
    /// Lower transit. Ignores the depression angle.
    SolarMidnight,
}

impl SolarEventKind {
    /// Whether this event is a crossing in the morning half of the day.
    pub fn is_morning(&self) -> bool {
        matches!(self, Self::Dawn | Self::Sunrise)
    }
}

impl fmt::Display for SolarEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dawn => "dawn",
            Self::Dusk => "dusk",
            Self::Sunrise => "sunrise",
            Self::Sunset => "sunset",
            Self::SolarNoon => "solar noon",
            Self::SolarMidnight => "solar midnight",
        };
        f.write_str(name)
    }
}

/// Source of solar positions and event instants for one observer.
///
/// Implementations must be pure with respect to their inputs. An event that
/// does not happen within the implementation's lookahead (polar day or night)
/// is reported as an instant far in the future rather than an error, so it
/// simply never becomes the nearest transition.
#[cfg_attr(test, mockall::automock)]
pub trait SolarPositionProvider {
    /// Next instant strictly after `from` at which `kind` happens.
    ///
    /// `depression` is in degrees below the geometric horizon (negative means
    /// above it). Transit events ignore it.
    fn next_event(
        &self,
        location: &Location,
        depression: f64,
        kind: SolarEventKind,
        from: DateTime<Utc>,
    ) -> SunResult<DateTime<Utc>>;

    /// Solar elevation in degrees at `at`.
    fn elevation(&self, location: &Location, at: DateTime<Utc>) -> SunResult<f64>;

    /// Solar azimuth in degrees clockwise from north at `at`.
    fn azimuth(&self, location: &Location, at: DateTime<Utc>) -> SunResult<f64>;
}
