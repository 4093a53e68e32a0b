//! Published sun state.
//!
//! A [`SolarSnapshot`] is built whole from the latest horizon outcome and one
//! position reading, then swapped in as a unit. Nothing mutates a snapshot
//! after it is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Location;
use super::brightness::brightness_percent;
use super::horizon::{HorizonOutcome, NextTransitions, compute_horizon};
use super::phase::{HorizonState, Phase};
use super::provider::SolarPositionProvider;
use crate::error::SunResult;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sun state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarSnapshot {
    /// Instant of the position reading.
    pub updated_at: DateTime<Utc>,
    /// Degrees, rounded to two decimals.
    pub elevation: f64,
    /// Degrees clockwise from north, rounded to two decimals.
    pub azimuth: f64,
    pub phase: Phase,
    pub rising: bool,
    /// Percent, 0..=100.
    pub brightness: u8,
    pub next: NextTransitions,
}

impl SolarSnapshot {
    /// Combine a horizon outcome with a fresh position reading.
    ///
    /// Brightness is derived from the rounded elevation, the same value that
    /// gets published.
    pub fn new(horizon: &HorizonOutcome, at: DateTime<Utc>, elevation: f64, azimuth: f64) -> Self {
        let elevation = round2(elevation);
        Self {
            updated_at: at,
            elevation,
            azimuth: round2(azimuth),
            phase: horizon.phase,
            rising: horizon.rising,
            brightness: brightness_percent(elevation),
            next: horizon.next,
        }
    }

    /// One-off snapshot at `at`: a full horizon scan plus a position reading.
    pub fn compute<P>(provider: &P, location: &Location, at: DateTime<Utc>) -> SunResult<Self>
    where
        P: SolarPositionProvider + ?Sized,
    {
        let horizon = compute_horizon(provider, location, at)?;
        let elevation = provider.elevation(location, at)?;
        let azimuth = provider.azimuth(location, at)?;
        Ok(Self::new(&horizon, at, elevation, azimuth))
    }

    pub fn state(&self) -> HorizonState {
        HorizonState::from_elevation(self.elevation)
    }

    pub fn published(&self) -> PublishedState {
        PublishedState {
            state: self.state(),
            attributes: SnapshotAttributes {
                next_dawn: self.next.dawn,
                next_dusk: self.next.dusk,
                next_midnight: self.next.midnight,
                next_noon: self.next.noon,
                next_rising: self.next.rising,
                next_setting: self.next.setting,
                elevation: self.elevation,
                azimuth: self.azimuth,
                rising: self.rising,
                phase: self.phase,
                brightness: self.brightness,
            },
        }
    }
}

/// Attribute set of the published read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotAttributes {
    pub next_dawn: DateTime<Utc>,
    pub next_dusk: DateTime<Utc>,
    pub next_midnight: DateTime<Utc>,
    pub next_noon: DateTime<Utc>,
    pub next_rising: DateTime<Utc>,
    pub next_setting: DateTime<Utc>,
    pub elevation: f64,
    pub azimuth: f64,
    pub rising: bool,
    pub phase: Phase,
    pub brightness: u8,
}

/// Primary state plus attributes, as serialized for consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedState {
    pub state: HorizonState,
    pub attributes: SnapshotAttributes,
}
