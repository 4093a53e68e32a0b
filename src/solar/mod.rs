//! Solar domain model: observer location, phases, brightness and the event horizon.
//!
//! ## Module Structure
//!
//! - [`provider`]: the `SolarPositionProvider` seam (elevation, azimuth, next event)
//! - [`spa`]: bundled provider on the NREL solar position algorithm
//! - [`phase`]: the six ordered phases and the elevation classifier
//! - [`brightness`]: piecewise cubic brightness model
//! - [`horizon`]: earliest-transition scan producing phase and next-event instants
//! - [`snapshot`]: the immutable published state

pub mod brightness;
pub mod horizon;
pub mod spa;
pub mod phase;
pub mod provider;
pub mod snapshot;

pub use brightness::brightness_percent;
pub use horizon::{HorizonOutcome, NextTransitions, compute_horizon};
pub use phase::{HorizonState, Phase};
pub use provider::{SolarEventKind, SolarPositionProvider};
pub use snapshot::{PublishedState, SolarSnapshot};
pub use spa::SpaProvider;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SunError, SunResult};

/// Observer position on Earth.
///
/// Immutable once built; a configuration change replaces it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    /// Meters above sea level, informational for providers that use it.
    elevation: Option<f64>,
}

impl Location {
    /// Build a validated location.
    ///
    /// Latitude must be within -90..=90 and longitude within -180..=180 degrees.
    pub fn new(latitude: f64, longitude: f64) -> SunResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SunError::Configuration(format!(
                "latitude must be between -90 and 90 degrees (got {latitude})"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SunError::Configuration(format!(
                "longitude must be between -180 and 180 degrees (got {longitude})"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            elevation: None,
        })
    }

    pub fn with_elevation(mut self, meters: f64) -> SunResult<Self> {
        if !meters.is_finite() {
            return Err(SunError::Configuration(format!(
                "elevation must be a finite number of meters (got {meters})"
            )));
        }
        self.elevation = Some(meters);
        Ok(self)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{ns}, {:.4}°{ew}",
            self.latitude.abs(),
            self.longitude.abs()
        )
    }
}
