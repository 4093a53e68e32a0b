//! Configuration validation.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;
use crate::solar::Phase;

/// Reject values the tracker cannot run with.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if config.latitude.is_some() != config.longitude.is_some() {
        anyhow::bail!("latitude and longitude must be set together");
    }

    if let Some(elevation) = config.elevation
        && !elevation.is_finite()
    {
        anyhow::bail!("elevation must be a finite number of meters");
    }

    if let Some(factor) = config.suppression_factor
        && !(MINIMUM_SUPPRESSION_FACTOR..=MAXIMUM_SUPPRESSION_FACTOR).contains(&factor)
    {
        anyhow::bail!(
            "suppression_factor ({}) must be between {} and {}",
            factor,
            MINIMUM_SUPPRESSION_FACTOR,
            MAXIMUM_SUPPRESSION_FACTOR
        );
    }

    if let Some(intervals) = &config.intervals {
        for phase in Phase::ALL {
            if let Some(minutes) = intervals.minutes(phase)
                && !(MINIMUM_INTERVAL_MINUTES as u64..=MAXIMUM_INTERVAL_MINUTES as u64)
                    .contains(&minutes)
            {
                anyhow::bail!(
                    "intervals.{} ({} min) must be between {} and {} minutes",
                    phase.as_str(),
                    minutes,
                    MINIMUM_INTERVAL_MINUTES,
                    MAXIMUM_INTERVAL_MINUTES
                );
            }
        }
    }

    Ok(())
}
