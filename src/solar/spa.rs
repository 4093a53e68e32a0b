//! Bundled position provider built on the NREL solar position algorithm.
//!
//! Positions come from `solar_positioning::spa` without refraction, so the
//! elevation is geometric; the standard sunrise depression of 0.833° already
//! accounts for refraction and the solar radius on the event side.
//!
//! Events are looked up one UTC day at a time. A crossing that does not
//! happen within the lookahead (polar day or night) is reported as the end of
//! the searched window: the event cannot come any sooner, and that bound only
//! moves forward as the search start does.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use solar_positioning::{Horizon, SolarPosition, SunriseResult, spa};

use super::Location;
use super::provider::{SolarEventKind, SolarPositionProvider};
use crate::common::constants::{DELTA_T_SECONDS, EVENT_LOOKAHEAD_DAYS, SUNRISE_DEPRESSION};
use crate::error::{SunError, SunResult};

/// Provider backed by `solar_positioning::spa`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaProvider;

impl SpaProvider {
    pub fn new() -> Self {
        Self
    }
}

fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Shift a transit by whole days so it lands within half a day of mean
/// solar noon on `day`. The true transit is never more than about 17 minutes
/// from mean noon, so this picks the transit belonging to `day`.
fn onto_day(location: &Location, day: DateTime<Utc>, transit: DateTime<Utc>) -> DateTime<Utc> {
    let mean_noon =
        day + Duration::hours(12) - Duration::milliseconds((location.longitude() * 240_000.0) as i64);
    let day_ms = Duration::days(1).num_milliseconds();
    let offset = ((transit - mean_noon).num_milliseconds() + day_ms / 2).rem_euclid(day_ms) - day_ms / 2;
    mean_noon + Duration::milliseconds(offset)
}

fn solar_day(location: &Location, day: DateTime<Utc>, elevation_angle: f64) -> SunResult<SunriseResult> {
    spa::sunrise_sunset_for_horizon(
        day,
        location.latitude(),
        location.longitude(),
        DELTA_T_SECONDS,
        Horizon::Custom(elevation_angle),
    )
    .map_err(|e| {
        SunError::ProviderComputation(format!(
            "solar events for {} at {location}: {e}",
            day.date_naive()
        ))
    })
}

/// Upper transit on `day`. Polar days and nights still have one.
fn transit_on(location: &Location, day: DateTime<Utc>) -> SunResult<DateTime<Utc>> {
    let transit = match solar_day(location, day, -SUNRISE_DEPRESSION)? {
        SunriseResult::RegularDay { transit, .. }
        | SunriseResult::AllDay { transit }
        | SunriseResult::AllNight { transit } => transit,
    };
    Ok(onto_day(location, day, transit))
}

/// Instant of `kind` computed for the UTC day starting at `day`, if the sun
/// crosses the requested elevation that day.
fn event_on(
    location: &Location,
    depression: f64,
    kind: SolarEventKind,
    day: DateTime<Utc>,
) -> SunResult<Option<DateTime<Utc>>> {
    match kind {
        SolarEventKind::SolarNoon => transit_on(location, day).map(Some),
        // Half a day after the upper transit, to within seconds.
        SolarEventKind::SolarMidnight => {
            transit_on(location, day).map(|noon| Some(noon + Duration::hours(12)))
        }
        _ => match solar_day(location, day, -depression)? {
            SunriseResult::RegularDay {
                sunrise, sunset, ..
            } => Ok(Some(if kind.is_morning() { sunrise } else { sunset })),
            SunriseResult::AllDay { .. } | SunriseResult::AllNight { .. } => Ok(None),
        },
    }
}

fn check_finite(value: f64, what: &str, at: DateTime<Utc>) -> SunResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SunError::ProviderComputation(format!(
            "{what} is not finite at {}",
            at.to_rfc3339()
        )))
    }
}

impl SpaProvider {
    fn position(&self, location: &Location, at: DateTime<Utc>) -> SunResult<SolarPosition> {
        spa::solar_position_no_refraction(
            at,
            location.latitude(),
            location.longitude(),
            location.elevation().unwrap_or(0.0),
            DELTA_T_SECONDS,
        )
        .map_err(|e| {
            SunError::ProviderComputation(format!(
                "solar position at {} for {location}: {e}",
                at.to_rfc3339()
            ))
        })
    }
}

impl SolarPositionProvider for SpaProvider {
    fn next_event(
        &self,
        location: &Location,
        depression: f64,
        kind: SolarEventKind,
        from: DateTime<Utc>,
    ) -> SunResult<DateTime<Utc>> {
        // Start one day early: with extreme longitudes an event computed for
        // yesterday's UTC date can still land after `from`.
        let first_day = day_start(from) - Duration::days(1);

        // Searched one day past the reported bound: a crossing computed for a
        // later date can fall up to a day before that date starts.
        for offset in 0..=EVENT_LOOKAHEAD_DAYS + 2 {
            let day = first_day + Duration::days(offset);
            let Some(found) = event_on(location, depression, kind, day)?.filter(|at| *at > from)
            else {
                continue;
            };
            // Events of neighbouring days can straddle midnight UTC.
            let following = event_on(location, depression, kind, day + Duration::days(1))?
                .filter(|at| *at > from);
            return Ok(following.map_or(found, |other| other.min(found)));
        }

        Ok(first_day + Duration::days(EVENT_LOOKAHEAD_DAYS + 2))
    }

    fn elevation(&self, location: &Location, at: DateTime<Utc>) -> SunResult<f64> {
        let position = self.position(location, at)?;
        check_finite(position.elevation_angle(), "elevation", at)
    }

    fn azimuth(&self, location: &Location, at: DateTime<Utc>) -> SunResult<f64> {
        let position = self.position(location, at)?;
        check_finite(position.azimuth(), "azimuth", at)
    }
}
