//! Event horizon: the nearest solar transition and the phase that holds until it.
//!
//! Every tracked transition is a candidate `(instant, phase before it)`. The
//! nearest one is found with a plain fold over the candidates, starting from a
//! sentinel well past any real event. Solar noon and solar midnight carry no
//! phase of their own; when one of them wins, the phase is classified from the
//! elevation at that instant instead.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Location;
use super::phase::Phase;
use super::provider::{SolarEventKind, SolarPositionProvider};
use crate::common::constants::*;
use crate::error::{SunError, SunResult};

/// Which published "next" field a transition feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Published {
    Dawn,
    Rising,
    Noon,
    Setting,
    Dusk,
    Midnight,
}

/// One tracked transition.
#[derive(Debug, Clone, Copy)]
struct Transition {
    kind: SolarEventKind,
    depression: f64,
    /// Phase in effect until this transition happens.
    phase_before: Option<Phase>,
    published: Option<Published>,
}

const fn transition(
    kind: SolarEventKind,
    depression: f64,
    phase_before: Option<Phase>,
    published: Option<Published>,
) -> Transition {
    Transition {
        kind,
        depression,
        phase_before,
        published,
    }
}

/// Tracked transitions around the solar cycle, in evaluation order.
///
/// Ties keep the earlier entry, since a candidate only wins when strictly
/// earlier than the running minimum.
const TRANSITIONS: [Transition; 12] = [
    transition(SolarEventKind::Dawn, ASTRONOMICAL_DEPRESSION, Some(Phase::Night), None),
    transition(SolarEventKind::Dawn, NAUTICAL_DEPRESSION, Some(Phase::AstronomicalTwilight), None),
    transition(
        SolarEventKind::Dawn,
        CIVIL_DEPRESSION,
        Some(Phase::NauticalTwilight),
        Some(Published::Dawn),
    ),
    transition(
        SolarEventKind::Sunrise,
        SUNRISE_DEPRESSION,
        Some(Phase::Twilight),
        Some(Published::Rising),
    ),
    transition(SolarEventKind::Dawn, SMALL_DAY_DEPRESSION, Some(Phase::SmallDay), None),
    transition(SolarEventKind::SolarNoon, 0.0, None, Some(Published::Noon)),
    transition(SolarEventKind::Dusk, SMALL_DAY_DEPRESSION, Some(Phase::Day), None),
    transition(
        SolarEventKind::Sunset,
        SUNRISE_DEPRESSION,
        Some(Phase::SmallDay),
        Some(Published::Setting),
    ),
    transition(
        SolarEventKind::Dusk,
        CIVIL_DEPRESSION,
        Some(Phase::Twilight),
        Some(Published::Dusk),
    ),
    transition(SolarEventKind::Dusk, NAUTICAL_DEPRESSION, Some(Phase::NauticalTwilight), None),
    transition(
        SolarEventKind::Dusk,
        ASTRONOMICAL_DEPRESSION,
        Some(Phase::AstronomicalTwilight),
        None,
    ),
    transition(SolarEventKind::SolarMidnight, 0.0, None, Some(Published::Midnight)),
];

/// The six published upcoming event instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTransitions {
    /// Civil dawn
    pub dawn: DateTime<Utc>,
    /// Civil dusk
    pub dusk: DateTime<Utc>,
    pub rising: DateTime<Utc>,
    pub setting: DateTime<Utc>,
    pub noon: DateTime<Utc>,
    pub midnight: DateTime<Utc>,
}

/// Result of one horizon scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonOutcome {
    /// Instant the scan looked forward from.
    pub computed_at: DateTime<Utc>,
    /// Phase in effect from `computed_at` until `next_change`.
    pub phase: Phase,
    /// True when solar noon comes before solar midnight.
    pub rising: bool,
    pub next: NextTransitions,
    /// Earliest tracked transition; the horizon chain re-arms here.
    pub next_change: DateTime<Utc>,
    /// Whether the phase came from the elevation fallback.
    pub phase_from_elevation: bool,
}

/// Nearest candidate by instant, starting from `sentinel`.
///
/// A candidate replaces the running minimum only when strictly earlier, and
/// carries its phase (possibly none) with it.
pub fn nearest_transition<I>(sentinel: DateTime<Utc>, candidates: I) -> (DateTime<Utc>, Option<Phase>)
where
    I: IntoIterator<Item = (DateTime<Utc>, Option<Phase>)>,
{
    candidates
        .into_iter()
        .fold((sentinel, None), |(earliest, phase), (instant, candidate_phase)| {
            if instant < earliest {
                (instant, candidate_phase)
            } else {
                (earliest, phase)
            }
        })
}

/// Scan all tracked transitions forward from `now`.
///
/// Errors from the provider propagate. An earliest instant that is not
/// strictly after `now` is reported as a scheduling invariant violation.
pub fn compute_horizon<P>(provider: &P, location: &Location, now: DateTime<Utc>) -> SunResult<HorizonOutcome>
where
    P: SolarPositionProvider + ?Sized,
{
    let mut candidates = Vec::with_capacity(TRANSITIONS.len());
    let mut published = [None; 6];

    for transition in &TRANSITIONS {
        let instant = provider.next_event(location, transition.depression, transition.kind, now)?;
        if let Some(field) = transition.published {
            published[field as usize] = Some(instant);
        }
        candidates.push((instant, transition.phase_before));
    }

    let sentinel = now + Duration::days(HORIZON_SENTINEL_DAYS);
    let (next_change, pending_phase) = nearest_transition(sentinel, candidates);

    if next_change <= now {
        return Err(SunError::SchedulingInvariant(format!(
            "earliest transition {} is not after {}",
            next_change.to_rfc3339(),
            now.to_rfc3339()
        )));
    }

    let (phase, phase_from_elevation) = match pending_phase {
        Some(phase) => (phase, false),
        None => {
            let elevation = provider.elevation(location, next_change)?;
            (Phase::from_elevation(elevation), true)
        }
    };

    let field = |which: Published| -> SunResult<DateTime<Utc>> {
        published[which as usize].ok_or_else(|| {
            SunError::SchedulingInvariant(format!("{which:?} transition was not evaluated"))
        })
    };
    let next = NextTransitions {
        dawn: field(Published::Dawn)?,
        dusk: field(Published::Dusk)?,
        rising: field(Published::Rising)?,
        setting: field(Published::Setting)?,
        noon: field(Published::Noon)?,
        midnight: field(Published::Midnight)?,
    };

    Ok(HorizonOutcome {
        computed_at: now,
        phase,
        rising: next.noon < next.midnight,
        next,
        next_change,
        phase_from_elevation,
    })
}
