use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use suntrack::SunResult;
use suntrack::solar::{
    HorizonOutcome, Location, Phase, SolarEventKind, SolarPositionProvider, SpaProvider,
    compute_horizon,
};

fn utc(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
}

/// The six published instants in a fixed order.
fn published(outcome: &HorizonOutcome) -> [DateTime<Utc>; 6] {
    let next = outcome.next;
    [next.dawn, next.dusk, next.rising, next.setting, next.noon, next.midnight]
}

/// Bundled provider, except that the sun never sets: every evening crossing
/// is looked up at an elevation the sun does not reach outside the tropics.
struct EndlessDay(SpaProvider);

impl SolarPositionProvider for EndlessDay {
    fn next_event(
        &self,
        location: &Location,
        depression: f64,
        kind: SolarEventKind,
        from: DateTime<Utc>,
    ) -> SunResult<DateTime<Utc>> {
        let depression = match kind {
            SolarEventKind::Dusk | SolarEventKind::Sunset => -80.0,
            _ => depression,
        };
        self.0.next_event(location, depression, kind, from)
    }

    fn elevation(&self, location: &Location, at: DateTime<Utc>) -> SunResult<f64> {
        self.0.elevation(location, at)
    }

    fn azimuth(&self, location: &Location, at: DateTime<Utc>) -> SunResult<f64> {
        self.0.azimuth(location, at)
    }
}

/// Instants spread over 2019-2025.
fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (1_546_300_800i64..1_767_225_600i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

/// Latitudes where every tracked event happens within the horizon sentinel.
fn temperate_latitude_strategy() -> impl Strategy<Value = f64> {
    -60.0..60.0
}

fn longitude_strategy() -> impl Strategy<Value = f64> {
    -180.0..=180.0
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The earliest transition is strictly in the future and no later than
    /// any published instant.
    #[test]
    fn test_next_change_is_future_minimum(
        lat in temperate_latitude_strategy(),
        lon in longitude_strategy(),
        now in instant_strategy()
    ) {
        let location = Location::new(lat, lon).unwrap();
        let outcome = compute_horizon(&SpaProvider::new(), &location, now).unwrap();
        let next = outcome.next;

        prop_assert!(outcome.next_change > now);
        for instant in [next.dawn, next.dusk, next.rising, next.setting, next.noon, next.midnight] {
            prop_assert!(instant > now);
            prop_assert!(outcome.next_change <= instant);
        }
    }

    /// Rising means solar noon comes before solar midnight.
    #[test]
    fn test_rising_matches_noon_before_midnight(
        lat in temperate_latitude_strategy(),
        lon in longitude_strategy(),
        now in instant_strategy()
    ) {
        let location = Location::new(lat, lon).unwrap();
        let outcome = compute_horizon(&SpaProvider::new(), &location, now).unwrap();
        prop_assert_eq!(outcome.rising, outcome.next.noon < outcome.next.midnight);
        // Noon and midnight alternate within a day.
        let gap = (outcome.next.noon - outcome.next.midnight).num_hours().abs();
        prop_assert!(gap <= 13, "noon/midnight gap {}h", gap);
    }

    /// Re-running from the earliest transition always makes progress.
    #[test]
    fn test_chaining_advances(
        lat in -89.9f64..89.9,
        lon in longitude_strategy(),
        now in instant_strategy()
    ) {
        let provider = SpaProvider::new();
        let location = Location::new(lat, lon).unwrap();
        let first = compute_horizon(&provider, &location, now).unwrap();
        let second = compute_horizon(&provider, &location, first.next_change).unwrap();
        prop_assert!(second.next_change > first.next_change);
        // Solar noon or midnight is never more than a day away.
        prop_assert!(first.next_change - now <= Duration::hours(25));
    }

    /// Successive scans from each earliest transition never move a published
    /// instant backward.
    #[test]
    fn test_published_instants_never_decrease(
        lat in temperate_latitude_strategy(),
        lon in longitude_strategy(),
        now in instant_strategy()
    ) {
        let provider = SpaProvider::new();
        let location = Location::new(lat, lon).unwrap();
        let mut previous = compute_horizon(&provider, &location, now).unwrap();
        for _ in 0..12 {
            let next = compute_horizon(&provider, &location, previous.next_change).unwrap();
            for (before, after) in published(&previous).into_iter().zip(published(&next)) {
                prop_assert!(after >= before, "{} -> {}", before, after);
            }
            previous = next;
        }
    }

    /// A phase taken from the elevation fallback matches the classifier at
    /// the transition instant.
    #[test]
    fn test_fallback_phase_matches_classifier(
        lat in -89.9f64..89.9,
        lon in longitude_strategy(),
        now in instant_strategy()
    ) {
        let provider = SpaProvider::new();
        let location = Location::new(lat, lon).unwrap();
        let outcome = compute_horizon(&provider, &location, now).unwrap();
        if outcome.phase_from_elevation {
            let elevation = provider.elevation(&location, outcome.next_change).unwrap();
            prop_assert_eq!(outcome.phase, Phase::from_elevation(elevation));
        }
    }
}

#[test]
fn test_polar_day_and_night() {
    let provider = SpaProvider::new();
    let solstice = Utc.with_ymd_and_hms(2020, 6, 21, 0, 0, 0).unwrap();

    for lat in [89.9, 78.2] {
        let location = Location::new(lat, 15.6).unwrap();
        let outcome = compute_horizon(&provider, &location, solstice).unwrap();
        assert_eq!(outcome.phase, Phase::Day, "latitude {lat}");
        assert!(outcome.phase_from_elevation);
        // Sunset is weeks away.
        assert!(outcome.next.setting - solstice > Duration::days(30));
    }

    let south = Location::new(-89.9, 0.0).unwrap();
    let outcome = compute_horizon(&provider, &south, solstice).unwrap();
    assert_eq!(outcome.phase, Phase::Night);
    // The sun comes back just before the September equinox.
    assert!(outcome.next.rising > utc(2020, 9, 19));
    assert!(outcome.next.rising < utc(2020, 9, 24));
}

#[test]
fn test_polar_published_instants_never_decrease() {
    // Near the pole around the March equinox the crossings come into range one
    // after another.
    let provider = SpaProvider::new();
    let location = Location::new(89.9, 180.0).unwrap();
    let mut previous = compute_horizon(&provider, &location, utc(2021, 3, 10)).unwrap();
    for _ in 0..30 {
        let next = compute_horizon(&provider, &location, previous.next_change).unwrap();
        for (before, after) in published(&previous).into_iter().zip(published(&next)) {
            assert!(after >= before, "{before} -> {after}");
        }
        previous = next;
    }
}

#[test]
fn test_absent_events_published_as_bound() {
    let provider = EndlessDay(SpaProvider::new());
    let location = Location::new(51.5, 0.0).unwrap();
    let now = utc(2020, 6, 21);

    let mut outcome = compute_horizon(&provider, &location, now).unwrap();
    // Absent crossings sit past the sentinel and never become the earliest.
    assert!(outcome.next.setting > now + Duration::days(400));
    assert!(outcome.next.dusk > now + Duration::days(400));
    assert!(outcome.next_change - now < Duration::hours(25));

    for _ in 0..8 {
        let next = compute_horizon(&provider, &location, outcome.next_change).unwrap();
        assert!(next.next.setting >= outcome.next.setting);
        assert!(next.next.dusk >= outcome.next.dusk);
        assert!(next.next.rising > outcome.computed_at);
        outcome = next;
    }
    // A few days on, the bound has moved forward with the scan.
    assert!(outcome.next.setting > now + Duration::days(401));
}
