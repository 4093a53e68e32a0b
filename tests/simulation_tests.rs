//! Runtime loop on a fast-forwarded clock.
//!
//! The process clock is global, so this file holds a single test.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use suntrack::common::logger::Log;
use suntrack::scheduler::runtime::{Runtime, StopReason};
use suntrack::scheduler::{AdaptiveScheduler, JsonLinesSink, SchedulerSettings, TimerQueue};
use suntrack::signals::SignalState;
use suntrack::solar::{Location, SpaProvider};
use suntrack::time::source::{self, SimulatedTimeSource};

#[test]
fn test_fast_forward_morning_publishes_json_lines() {
    Log::set_enabled(false);
    let start = Utc.with_ymd_and_hms(2020, 6, 21, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2020, 6, 21, 6, 0, 0).unwrap();
    source::init_time_source(Arc::new(SimulatedTimeSource::new(start, end, 0.0)));

    let mut scheduler = AdaptiveScheduler::new(
        SpaProvider::new(),
        TimerQueue::new(),
        JsonLinesSink::new(Vec::new()),
        SchedulerSettings::default(),
    );
    scheduler
        .start(Some(Location::new(51.5, 0.0).unwrap()), source::now())
        .unwrap();

    let mut runtime = Runtime::new(scheduler, SignalState::detached());
    let reason = runtime.run().unwrap();
    assert_eq!(reason, StopReason::SimulationEnded);

    let scheduler = runtime.into_scheduler();
    // Shutdown cancelled both chains.
    assert!(scheduler.timer().is_empty());

    let output = String::from_utf8(scheduler.sink().get_ref().clone()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(lines.len() > 20);

    let first = &lines[0];
    assert_eq!(first["state"], "below_horizon");
    assert_eq!(first["attributes"]["phase"], "astronomical_twilight");

    let last = lines.last().unwrap();
    assert_eq!(last["state"], "above_horizon");
    assert_eq!(last["attributes"]["phase"], "day");
    assert_eq!(last["attributes"]["rising"], true);
}
