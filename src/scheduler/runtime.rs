//! Drives an [`AdaptiveScheduler`] on the process clock.
//!
//! The loop sleeps until the next timer deadline, fires every due timer with
//! the instant it was scheduled for, and reacts to signals between firings.
//! Real-time sleeps are cut into short slices so a shutdown or reload request
//! is noticed promptly.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::time::Duration as StdDuration;

use super::timer::TimerQueue;
use super::{AdaptiveScheduler, SnapshotSink};
use crate::common::constants::MAX_SLEEP_SLICE_MS;
use crate::config;
use crate::error::{SunError, SunResult};
use crate::signals::{SignalMessage, SignalState};
use crate::solar::provider::SolarPositionProvider;
use crate::time::source;

/// Why [`Runtime::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Signal,
    SimulationEnded,
    /// Nothing left to fire in a simulation.
    Idle,
}

pub struct Runtime<P, S> {
    scheduler: AdaptiveScheduler<P, TimerQueue, S>,
    signals: SignalState,
    /// Reloaded on SIGHUP/SIGUSR2 when set.
    config_path: Option<PathBuf>,
}

impl<P, S> Runtime<P, S>
where
    P: SolarPositionProvider,
    S: SnapshotSink,
{
    pub fn new(scheduler: AdaptiveScheduler<P, TimerQueue, S>, signals: SignalState) -> Self {
        Self {
            scheduler,
            signals,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn scheduler(&self) -> &AdaptiveScheduler<P, TimerQueue, S> {
        &self.scheduler
    }

    pub fn into_scheduler(self) -> AdaptiveScheduler<P, TimerQueue, S> {
        self.scheduler
    }

    /// Run until a shutdown signal, the end of a simulation, or an invariant
    /// violation. Timers are always cancelled on the way out.
    pub fn run(&mut self) -> Result<StopReason> {
        let result = self.run_loop();
        self.scheduler.shutdown();
        result
    }

    fn run_loop(&mut self) -> Result<StopReason> {
        loop {
            if !self.signals.is_running() {
                return Ok(StopReason::Signal);
            }
            if let Some(reason) = self.drain_signals()? {
                return Ok(reason);
            }

            let now = source::now();
            self.fire_due(now)?;

            if source::simulation_ended() {
                return Ok(StopReason::SimulationEnded);
            }

            let Some(deadline) = self.scheduler.timer().next_deadline() else {
                // Idle until a reload brings a usable location back.
                if source::is_simulated() {
                    return Ok(StopReason::Idle);
                }
                source::sleep(StdDuration::from_millis(MAX_SLEEP_SLICE_MS));
                continue;
            };

            let wait = (deadline - now).to_std().unwrap_or(StdDuration::ZERO);
            if wait.is_zero() {
                continue;
            }
            source::sleep(sleep_slice(wait, source::is_simulated()));
        }
    }

    /// Fire every timer due at `now`, in due order. Returns how many fired.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> SunResult<usize> {
        let mut fired = 0;
        while let Some(firing) = self.scheduler.timer_mut().pop_due(now) {
            self.scheduler.fire(firing)?;
            fired += 1;
        }
        Ok(fired)
    }

    fn drain_signals(&mut self) -> Result<Option<StopReason>> {
        loop {
            match self.signals.signal_receiver.try_recv() {
                Ok(SignalMessage::Shutdown) => return Ok(Some(StopReason::Signal)),
                Ok(SignalMessage::Reload) => self.reload(source::now())?,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return Ok(None),
            }
        }
    }

    /// Re-read the configuration and restart the chains if anything changed.
    ///
    /// A configuration that fails to load leaves the running tracker untouched.
    pub fn reload(&mut self, now: DateTime<Utc>) -> Result<()> {
        let Some(path) = self.config_path.clone() else {
            log_warning!("Reload requested but no configuration file is in use");
            return Ok(());
        };

        log_block_start!("Reloading configuration");
        let loaded = config::load_from_path(&path).and_then(|config| {
            let location = config.location()?;
            Ok((location, config.scheduler_settings()))
        });
        let (location, settings) = match loaded {
            Ok(values) => values,
            Err(e) => {
                log_warning!("Keeping current configuration: {e:#}");
                return Ok(());
            }
        };

        let settings_changed = settings != *self.scheduler.settings();
        let location_changed = location.as_ref() != self.scheduler.location();
        if !settings_changed && !location_changed {
            log_indented!("No changes");
            return Ok(());
        }

        if settings_changed {
            log_indented!("Cadence settings changed");
            self.scheduler.set_settings(settings);
        }
        if location_changed {
            match &location {
                Some(new_location) => log_indented!("Location changed to {new_location}"),
                None => log_indented!("Location removed"),
            }
        }

        match self.scheduler.set_location(location, now) {
            Ok(()) => {
                log_info!("Tracking restarted");
                Ok(())
            }
            Err(e @ (SunError::Configuration(_) | SunError::ProviderComputation(_))) => {
                log_error!("Tracking stopped: {e}");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to restart tracking after reload"),
        }
    }
}

/// How long to sleep towards a deadline `wait` away.
///
/// Real time sleeps in bounded slices. Simulated time jumps straight to the
/// deadline.
pub fn sleep_slice(wait: StdDuration, simulated: bool) -> StdDuration {
    if simulated {
        wait
    } else {
        wait.min(StdDuration::from_millis(MAX_SLEEP_SLICE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::settings::SchedulerSettings;
    use crate::scheduler::timer::{Chain, Timer};
    use crate::solar::Location;
    use crate::solar::provider::MockSolarPositionProvider;
    use crate::solar::snapshot::SolarSnapshot;
    use crate::solar::spa::SpaProvider;
    use chrono::{Duration, TimeZone};
    use std::fs;
    use tempfile::tempdir;

    #[derive(Default)]
    struct CountingSink(usize);

    impl SnapshotSink for CountingSink {
        fn publish(&mut self, _snapshot: &SolarSnapshot) -> anyhow::Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    fn runtime() -> Runtime<SpaProvider, CountingSink> {
        crate::common::logger::Log::set_enabled(false);
        let scheduler = AdaptiveScheduler::new(
            SpaProvider::new(),
            TimerQueue::new(),
            CountingSink::default(),
            SchedulerSettings::default(),
        );
        Runtime::new(scheduler, SignalState::detached())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 21, 4, 0, 0).unwrap()
    }

    #[test]
    fn test_sleep_slice() {
        let long = StdDuration::from_secs(600);
        assert_eq!(sleep_slice(long, false), StdDuration::from_millis(MAX_SLEEP_SLICE_MS));
        assert_eq!(sleep_slice(long, true), long);
        let short = StdDuration::from_millis(10);
        assert_eq!(sleep_slice(short, false), short);
    }

    #[test]
    fn test_fire_due_processes_in_order() {
        let mut runtime = runtime();
        runtime
            .scheduler
            .start(Some(Location::new(51.5, 0.0).unwrap()), t0())
            .unwrap();

        assert_eq!(runtime.fire_due(t0()).unwrap(), 0);
        // Two SmallDay position ticks in four minutes.
        assert_eq!(runtime.fire_due(t0() + Duration::minutes(4)).unwrap(), 2);
        assert_eq!(runtime.scheduler().sink().0, 3);
    }

    #[test]
    fn test_reload_switches_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("suntrack.toml");
        fs::write(&path, "latitude = 51.5\nlongitude = 0.0\n").unwrap();

        let mut runtime = runtime().with_config_path(path.clone());
        runtime
            .scheduler
            .start(Some(Location::new(51.5, 0.0).unwrap()), t0())
            .unwrap();
        let before = runtime.scheduler().live_timer(Chain::Horizon);

        // Unchanged file: nothing restarts.
        runtime.reload(t0()).unwrap();
        assert_eq!(runtime.scheduler().live_timer(Chain::Horizon), before);

        fs::write(&path, "latitude = 59.91\nlongitude = 10.75\n").unwrap();
        runtime.reload(t0()).unwrap();
        assert_ne!(runtime.scheduler().live_timer(Chain::Horizon), before);
        assert_eq!(runtime.scheduler().location().unwrap().latitude(), 59.91);
        assert_eq!(runtime.scheduler().timer().pending(Chain::Horizon), 1);
    }

    #[test]
    fn test_reload_with_broken_file_keeps_running() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("suntrack.toml");
        fs::write(&path, "latitude = 95.0\nlongitude = 0.0\n").unwrap();

        let mut runtime = runtime().with_config_path(path);
        let london = Location::new(51.5, 0.0).unwrap();
        runtime.scheduler.start(Some(london), t0()).unwrap();

        runtime.reload(t0()).unwrap();
        assert_eq!(runtime.scheduler().location(), Some(&london));
        assert_eq!(runtime.scheduler().timer().pending(Chain::Horizon), 1);
    }

    #[test]
    fn test_reload_settings_change_restarts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("suntrack.toml");
        fs::write(&path, "latitude = 51.5\nlongitude = 0.0\n\n[intervals]\nsmall_day = 3\n").unwrap();

        let mut runtime = runtime().with_config_path(path);
        runtime
            .scheduler
            .start(Some(Location::new(51.5, 0.0).unwrap()), t0())
            .unwrap();
        runtime.reload(t0()).unwrap();

        let position = runtime
            .scheduler()
            .timer()
            .iter()
            .find(|f| f.chain == Chain::Position)
            .unwrap();
        assert_eq!(position.at, t0() + Duration::minutes(3));
    }

    #[test]
    fn test_run_stops_on_invariant_violation() {
        crate::common::logger::Log::set_enabled(false);
        let start = source::now();
        // Sane at start, then every transition lands on the scan instant.
        let mut provider = MockSolarPositionProvider::new();
        provider
            .expect_next_event()
            .returning(move |_, _, _, from| {
                if from <= start {
                    Ok(from + Duration::milliseconds(50))
                } else {
                    Ok(from)
                }
            });
        provider.expect_elevation().returning(|_, _| Ok(10.0));
        provider.expect_azimuth().returning(|_, _| Ok(180.0));

        let mut scheduler = AdaptiveScheduler::new(
            provider,
            TimerQueue::new(),
            CountingSink::default(),
            SchedulerSettings::default(),
        );
        scheduler
            .start(Some(Location::new(51.5, 0.0).unwrap()), start)
            .unwrap();

        let mut runtime = Runtime::new(scheduler, SignalState::detached());
        let err = runtime.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SunError>(),
            Some(SunError::SchedulingInvariant(_))
        ));
        assert!(runtime.scheduler().timer().is_empty());
    }
}
