//! Adaptive scheduling of sun state recomputation.
//!
//! The scheduler owns two self-rearming one-shot timer chains:
//!
//! - **Horizon chain**: runs at each nearest transition. Recomputes the phase,
//!   the rising flag and the six published next instants, re-arms at the new
//!   nearest transition, then reads position immediately.
//! - **Position chain**: runs every few minutes. Recomputes elevation, azimuth
//!   and brightness, publishes a new snapshot, and re-arms after the interval
//!   for the current phase unless the next horizon change is too close, in
//!   which case the horizon firing takes over.
//!
//! Firings are processed one at a time through `&mut self`, end to end, so the
//! two chains never observe each other mid-update. Each chain holds at most
//! one live timer; re-arming cancels the previous handle first.

pub mod runtime;
pub mod settings;
pub mod sink;
pub mod timer;

pub use runtime::Runtime;
pub use settings::{PhaseIntervals, SchedulerSettings};
pub use sink::{JsonLinesSink, LogSink, SnapshotSink};
pub use timer::{Chain, Firing, Timer, TimerHandle, TimerQueue};

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::error::{SunError, SunResult};
use crate::solar::horizon::{HorizonOutcome, compute_horizon};
use crate::solar::phase::Phase;
use crate::solar::provider::SolarPositionProvider;
use crate::solar::snapshot::SolarSnapshot;
use crate::solar::Location;

/// Where the next position firing goes, if anywhere.
///
/// Returns `None` when `fired_at + window` passes `next_change`: the horizon
/// firing at `next_change` reads position itself.
pub fn next_position_instant(
    fired_at: DateTime<Utc>,
    interval: Duration,
    window: Duration,
    next_change: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if fired_at + window > next_change {
        None
    } else {
        Some(fired_at + interval)
    }
}

/// Tracks one observer and republishes sun state with minimal recomputation.
pub struct AdaptiveScheduler<P, T, S> {
    provider: P,
    timer: T,
    sink: S,
    settings: SchedulerSettings,
    location: Option<Location>,
    horizon: Option<HorizonOutcome>,
    snapshot: Option<Arc<SolarSnapshot>>,
    horizon_timer: Option<TimerHandle>,
    position_timer: Option<TimerHandle>,
}

impl<P, T, S> AdaptiveScheduler<P, T, S>
where
    P: SolarPositionProvider,
    T: Timer,
    S: SnapshotSink,
{
    /// Create an idle scheduler. Nothing is armed until [`Self::start`].
    pub fn new(provider: P, timer: T, sink: S, settings: SchedulerSettings) -> Self {
        Self {
            provider,
            timer,
            sink,
            settings,
            location: None,
            horizon: None,
            snapshot: None,
            horizon_timer: None,
            position_timer: None,
        }
    }

    /// Start tracking `location`, running both chains once at `now`.
    ///
    /// Fails with [`SunError::Configuration`] when there is no location;
    /// no timers are armed in that case.
    pub fn start(&mut self, location: Option<Location>, now: DateTime<Utc>) -> SunResult<()> {
        self.set_location(location, now)?;
        if let Some(location) = &self.location {
            log_debug!("Tracking started for {location}");
        }
        Ok(())
    }

    /// Replace the observer location and restart both chains at `now`.
    ///
    /// Live timers are cancelled first. Without a location the scheduler is
    /// left idle and the error is returned to the caller.
    pub fn set_location(&mut self, location: Option<Location>, now: DateTime<Utc>) -> SunResult<()> {
        self.cancel_all();
        self.horizon = None;
        self.snapshot = None;

        let Some(location) = location else {
            self.location = None;
            return Err(SunError::Configuration(
                "no observer location configured".to_string(),
            ));
        };
        self.location = Some(location);
        self.run_horizon(now)
    }

    /// Process one timer firing.
    ///
    /// Provider failures are logged and contained. Invariant violations are
    /// logged as critical and returned.
    pub fn fire(&mut self, firing: Firing) -> SunResult<()> {
        let live = match firing.chain {
            Chain::Horizon => self.horizon_timer,
            Chain::Position => self.position_timer,
        };
        if live != Some(firing.handle) {
            let err = SunError::SchedulingInvariant(format!(
                "{} firing {} does not match the live timer {:?}",
                firing.chain,
                firing.handle.id(),
                live.map(|h| h.id())
            ));
            log_critical!("{err}");
            return Err(err);
        }

        // The firing consumes the handle.
        match firing.chain {
            Chain::Horizon => {
                self.horizon_timer = None;
                self.run_horizon(firing.at)
            }
            Chain::Position => {
                self.position_timer = None;
                self.run_position(firing.at)
            }
        }
    }

    /// Replace the cadence settings. Applies from the next arming; call
    /// [`Self::set_location`] to restart the chains right away.
    pub fn set_settings(&mut self, settings: SchedulerSettings) {
        self.settings = settings;
    }

    /// Cancel both chains. The scheduler keeps its last snapshot.
    pub fn shutdown(&mut self) {
        self.cancel_all();
        log_debug!("Scheduler timers cancelled");
    }

    fn cancel_all(&mut self) {
        if let Some(handle) = self.horizon_timer.take() {
            self.timer.cancel(handle);
        }
        if let Some(handle) = self.position_timer.take() {
            self.timer.cancel(handle);
        }
    }

    fn run_horizon(&mut self, now: DateTime<Utc>) -> SunResult<()> {
        let location = self.location.ok_or_else(|| {
            SunError::Configuration("no observer location configured".to_string())
        })?;

        let outcome = match compute_horizon(&self.provider, &location, now) {
            Ok(outcome) => outcome,
            Err(err) if err.is_contained() => {
                // Keep the chain alive; try again after one position interval.
                let retry = now + self.settings.interval(self.current_phase());
                log_error!("Horizon update failed: {err}");
                log_indented!("Retrying at {}", retry.to_rfc3339());
                return self.arm(Chain::Horizon, retry);
            }
            Err(err) => {
                log_critical!("{err}");
                return Err(err);
            }
        };

        log_debug!(
            "sun phase update@{}: phase={}",
            now.to_rfc3339(),
            outcome.phase.as_str()
        );

        self.horizon = Some(outcome);
        self.arm(Chain::Horizon, outcome.next_change)?;
        log_debug!("next horizon update: {}", outcome.next_change.to_rfc3339());

        self.run_position(now)
    }

    fn run_position(&mut self, now: DateTime<Utc>) -> SunResult<()> {
        // A horizon firing reads position itself; drop whatever was pending.
        if let Some(handle) = self.position_timer.take() {
            self.timer.cancel(handle);
        }

        let (Some(location), Some(horizon)) = (self.location, self.horizon) else {
            let err = SunError::SchedulingInvariant(
                "position update without a horizon outcome".to_string(),
            );
            log_critical!("{err}");
            return Err(err);
        };

        match self.read_position(&location, now) {
            Ok((elevation, azimuth)) => {
                let snapshot = Arc::new(SolarSnapshot::new(&horizon, now, elevation, azimuth));
                self.snapshot = Some(Arc::clone(&snapshot));
                log_debug!(
                    "sun position update@{}: elevation={} azimuth={}",
                    now.to_rfc3339(),
                    snapshot.elevation,
                    snapshot.azimuth
                );
                if let Err(err) = self.sink.publish(&snapshot) {
                    log_error!("Failed to publish sun state: {err:#}");
                }
            }
            Err(err) if err.is_contained() => {
                log_error!("Position update failed, skipping publish: {err}");
            }
            Err(err) => {
                log_critical!("{err}");
                return Err(err);
            }
        }

        let interval = self.settings.interval(horizon.phase);
        let window = self.settings.suppression_window(horizon.phase);
        match next_position_instant(now, interval, window, horizon.next_change) {
            Some(at) => self.arm(Chain::Position, at),
            None => {
                log_debug!(
                    "position update suppressed, horizon change at {}",
                    horizon.next_change.to_rfc3339()
                );
                Ok(())
            }
        }
    }

    fn read_position(&self, location: &Location, at: DateTime<Utc>) -> SunResult<(f64, f64)> {
        let elevation = self.provider.elevation(location, at)?;
        let azimuth = self.provider.azimuth(location, at)?;
        Ok((elevation, azimuth))
    }

    /// Arm `chain` at `at`, replacing its live timer.
    fn arm(&mut self, chain: Chain, at: DateTime<Utc>) -> SunResult<()> {
        let slot = match chain {
            Chain::Horizon => &mut self.horizon_timer,
            Chain::Position => &mut self.position_timer,
        };
        if let Some(previous) = slot.take() {
            self.timer.cancel(previous);
        }
        if self.timer.pending(chain) > 0 {
            let err = SunError::SchedulingInvariant(format!(
                "{chain} chain already has a live timer"
            ));
            log_critical!("{err}");
            return Err(err);
        }
        *slot = Some(self.timer.schedule_once(at, chain));
        Ok(())
    }

    fn current_phase(&self) -> Phase {
        self.horizon.map(|h| h.phase).unwrap_or(Phase::Night)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Option<Arc<SolarSnapshot>> {
        self.snapshot.clone()
    }

    pub fn horizon(&self) -> Option<&HorizonOutcome> {
        self.horizon.as_ref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.horizon.map(|h| h.phase)
    }

    /// Instant of the next horizon firing.
    pub fn next_change(&self) -> Option<DateTime<Utc>> {
        self.horizon.map(|h| h.next_change)
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Live timer handle of `chain`.
    pub fn live_timer(&self, chain: Chain) -> Option<TimerHandle> {
        match chain {
            Chain::Horizon => self.horizon_timer,
            Chain::Position => self.position_timer,
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
