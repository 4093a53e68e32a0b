//! One-shot timers for the two scheduling chains.
//!
//! A timer carries a [`Chain`] token instead of a closure; whoever drives the
//! queue hands the token back to the scheduler when the timer fires. Handles
//! are never reused, so a cancelled or consumed handle can never fire.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// The two independent self-rearming chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    /// Recomputes the nearest transition and the phase.
    Horizon,
    /// Recomputes elevation, azimuth and brightness.
    Position,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Horizon => f.write_str("horizon"),
            Chain::Position => f.write_str("position"),
        }
    }
}

/// Cancelable handle for a scheduled firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A timer that has come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub handle: TimerHandle,
    pub chain: Chain,
    /// The instant the timer was scheduled for.
    pub at: DateTime<Utc>,
}

/// Timer primitive consumed by the scheduler.
pub trait Timer {
    /// Schedule a single firing of `chain` at `at`.
    fn schedule_once(&mut self, at: DateTime<Utc>, chain: Chain) -> TimerHandle;

    /// Cancel a pending firing. Returns false when it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Number of pending firings for `chain`.
    fn pending(&self, chain: Chain) -> usize;
}

/// In-process timer queue ordered by due instant.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    /// Keyed by (due instant, handle) so equal instants fire in scheduling order.
    entries: BTreeMap<(DateTime<Utc>, TimerHandle), Chain>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instant of the earliest pending firing.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.entries.keys().next().map(|(at, _)| *at)
    }

    /// Remove and return the earliest firing due at or before `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<Firing> {
        let (&(at, handle), _) = self.entries.iter().next()?;
        if at > now {
            return None;
        }
        let chain = self.entries.remove(&(at, handle))?;
        Some(Firing { handle, chain, at })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending firings in due order.
    pub fn iter(&self) -> impl Iterator<Item = Firing> + '_ {
        self.entries
            .iter()
            .map(|(&(at, handle), &chain)| Firing { handle, chain, at })
    }
}

impl Timer for TimerQueue {
    fn schedule_once(&mut self, at: DateTime<Utc>, chain: Chain) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.entries.insert((at, handle), chain);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let key = self
            .entries
            .keys()
            .find(|(_, candidate)| *candidate == handle)
            .copied();
        match key {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    fn pending(&self, chain: Chain) -> usize {
        self.entries.values().filter(|c| **c == chain).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 21, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_pop_due_in_order() {
        let mut queue = TimerQueue::new();
        let late = queue.schedule_once(t0() + Duration::minutes(10), Chain::Horizon);
        let early = queue.schedule_once(t0() + Duration::minutes(4), Chain::Position);

        assert_eq!(queue.next_deadline(), Some(t0() + Duration::minutes(4)));
        assert!(queue.pop_due(t0()).is_none());

        let first = queue.pop_due(t0() + Duration::hours(1)).unwrap();
        assert_eq!(first.handle, early);
        assert_eq!(first.chain, Chain::Position);
        let second = queue.pop_due(t0() + Duration::hours(1)).unwrap();
        assert_eq!(second.handle, late);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_instants_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        let at = t0() + Duration::minutes(5);
        let a = queue.schedule_once(at, Chain::Horizon);
        let b = queue.schedule_once(at, Chain::Position);
        assert_eq!(queue.pop_due(at).unwrap().handle, a);
        assert_eq!(queue.pop_due(at).unwrap().handle, b);
    }

    #[test]
    fn test_cancel() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule_once(t0(), Chain::Position);
        assert_eq!(queue.pending(Chain::Position), 1);
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert_eq!(queue.pending(Chain::Position), 0);
        assert!(queue.pop_due(t0()).is_none());
    }

    #[test]
    fn test_handles_are_unique() {
        let mut queue = TimerQueue::new();
        let a = queue.schedule_once(t0(), Chain::Horizon);
        queue.pop_due(t0());
        let b = queue.schedule_once(t0(), Chain::Horizon);
        assert_ne!(a, b);
        assert!(!queue.cancel(a));
    }
}
