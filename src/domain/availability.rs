//! Per-domain counters and the UP/DOWN edge detector.
//!
//! Counters are plain atomics so the hot path never serializes. The flag,
//! its `down since` moment, and the transition log sit behind one mutex that
//! is only taken to confirm an edge or to read the flag. A lock-free hint
//! mirrors the flag so a worker can tell whether an edge is even possible
//! before touching the mutex.
//!
//! An outcome only fires an edge when its request started at or after the
//! latest edge. Responses that were already in flight when the state changed
//! are counted but cannot flip it back.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::engine::Moment;
use crate::report::format_duration;

use super::outcome::{FailureCause, Verdict};
use super::target::Domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Up,
    Down,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded edge. Entries of a domain's log strictly alternate,
/// starting with `Down`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Down {
        at: DateTime<Local>,
        cause: FailureCause,
    },
    Up {
        at: DateTime<Local>,
        downtime: Duration,
    },
}

impl Transition {
    /// Status the domain entered with this edge.
    #[must_use]
    pub const fn entered(&self) -> Status {
        match self {
            Transition::Down { .. } => Status::Down,
            Transition::Up { .. } => Status::Up,
        }
    }

    #[must_use]
    pub const fn at(&self) -> DateTime<Local> {
        match self {
            Transition::Down { at, .. } | Transition::Up { at, .. } => *at,
        }
    }

    #[must_use]
    pub fn describe(&self, domain: &str) -> String {
        match self {
            Transition::Down { at, cause } => {
                format!("[{}] {} is DOWN ({})", at.format("%H:%M:%S"), domain, cause)
            }
            Transition::Up { at, downtime } => format!(
                "[{}] {} is back ONLINE (was down {})",
                at.format("%H:%M:%S"),
                domain,
                format_duration(*downtime)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
}

impl Counters {
    /// Holds once every writer of the domain has exited.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        match self.success.checked_add(self.failure) {
            Some(sum) => sum == self.total,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSnapshot {
    pub domain: Domain,
    pub counters: Counters,
    pub status: Status,
    pub down_since: Option<DateTime<Local>>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Copy)]
enum Availability {
    /// `since` is the latest recovery, `None` before the first outage.
    Up { since: Option<Moment> },
    Down { since: Moment },
}

#[derive(Debug)]
struct AvailabilityLog {
    availability: Availability,
    transitions: Vec<Transition>,
}

#[derive(Debug)]
pub struct DomainState {
    domain: Domain,
    total: AtomicU64,
    success: AtomicU64,
    failure: AtomicU64,
    down_hint: AtomicBool,
    log: Mutex<AvailabilityLog>,
}

impl DomainState {
    #[must_use]
    pub const fn new(domain: Domain) -> Self {
        Self {
            domain,
            total: AtomicU64::new(0),
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            down_hint: AtomicBool::new(false),
            log: Mutex::new(AvailabilityLog {
                availability: Availability::Up { since: None },
                transitions: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub const fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Counts one completed request and fires an edge if it is the first
    /// observation of a new state.
    ///
    /// `started` is when the request was issued and `now` when it completed.
    /// A request issued before the latest edge is stale: it still counts but
    /// never fires the opposite edge.
    ///
    /// Returns the transition when this call recorded it. Concurrent callers
    /// observing the same edge get `None`; exactly one of them wins.
    pub fn record_outcome(
        &self,
        verdict: Verdict,
        started: Moment,
        now: Moment,
    ) -> Option<Transition> {
        match verdict {
            Verdict::Success => self.success.fetch_add(1, Ordering::Relaxed),
            Verdict::Failure(_) => self.failure.fetch_add(1, Ordering::Relaxed),
        };
        self.total.fetch_add(1, Ordering::Relaxed);

        let looks_down = self.down_hint.load(Ordering::Acquire);
        match (verdict, looks_down) {
            (Verdict::Failure(cause), false) => self.mark_down(cause, started, now),
            (Verdict::Success, true) => self.mark_up(started, now),
            (Verdict::Failure(_), true) | (Verdict::Success, false) => None,
        }
    }

    fn mark_down(&self, cause: FailureCause, started: Moment, now: Moment) -> Option<Transition> {
        let mut log = self.lock_log();
        let Availability::Up { since } = log.availability else {
            return None;
        };
        if since.is_some_and(|recovered| started.instant < recovered.instant) {
            return None;
        }
        log.availability = Availability::Down { since: now };
        let transition = Transition::Down { at: now.wall, cause };
        log.transitions.push(transition.clone());
        self.down_hint.store(true, Ordering::Release);
        Some(transition)
    }

    fn mark_up(&self, started: Moment, now: Moment) -> Option<Transition> {
        let mut log = self.lock_log();
        let Availability::Down { since } = log.availability else {
            return None;
        };
        if started.instant < since.instant {
            return None;
        }
        let downtime = now.instant.saturating_duration_since(since.instant);
        log.availability = Availability::Up { since: Some(now) };
        let transition = Transition::Up {
            at: now.wall,
            downtime,
        };
        log.transitions.push(transition.clone());
        self.down_hint.store(false, Ordering::Release);
        Some(transition)
    }

    /// Lock-free read of the three counters. They may lag each other by a
    /// few requests while workers are running.
    #[must_use]
    pub fn counters(&self) -> Counters {
        Counters {
            total: self.total.load(Ordering::Relaxed),
            success: self.success.load(Ordering::Relaxed),
            failure: self.failure.load(Ordering::Relaxed),
        }
    }

    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn status(&self) -> Status {
        match self.lock_log().availability {
            Availability::Up { .. } => Status::Up,
            Availability::Down { .. } => Status::Down,
        }
    }

    #[must_use]
    pub fn is_down(&self) -> bool {
        self.status() == Status::Down
    }

    #[must_use]
    pub fn snapshot(&self) -> DomainSnapshot {
        let (status, down_since, transitions) = {
            let log = self.lock_log();
            let (status, down_since) = match log.availability {
                Availability::Up { .. } => (Status::Up, None),
                Availability::Down { since } => (Status::Down, Some(since.wall)),
            };
            (status, down_since, log.transitions.clone())
        };
        DomainSnapshot {
            domain: self.domain.clone(),
            counters: self.counters(),
            status,
            down_since,
            transitions,
        }
    }

    /// Final snapshot, taking the state by value when this is the last handle.
    #[must_use]
    pub fn into_snapshot(self: Arc<Self>) -> DomainSnapshot {
        match Arc::try_unwrap(self) {
            Ok(state) => state.finish(),
            Err(shared) => shared.snapshot(),
        }
    }

    fn finish(self) -> DomainSnapshot {
        let counters = self.counters();
        let log = self.log.into_inner().unwrap_or_else(PoisonError::into_inner);
        let (status, down_since) = match log.availability {
            Availability::Up { .. } => (Status::Up, None),
            Availability::Down { since } => (Status::Down, Some(since.wall)),
        };
        DomainSnapshot {
            domain: self.domain,
            counters,
            status,
            down_since,
            transitions: log.transitions,
        }
    }

    fn lock_log(&self) -> MutexGuard<'_, AvailabilityLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
