use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{AppError, AppResult, EngineError};

/// Stop condition checked by every worker before each request.
pub trait Pacing: Send + Sync + fmt::Debug {
    fn admit(&self, now: Instant) -> bool;
}

/// Absolute end of the run. Fixed once computed; `halt` only ever pulls it
/// in.
#[derive(Debug)]
pub struct Deadline {
    at: Instant,
    halted: AtomicBool,
}

impl Deadline {
    #[must_use]
    pub const fn at_instant(at: Instant) -> Self {
        Self {
            at,
            halted: AtomicBool::new(false),
        }
    }

    /// Deadline `duration` after `start`.
    ///
    /// # Errors
    ///
    /// Returns an error when the sum does not fit in an `Instant`.
    pub fn after(start: Instant, duration: Duration) -> AppResult<Self> {
        start
            .checked_add(duration)
            .map(Self::at_instant)
            .ok_or_else(|| {
                AppError::engine(EngineError::DeadlineOverflow {
                    secs: duration.as_secs(),
                })
            })
    }

    #[must_use]
    pub const fn at(&self) -> Instant {
        self.at
    }

    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        if self.is_halted() {
            return Duration::ZERO;
        }
        self.at.saturating_duration_since(now)
    }

    /// Stops admitting requests immediately. In-flight requests finish.
    pub fn halt(&self) {
        self.halted.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn has_passed(&self, now: Instant) -> bool {
        self.is_halted() || now >= self.at
    }
}

impl Pacing for Deadline {
    fn admit(&self, now: Instant) -> bool {
        !self.has_passed(now)
    }
}

/// Admits exactly `n` requests in total across all workers sharing it.
#[derive(Debug)]
pub struct IterationBudget {
    remaining: AtomicU64,
}

impl IterationBudget {
    #[must_use]
    pub const fn new(iterations: u64) -> Self {
        Self {
            remaining: AtomicU64::new(iterations),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }
}

impl Pacing for IterationBudget {
    fn admit(&self, _now: Instant) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1))
            .is_ok()
    }
}
