use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use tokio::time::Instant;

/// A point in time read from both clocks at once: the monotonic instant for
/// arithmetic and the wall-clock time for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub instant: Instant,
    pub wall: DateTime<Local>,
}

impl Moment {
    /// Monotonic time since `earlier`, zero if `earlier` is later.
    #[must_use]
    pub fn since(&self, earlier: Moment) -> Duration {
        self.instant.saturating_duration_since(earlier.instant)
    }
}

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Moment;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        Moment {
            instant: Instant::now(),
            wall: Local::now(),
        }
    }
}

/// Clock that only moves when told to. Millisecond resolution.
#[derive(Debug)]
pub struct ManualClock {
    origin: Moment,
    offset_ms: AtomicU64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(SystemClock.now())
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn starting_at(origin: Moment) -> Self {
        Self {
            origin,
            offset_ms: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn origin(&self) -> Moment {
        self.origin
    }

    pub fn advance(&self, by: Duration) {
        let step = duration_ms(by);
        let mut current = self.offset_ms.load(Ordering::Acquire);
        while let Err(actual) = self.offset_ms.compare_exchange_weak(
            current,
            current.saturating_add(step),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            current = actual;
        }
    }

    /// Moves the clock to `offset` past its origin.
    pub fn set(&self, offset: Duration) {
        self.offset_ms.store(duration_ms(offset), Ordering::Release);
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.offset_ms.load(Ordering::Acquire))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Moment {
        let offset = self.elapsed();
        let instant = self
            .origin
            .instant
            .checked_add(offset)
            .unwrap_or(self.origin.instant);
        let wall = TimeDelta::from_std(offset)
            .ok()
            .and_then(|delta| self.origin.wall.checked_add_signed(delta))
            .unwrap_or(self.origin.wall);
        Moment { instant, wall }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
