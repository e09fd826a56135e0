//! The load engine: clocks, pacing, and the worker pool that drives each
//! domain's state.
mod clock;
mod pacing;
mod pool;
mod worker;


pub use clock::{Clock, ManualClock, Moment, SystemClock};
pub use pacing::{Deadline, IterationBudget, Pacing};
pub use pool::{DomainReport, PoolPlan, TransitionNotice, WorkerPool};
