//! `kiosk-scheduler`: Tokio-based repeaters, retry polling and clocks.
//!
//! # Overview
//!
//! Every recurring kiosk routine is an independent repeater spawned through a
//! [`engine::SchedulerHandle`]. A repeater sleeps, runs its task to completion,
//! then computes its next delay from its [`Schedule`]. Nothing cancels a
//! repeater except engine shutdown.
//!
//! Routines that depend on data another task produces wait through
//! [`retry::poll_until`] / [`retry::retry`] instead of rescheduling themselves.
//!
//! # Schedule variants
//!
//! | Variant    | Behaviour                                          |
//! |------------|----------------------------------------------------|
//! | `Interval` | Re-run N seconds after the previous run finished   |
//! | `Jittered` | Re-run after a uniformly drawn delay in [min, max] |

pub mod clock;
pub mod engine;
pub mod error;
pub mod retry;
pub mod schedule;
pub mod types;

pub use clock::{ManualClock, SystemClock, WallClock};
pub use engine::{SchedulerEngine, SchedulerHandle};
pub use error::{Result, SchedulerError};
pub use retry::RetryPolicy;
pub use types::{Schedule, TaskInfo};
