//! Retry-until-ready primitives.
//!
//! Kiosk routines never fail hard; when a dependency is missing they wait and
//! try again. The default policy retries forever, which is what an unattended
//! display wants. Bounded policies exist for tests and one-off tools.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, SchedulerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Forever { delay: Duration },
    /// At most `max_attempts` attempts in total, including the first.
    Bounded { delay: Duration, max_attempts: u32 },
}

impl RetryPolicy {
    pub fn forever(delay: Duration) -> Self {
        RetryPolicy::Forever { delay }
    }

    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        RetryPolicy::Bounded {
            delay,
            max_attempts,
        }
    }

    pub fn delay(&self) -> Duration {
        match self {
            RetryPolicy::Forever { delay } | RetryPolicy::Bounded { delay, .. } => *delay,
        }
    }

    /// Whether attempt number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        match self {
            RetryPolicy::Forever { .. } => true,
            RetryPolicy::Bounded { max_attempts, .. } => attempt <= *max_attempts,
        }
    }
}

/// Poll `ready` until it returns true, sleeping the policy delay in between.
///
/// Returns the number of checks made.
pub async fn poll_until<F>(policy: &RetryPolicy, mut ready: F) -> Result<u32>
where
    F: FnMut() -> bool,
{
    let mut attempt = 1;
    loop {
        if ready() {
            return Ok(attempt);
        }
        if !policy.allows(attempt + 1) {
            return Err(SchedulerError::RetryExhausted { attempts: attempt });
        }
        debug!(attempt, "not ready, polling again in {:?}", policy.delay());
        tokio::time::sleep(policy.delay()).await;
        attempt += 1;
    }
}

/// Run `op` until it succeeds, sleeping the policy delay after each failure.
///
/// `op` receives the 1-based attempt number. When a bounded policy runs out the
/// last error is returned.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> std::result::Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !policy.allows(attempt + 1) {
                    return Err(e);
                }
                debug!(attempt, error = %e, "attempt failed, retrying in {:?}", policy.delay());
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
        }
    }
}
