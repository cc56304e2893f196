use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{Result, SchedulerError};
use crate::types::Schedule;

/// Reject schedules that would spin or cannot be drawn from.
pub fn validate(schedule: &Schedule) -> Result<()> {
    match schedule {
        Schedule::Interval { every_secs: 0 } => Err(SchedulerError::InvalidSchedule(
            "interval must be at least one second".to_string(),
        )),
        Schedule::Jittered { min_secs, max_secs } if min_secs > max_secs => {
            Err(SchedulerError::InvalidSchedule(format!(
                "jitter window {min_secs}..={max_secs} is empty"
            )))
        }
        Schedule::Jittered { max_secs: 0, .. } => Err(SchedulerError::InvalidSchedule(
            "jitter window must allow a non-zero delay".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Delay to wait before the next run of `schedule`.
pub fn next_delay(schedule: &Schedule) -> Duration {
    match schedule {
        Schedule::Interval { every_secs } => Duration::from_secs(*every_secs),
        Schedule::Jittered { min_secs, max_secs } => {
            Duration::from_secs(jitter_between(*min_secs, *max_secs))
        }
    }
}

/// Uniform draw in `[min, max]`, seeded from a v4 UUID.
fn jitter_between(min: u64, max: u64) -> u64 {
    if max <= min {
        return min;
    }
    let span = (max - min + 1) as u128;
    min + (Uuid::new_v4().as_u128() % span) as u64
}

/// Next whole-second boundary after `now`, counted from `start`.
///
/// Elapsed time is rounded to the nearest second first, so a wake-up that
/// lands a hair before or after a boundary still targets the following one.
pub fn next_second_boundary(start: Instant, now: Instant) -> Instant {
    let elapsed_ms = now.saturating_duration_since(start).as_millis() as u64;
    let seconds = (elapsed_ms + 500) / 1000;
    start + Duration::from_secs(seconds + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_delay_is_fixed() {
        assert_eq!(next_delay(&Schedule::every(420)), Duration::from_secs(420));
    }

    #[test]
    fn jitter_stays_in_window() {
        let s = Schedule::Jittered {
            min_secs: 15,
            max_secs: 31,
        };
        for _ in 0..200 {
            let d = next_delay(&s).as_secs();
            assert!((15..=31).contains(&d), "delay {d} outside window");
        }
        assert_eq!(jitter_between(7, 7), 7);
    }

    #[test]
    fn validation_rejects_degenerate_schedules() {
        assert!(validate(&Schedule::every(0)).is_err());
        assert!(validate(&Schedule::Jittered {
            min_secs: 31,
            max_secs: 15
        })
        .is_err());
        assert!(validate(&Schedule::every(60)).is_ok());
    }

    #[test]
    fn boundary_resynchronizes_to_start() {
        let start = Instant::now();
        // Woke slightly late: still aims at the next boundary, not one further.
        let late = start + Duration::from_millis(3_040);
        assert_eq!(next_second_boundary(start, late), start + Duration::from_secs(4));
        // Woke slightly early: rounding keeps us from firing the same second twice.
        let early = start + Duration::from_millis(2_990);
        assert_eq!(next_second_boundary(start, early), start + Duration::from_secs(4));
        assert_eq!(next_second_boundary(start, start), start + Duration::from_secs(1));
    }
}
