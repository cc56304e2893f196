use chrono::{DateTime, Utc};
use serde::Serialize;

/// Defines how long a repeater waits between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Wait a fixed number of seconds after each run.
    Interval { every_secs: u64 },

    /// Wait a random number of seconds in `[min_secs, max_secs]` after each run.
    Jittered { min_secs: u64, max_secs: u64 },
}

impl Schedule {
    pub fn every(secs: u64) -> Self {
        Schedule::Interval { every_secs: secs }
    }
}

/// Snapshot of one registered repeater, as exposed on `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskInfo {
    pub name: String,
    pub schedule: Schedule,
    /// Completed runs since the repeater was installed.
    pub run_count: u64,
    pub last_run: Option<DateTime<Utc>>,
}
