use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The provided schedule definition is invalid.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A bounded retry policy ran out of attempts before the condition held.
    #[error("Gave up after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
