use kiosk_display::SurfaceError;
use thiserror::Error;

/// Failure talking to one of the provider scripts.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// Connection refused or timed out; the next scheduled run retries.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            BackendError::Unavailable(e.to_string())
        } else {
            BackendError::Http(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Failure of one refresh step; logged by the dispatcher and never propagated.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
