use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// The element is not (or not yet) present on the page.
    #[error("Element unavailable: {id}")]
    ElementUnavailable { id: String },

    #[error("Element {id} has no source")]
    NoSource { id: String },
}

pub type Result<T> = std::result::Result<T, SurfaceError>;
