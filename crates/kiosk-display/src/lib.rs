//! kiosk-display: the display surface the kiosk tasks write into.
//!
//! Tasks never touch markup. They address named elements through the
//! [`surface::Surface`] trait: set a source, set a text, toggle a class flag,
//! read an attribute or a transition duration. [`model::DisplayModel`] is the
//! in-process implementation the gateway serves to the page.

pub mod cache;
pub mod error;
pub mod model;
pub mod status;
pub mod surface;

pub use cache::CacheBuster;
pub use error::{Result, SurfaceError};
pub use model::{DisplayModel, ElementState};
pub use status::{StatusGuard, StatusReporter};
pub use surface::Surface;
