//! kiosk-tasks: the kiosk's recurring routines and the orchestrator that starts them.
//!
//! | Routine            | Module         | Trigger                          |
//! |--------------------|----------------|----------------------------------|
//! | clock ticker       | `ticker`       | every whole second               |
//! | astro population   | `astro`        | startup, presenter when missing  |
//! | moon images        | `lunar`        | once, after astro is complete    |
//! | resource refresh   | `resources`    | per-category repeaters           |
//! | sunrise/sunset     | `presenter`    | repeater                         |
//! | panel rotation     | `panels`       | repeater                         |
//! | network badge      | `network`      | repeater, after refresh failures |

pub mod astro;
pub mod backend;
pub mod error;
pub mod http;
pub mod lunar;
pub mod network;
pub mod orchestrator;
pub mod panels;
pub mod presenter;
pub mod resources;
pub mod store;
pub mod ticker;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Backend, MoonImageRecord, MoonImageRequest, Regeneration};
pub use error::{BackendError, RefreshError};
pub use http::HttpBackend;
pub use orchestrator::Kiosk;
pub use store::{DayStore, Slot, StoreSnapshot};
