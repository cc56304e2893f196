//! `kiosk-core`: shared configuration, error and data types for the harbor kiosk.
//!
//! Everything here is plain data: the ephemeris records returned by the
//! observatory proxy, the relative-day and unit vocabulary used by every task,
//! and the figment-backed [`config::KioskConfig`].

pub mod config;
pub mod ephemeris;
pub mod error;
pub mod types;

pub use error::{KioskError, Result};
pub use types::{Category, RelativeDay, UnitSystem};
