//! Shared utility helpers.

pub mod error;

pub use error::{CamFilterError, Result as CamFilterResult};
