//! VaultKey Core: shared errors and traits.
//!
//! This crate has no internal VaultKey dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`traits`]: The [`Clock`] seam and timestamp formatting

pub mod error;
pub mod traits;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use traits::{format_timestamp, Clock, SystemClock, TIMESTAMP_FORMAT};
