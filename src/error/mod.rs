//! Error handling
//!
//! Defines the tagged error type shared by every file manager operation.

pub mod types;

pub use types::*;
