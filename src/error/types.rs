//! Error types
//!
//! A single tagged error type covers every vault operation so callers can
//! tell "bad input, nothing attempted" apart from "attempt made, I/O failed"
//! without inspecting strings.

use std::fmt;
use std::io;

/// Failure taxonomy for vault operations.
///
/// `Validation`, `NotFound` and `Conflict` are raised before any mutation and
/// carry a message safe to show to the requesting operator. `Io` wraps the
/// underlying cause, which is logged in full but redacted in user-facing
/// replies. `SizeExceeded` refuses a delivery that would overrun the
/// transport's attachment ceiling.
#[derive(Debug)]
pub enum VaultError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Io(io::Error),
    SizeExceeded { size: u64, limit: u64 },
}

impl VaultError {
    /// Message suitable for a chat reply. I/O detail is redacted here; the
    /// full cause belongs in the log.
    pub fn user_message(&self) -> String {
        match self {
            VaultError::Validation(msg) => msg.clone(),
            VaultError::NotFound(msg) => msg.clone(),
            VaultError::Conflict(msg) => msg.clone(),
            VaultError::Io(_) => {
                "An internal error occurred while accessing the filesystem. \
                 Check the server logs for details."
                    .to_string()
            }
            VaultError::SizeExceeded { size, limit } => format!(
                "The file is too large ({:.2} MiB). The transport limit is {} MiB.",
                *size as f64 / (1024.0 * 1024.0),
                limit / (1024 * 1024)
            ),
        }
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultError::Validation(msg) => write!(f, "Validation error: {}", msg),
            VaultError::NotFound(msg) => write!(f, "Not found: {}", msg),
            VaultError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            VaultError::Io(e) => write!(f, "I/O error: {}", e),
            VaultError::SizeExceeded { size, limit } => {
                write!(f, "Size exceeded: {} bytes (limit {})", size, limit)
            }
        }
    }
}

impl std::error::Error for VaultError {}

impl From<io::Error> for VaultError {
    fn from(error: io::Error) -> Self {
        VaultError::Io(error)
    }
}

impl From<zip::result::ZipError> for VaultError {
    fn from(error: zip::result::ZipError) -> Self {
        match error {
            zip::result::ZipError::Io(e) => VaultError::Io(e),
            other => VaultError::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
        }
    }
}
