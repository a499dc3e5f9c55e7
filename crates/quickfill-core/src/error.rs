//! Error types for Quickfill core operations.
//!
//! Library code returns `QuickfillError`; the binary wraps it in `anyhow`
//! at the top level. Store failures are split out into `StoreError` so that
//! callers can tell an unreachable store apart from a single failed command.

use thiserror::Error;

/// Result type alias using QuickfillError
pub type Result<T> = std::result::Result<T, QuickfillError>;

/// Failures reported by an `OrderedStore` implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or the connection was lost
    #[error("can't connect to store using {url}: {reason}")]
    Unavailable { url: String, reason: String },

    /// A single command was rejected or returned an unexpected value
    #[error("store command {command} failed: {reason}")]
    Command { command: String, reason: String },
}

impl StoreError {
    /// Create a connection error
    pub fn unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a command error
    pub fn command(command: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Command {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the connection itself failed
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

/// Core error types for Quickfill operations.
#[derive(Error, Debug)]
pub enum QuickfillError {
    // === Store Errors ===
    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    // === Load Errors ===
    /// An input line could not be decoded into a record
    #[error("invalid record on line {line} ({applied} records applied before it): {reason}")]
    Decode {
        line: usize,
        applied: u64,
        reason: String,
    },

    /// The kind name cannot be used as a key component
    #[error("invalid kind {kind:?}: {reason}")]
    InvalidKind { kind: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuickfillError {
    /// Returns true if this error means the store is unreachable
    pub fn is_connection(&self) -> bool {
        matches!(self, QuickfillError::Store(e) if e.is_connection())
    }

    /// Create a decode error for a load input line
    pub fn decode(line: usize, applied: u64, reason: impl Into<String>) -> Self {
        QuickfillError::Decode {
            line,
            applied,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_message_prefix() {
        let err = StoreError::unavailable("BAD URL", "invalid scheme");
        assert!(err
            .to_string()
            .starts_with("can't connect to store using BAD URL"));
        assert!(err.is_connection());
    }

    #[test]
    fn test_is_connection() {
        let err: QuickfillError = StoreError::unavailable("redis://x", "refused").into();
        assert!(err.is_connection());

        let err: QuickfillError = StoreError::command("ZADD", "wrong type").into();
        assert!(!err.is_connection());

        let err = QuickfillError::decode(3, 2, "expected value");
        assert!(!err.is_connection());
        assert!(err.to_string().contains("line 3"));
    }
}
