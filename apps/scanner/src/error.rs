//! # Host Error Type
//!
//! Unified error type for the scanner host.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Scanner                            │
//! │                                                                         │
//! │  ScanError ─────────┐                                                   │
//! │  (recoverable)      │                                                   │
//! │                     ▼                                                   │
//! │  DbError ──────► AppError { code, message } ──► JSON event on stdout    │
//! │  ApplyError ────────▲                               "failure" /         │
//! │                     │                               "applyFailed"       │
//! │  ConfigError ───────┤                                                   │
//! │  io::Error ─────────┘──► fatal: printed on stderr, exit code 1          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use stockscan_core::ScanError;
use stockscan_db::{ApplyError, DbError};

use crate::config::ConfigError;

/// Error reported by the scanner host.
///
/// ## Serialization
/// ```json
/// {
///   "code": "OUT_OF_SEQUENCE",
///   "message": "Frame 3 is out of sequence: expected frame 2 of 3"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes carried by failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Scanned text is not a frame
    MalformedFrame,

    /// Frame belongs to a batch of a different size
    ProtocolMismatch,

    /// Frame skips ahead
    OutOfSequence,

    /// Frame already scanned
    DuplicateFrame,

    /// A mutation failed mid-plan
    StoreFailure,

    /// Database operation failed outside a plan
    DatabaseError,

    /// Invalid configuration value
    ConfigError,

    /// Operator action not valid right now
    InvalidAction,

    /// I/O or serialization failure
    Internal,
}

impl AppError {
    /// Creates a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates an invalid-action error.
    pub fn invalid_action(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::InvalidAction, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts scan errors; the message keeps the literal text and indices.
impl From<&ScanError> for AppError {
    fn from(err: &ScanError) -> Self {
        let code = match err {
            ScanError::MalformedFrame { .. } => ErrorCode::MalformedFrame,
            ScanError::ProtocolMismatch { .. } => ErrorCode::ProtocolMismatch,
            ScanError::OutOfSequence { .. } => ErrorCode::OutOfSequence,
            ScanError::DuplicateFrame { .. } => ErrorCode::DuplicateFrame,
        };
        AppError::new(code, err.to_string())
    }
}

/// Converts database errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            other => AppError::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}

/// Converts apply errors.
impl From<ApplyError> for AppError {
    fn from(err: ApplyError) -> Self {
        AppError::new(ErrorCode::StoreFailure, err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal(format!("I/O error: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("Event serialization failed: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
