//! # Error Types
//!
//! Domain-specific error types for stockscan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockscan-core errors (this file)                                      │
//! │  ├── ScanError        - Decode and sequencing failures                  │
//! │  ├── FrameDefect      - Which decode rule a frame broke                 │
//! │  └── ValidationError  - Field validation failures                       │
//! │                                                                         │
//! │  stockscan-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── ApplyError       - StoreFailure with applied/pending counts        │
//! │                                                                         │
//! │  scanner app errors                                                     │
//! │  └── AppError         - What the host prints (serialized)               │
//! │                                                                         │
//! │  Flow: ValidationError → FrameDefect → ScanError → AppError → Operator  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recovery
//! Every [`ScanError`] is recoverable. The session state is untouched when
//! one is returned and the host keeps accepting frames once the operator has
//! acknowledged the error.

use thiserror::Error;

// =============================================================================
// Scan Error
// =============================================================================

/// Failures while decoding or sequencing frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The scanned text is not a valid frame.
    ///
    /// ## When This Occurs
    /// - Header is not `<digits>/<digits>`
    /// - `total` is 0 or `index` is outside `1..=total`
    /// - An item has fewer than three `~`-separated fields
    /// - A quantity is not a non-negative integer
    #[error("Malformed frame {text:?}: {defect}")]
    MalformedFrame { text: String, defect: FrameDefect },

    /// The frame belongs to a batch of a different size.
    ///
    /// ## When This Occurs
    /// - Operator mixed codes from two different printouts
    #[error("Frame {index} declares {observed} frames but this scan has {expected}")]
    ProtocolMismatch {
        expected: u32,
        observed: u32,
        index: u32,
    },

    /// The frame skips ahead of the next expected index.
    ///
    /// ## User Workflow
    /// ```text
    /// Scanned 1/3 ──► scans 3/3
    ///      │
    ///      ▼
    /// OutOfSequence { observed: 3, expected: 2, total: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Scan code 2 of 3 next"
    /// ```
    #[error("Frame {observed} is out of sequence: expected frame {expected} of {total}")]
    OutOfSequence {
        observed: u32,
        expected: u32,
        total: u32,
    },

    /// The frame was already accepted.
    #[error("Frame {index} of {total} was already scanned (next is {expected})")]
    DuplicateFrame { index: u32, expected: u32, total: u32 },
}

impl ScanError {
    /// Builds a MalformedFrame error for the given text.
    pub fn malformed(text: impl Into<String>, defect: FrameDefect) -> Self {
        ScanError::MalformedFrame {
            text: text.into(),
            defect,
        }
    }

    /// Machine-readable kind, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::MalformedFrame { .. } => "malformed_frame",
            ScanError::ProtocolMismatch { .. } => "protocol_mismatch",
            ScanError::OutOfSequence { .. } => "out_of_sequence",
            ScanError::DuplicateFrame { .. } => "duplicate_frame",
        }
    }

    /// Returns `(expected, observed)` for sequencing errors.
    ///
    /// Frame indices, except for `ProtocolMismatch` where the totals differ.
    pub fn indices(&self) -> Option<(u32, u32)> {
        match self {
            ScanError::MalformedFrame { .. } => None,
            ScanError::ProtocolMismatch {
                expected, observed, ..
            } => Some((*expected, *observed)),
            ScanError::OutOfSequence {
                observed, expected, ..
            } => Some((*expected, *observed)),
            ScanError::DuplicateFrame {
                index, expected, ..
            } => Some((*expected, *index)),
        }
    }
}

// =============================================================================
// Frame Defect
// =============================================================================

/// The decode rule a malformed frame broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameDefect {
    /// The camera delivered bytes that were not valid UTF-8.
    #[error("code content is not text")]
    NotText,

    #[error("header must be <index>/<total>")]
    BadHeader,

    #[error("total must be at least 1")]
    ZeroTotal,

    #[error("index {index} is outside 1..={total}")]
    IndexOutOfRange { index: u32, total: u32 },

    #[error("item {position} has {found} field(s), expected name~category~quantity")]
    MissingFields { position: usize, found: usize },

    #[error("item {position}: {source}")]
    InvalidField {
        position: usize,
        #[source]
        source: ValidationError,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field validation errors.
///
/// Used by the frame decoder and encoder for individual item fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., non-numeric quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ScanError.
pub type ScanResult<T> = Result<T, ScanError>;

// =============================================================================
// Unit Tests
// =============================================================================
