//! # stockscan-core: Pure Scan Logic for Stockscan
//!
//! This crate holds everything Stockscan decides without touching the
//! outside world: how a scanned code is decoded, how frames are sequenced
//! into a batch, and which inventory changes a completed batch implies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockscan Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Scanner host (apps/scanner)                     │   │
//! │  │    camera lines ──► desk gate ──► confirm ──► apply             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockscan-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   frame   │  │  session  │  │ reconcile │  │ validation│  │   │
//! │  │   │  decode   │  │  Empty    │  │  Snapshot │  │   names   │  │   │
//! │  │   │  encode   │  │  Awaiting │  │  Plan     │  │ quantities│  │   │
//! │  │   │           │  │  Complete │  │  preview  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CAMERA • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockscan-db (Database Layer)                   │   │
//! │  │        SQLite snapshot reads, migrations, plan application      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RawItem, Frame, Product, Mutation, etc.)
//! - [`frame`] - Frame text codec
//! - [`session`] - Multi-frame scan state machine
//! - [`reconcile`] - Items + snapshot → ordered mutations
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules shared by decoder and encoder
//!
//! ## Example Usage
//!
//! ```rust
//! use stockscan_core::reconcile::{reconcile, Snapshot};
//! use stockscan_core::{Mutation, ScanEvent, ScanSession};
//!
//! let mut session = ScanSession::new();
//! session.submit_text("1/2|Rice~Grains~50").unwrap();
//! let event = session.submit_text("2/2|Oil~Pantry~12").unwrap();
//! assert!(matches!(event, ScanEvent::Completed { total: 2, .. }));
//!
//! let plan = reconcile(session.items(), &Snapshot::default());
//! assert!(matches!(plan.mutations[0], Mutation::CreateCategory { .. }));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod frame;
pub mod reconcile;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{FrameDefect, ScanError, ScanResult, ValidationError};
pub use reconcile::{reconcile, ItemPreview, PlanSummary, ReconciliationPlan, Snapshot};
pub use session::{ScanEvent, ScanSession, SessionState};
pub use types::*;

// =============================================================================
// Wire Format Constants
// =============================================================================

/// Separates the header from the items, and items from each other.
pub const ITEM_SEPARATOR: char = '|';

/// Separates the fields of one item.
pub const FIELD_SEPARATOR: char = '~';

/// Separates `index` and `total` in the header.
pub const HEADER_SEPARATOR: char = '/';

/// Longest product or category name accepted, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Items per frame used when printing codes.
pub const DEFAULT_ITEMS_PER_FRAME: usize = 8;
