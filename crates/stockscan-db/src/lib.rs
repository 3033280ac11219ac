//! # stockscan-db: Database Layer for Stockscan
//!
//! This crate provides the inventory store the scanner reconciles against.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockscan Data Flow                              │
//! │                                                                         │
//! │  Scanner host: batch complete ──► operator confirms                     │
//! │       │                                  │                              │
//! │       ▼ snapshot()                       ▼ apply_plan()                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockscan-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ CategoryRepo  │    │ 001_init.sql │   │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │              │   │   │
//! │  │   │ apply.rs      │    │               │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/stockscan/stockscan.db                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, snapshot reads, plan application entry
//! - [`apply`] - Ordered execution of mutations
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and apply error types
//! - [`repository`] - Category and product repositories

// =============================================================================
// Module Declarations
// =============================================================================

pub mod apply;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use apply::ApplyReport;
pub use error::{ApplyError, DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
