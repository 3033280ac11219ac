//! # State Module
//!
//! Host-side state for the scanner.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐           ┌──────────────────────────────────┐   │
//! │  │    Database      │           │          ScanState               │   │
//! │  │  (stockscan-db)  │           │   Arc<Mutex<ScanDesk>>           │   │
//! │  │  pool, cloned    │           │   phase + ScanSession            │   │
//! │  └──────────────────┘           └──────────────────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • Database: internal connection pool (thread-safe)                     │
//! │  • ScanState: closure access, lock never held across an await           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod desk;

pub use desk::{DeskOutcome, DeskPhase, DeskStatus, ScanDesk, ScanState};
