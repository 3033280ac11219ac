//! # Scan Desk State
//!
//! The gate between the camera and the scan session.
//!
//! ## Why a Gate?
//! The camera keeps decoding the code in front of it several times a second.
//! While the operator is looking at an error or at the confirmation view,
//! those repeats must not reach the session.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Desk Phases                                     │
//! │                                                                         │
//! │                 failure                                                 │
//! │   ┌──────────┐ ─────────────► ┌──────────────┐                          │
//! │   │ Scanning │                │ ShowingError │  text dropped            │
//! │   └──────────┘ ◄───────────── └──────────────┘                          │
//! │     │    ▲          :ack / :cancel                                      │
//! │     │    │                                                              │
//! │     │    │ :confirm (after apply) / :reject / :cancel                   │
//! │     │  ┌─┴──────────┐                                                   │
//! │     └─►│ Confirming │  text dropped                                     │
//! │  done  └────────────┘                                                   │
//! │                                                                         │
//! │  NOTE: the session is only ever touched in Scanning.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The desk is wrapped in `Arc<Mutex<T>>` so the reader task and the
//! controller can both look at it; every access goes through a closure so the
//! lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use stockscan_core::{ScanError, ScanEvent, ScanSession};
use tracing::debug;

// =============================================================================
// Desk
// =============================================================================

/// What the operator is currently looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeskPhase {
    /// Camera text goes to the session.
    #[default]
    Scanning,

    /// A decode or sequencing error is on screen.
    ShowingError,

    /// A completed batch is waiting for confirmation.
    Confirming,
}

/// Result of offering one decoded text to the desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskOutcome {
    /// The desk was not scanning; the text never reached the session.
    Dropped { phase: DeskPhase },

    /// The session accepted the frame.
    Accepted(ScanEvent),

    /// The session rejected the text; the desk now shows the error.
    Rejected(ScanError),
}

/// Snapshot of the desk for `:status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskStatus {
    pub phase: DeskPhase,
    pub expected_index: u32,
    pub total: Option<u32>,
    pub items: usize,
    /// Message of the error on screen, while ShowingError.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Session plus the gate around it.
#[derive(Debug, Default)]
pub struct ScanDesk {
    phase: DeskPhase,
    session: ScanSession,
    last_error: Option<ScanError>,
}

impl ScanDesk {
    /// Creates a desk in the Scanning phase with an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> DeskPhase {
        self.phase
    }

    /// Offers one decoded text.
    ///
    /// Outside [`DeskPhase::Scanning`] the text is dropped. Otherwise it goes
    /// to the session; a failure switches to ShowingError and a completed
    /// batch switches to Confirming.
    pub fn offer(&mut self, text: &str) -> DeskOutcome {
        if self.phase != DeskPhase::Scanning {
            debug!(phase = ?self.phase, text = %text, "Dropping decoded text");
            return DeskOutcome::Dropped { phase: self.phase };
        }

        match self.session.submit_text(text) {
            Ok(event) => {
                if matches!(event, ScanEvent::Completed { .. }) {
                    self.phase = DeskPhase::Confirming;
                }
                DeskOutcome::Accepted(event)
            }
            Err(err) => {
                self.phase = DeskPhase::ShowingError;
                self.last_error = Some(err.clone());
                DeskOutcome::Rejected(err)
            }
        }
    }

    /// Dismisses the error view. Returns false when no error was showing.
    pub fn acknowledge(&mut self) -> bool {
        if self.phase != DeskPhase::ShowingError {
            return false;
        }
        self.phase = DeskPhase::Scanning;
        self.last_error = None;
        true
    }

    /// Ends a confirmed batch once it has been applied (or failed to apply).
    ///
    /// Returns false when nothing was awaiting confirmation.
    pub fn finish_batch(&mut self) -> bool {
        if self.phase != DeskPhase::Confirming {
            return false;
        }
        self.reset();
        true
    }

    /// Discards everything and goes back to scanning.
    ///
    /// Returns the number of accumulated items thrown away.
    pub fn cancel(&mut self) -> usize {
        let discarded = self.session.items().len();
        self.reset();
        discarded
    }

    /// Snapshot for `:status`.
    pub fn status(&self) -> DeskStatus {
        DeskStatus {
            phase: self.phase,
            expected_index: self.session.expected_index(),
            total: self.session.total(),
            items: self.session.items().len(),
            error: self.last_error.as_ref().map(ToString::to_string),
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.phase = DeskPhase::Scanning;
        self.last_error = None;
    }
}

// =============================================================================
// Shared State
// =============================================================================

/// Thread-safe wrapper around [`ScanDesk`].
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    desk: Arc<Mutex<ScanDesk>>,
}

impl ScanState {
    /// Creates a new state with a fresh desk.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScanDesk> {
        // No desk method can panic halfway through an update.
        self.desk.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Executes a function with read access to the desk.
    pub fn with_desk<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ScanDesk) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the desk.
    pub fn with_desk_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ScanDesk) -> R,
    {
        f(&mut self.lock())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_blocks_until_acknowledged() {
        let mut desk = ScanDesk::new();

        assert!(matches!(desk.offer("abc"), DeskOutcome::Rejected(_)));
        assert_eq!(desk.phase(), DeskPhase::ShowingError);

        // The camera still sees a valid code; it must not reach the session.
        assert_eq!(
            desk.offer("1/1|Rice~Grains~5"),
            DeskOutcome::Dropped {
                phase: DeskPhase::ShowingError
            }
        );
        assert_eq!(desk.status().items, 0);
        assert!(desk.status().error.is_some());

        assert!(desk.acknowledge());
        assert!(desk.status().error.is_none());
        assert!(matches!(
            desk.offer("1/1|Rice~Grains~5"),
            DeskOutcome::Accepted(ScanEvent::Completed { .. })
        ));
    }

    #[test]
    fn test_completion_waits_for_confirmation() {
        let mut desk = ScanDesk::new();
        desk.offer("1/2|Rice~Grains~50");
        desk.offer("2/2|Oil~Pantry~12");

        assert_eq!(desk.phase(), DeskPhase::Confirming);
        assert_eq!(desk.status().items, 2);

        // Repeats of the last code while the confirmation is shown
        assert!(matches!(
            desk.offer("2/2|Oil~Pantry~12"),
            DeskOutcome::Dropped { .. }
        ));

        assert!(desk.finish_batch());
        assert_eq!(desk.phase(), DeskPhase::Scanning);
        assert_eq!(desk.status().expected_index, 1);
        assert_eq!(desk.status().items, 0);
    }

    #[test]
    fn test_cancel_discards_partial_batch() {
        let mut desk = ScanDesk::new();
        desk.offer("1/3|Rice~Grains~50|Beans~Grains~30");

        assert_eq!(desk.cancel(), 2);
        assert_eq!(
            desk.status(),
            DeskStatus {
                phase: DeskPhase::Scanning,
                expected_index: 1,
                total: None,
                items: 0,
                error: None,
            }
        );
    }

    #[test]
    fn test_ack_and_finish_are_phase_checked() {
        let mut desk = ScanDesk::new();
        assert!(!desk.acknowledge());
        assert!(!desk.finish_batch());
    }

    #[test]
    fn test_sequencing_error_keeps_progress() {
        let mut desk = ScanDesk::new();
        desk.offer("1/3|Rice~Grains~50");
        assert!(matches!(
            desk.offer("3/3|Oil~Pantry~12"),
            DeskOutcome::Rejected(ScanError::OutOfSequence { .. })
        ));

        desk.acknowledge();
        assert_eq!(desk.status().expected_index, 2);
        assert_eq!(desk.status().items, 1);
    }

    #[test]
    fn test_state_wrapper() {
        let state = ScanState::new();
        state.with_desk_mut(|desk| desk.offer("1/2|Rice~Grains~1"));

        let shared = state.clone();
        assert_eq!(shared.with_desk(|desk| desk.status().expected_index), 2);
    }
}
