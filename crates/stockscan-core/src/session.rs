//! # Scan Session
//!
//! Sequences the frames of one multi-part scan.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session States                                  │
//! │                                                                         │
//! │  ┌──────────┐  frame 1/N   ┌────────────────────┐  frame N/N ┌────────┐ │
//! │  │  Empty   │─────────────►│ Awaiting(k, N)     │───────────►│Complete│ │
//! │  └──────────┘  (N > 1)     │  items so far      │            └────────┘ │
//! │       │                    └────────────────────┘                 ▲     │
//! │       │                       │  frame k/N (k < N)                │     │
//! │       │                       └──► Awaiting(k+1, N)               │     │
//! │       └──────────── frame 1/1 ────────────────────────────────────┘     │
//! │                                                                         │
//! │  Errors (state unchanged):                                              │
//! │    total ≠ N            → ProtocolMismatch                              │
//! │    index < expected     → DuplicateFrame                                │
//! │    index > expected     → OutOfSequence                                 │
//! │                                                                         │
//! │  reset() ──► Empty (from any state)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pure Transitions
//! [`transition`] takes the current [`SessionState`] and a [`Frame`] and
//! returns the next state together with the outcome. [`ScanSession`] only
//! owns the current state and swaps it on every call.

use serde::Serialize;
use ts_rs::TS;

use crate::error::{ScanError, ScanResult};
use crate::frame::decode_frame;
use crate::types::{Frame, RawItem};

// =============================================================================
// Session State
// =============================================================================

/// The state of a scan session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No frame accepted yet.
    #[default]
    Empty,

    /// Some frames accepted; waiting for `expected_index`.
    Awaiting {
        expected_index: u32,
        total: u32,
        items: Vec<RawItem>,
    },

    /// Every frame `1..=total` accepted.
    Complete { total: u32, items: Vec<RawItem> },
}

impl SessionState {
    /// Index of the next frame the session will accept.
    ///
    /// A complete session reports `total + 1`, so every frame of its batch
    /// counts as a duplicate.
    pub fn expected_index(&self) -> u32 {
        match self {
            SessionState::Empty => 1,
            SessionState::Awaiting { expected_index, .. } => *expected_index,
            SessionState::Complete { total, .. } => total.saturating_add(1),
        }
    }

    /// Declared frame count, once the first frame has been accepted.
    pub fn total(&self) -> Option<u32> {
        match self {
            SessionState::Empty => None,
            SessionState::Awaiting { total, .. } | SessionState::Complete { total, .. } => {
                Some(*total)
            }
        }
    }

    /// Items accumulated so far, in arrival order.
    pub fn items(&self) -> &[RawItem] {
        match self {
            SessionState::Empty => &[],
            SessionState::Awaiting { items, .. } | SessionState::Complete { items, .. } => items,
        }
    }

    /// Indices accepted so far. Always a gap-free prefix `1..expected`.
    pub fn seen_indices(&self) -> std::ops::Range<u32> {
        1..self.expected_index()
    }

    /// Returns true once every frame has been accepted.
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, SessionState::Complete { .. })
    }
}

// =============================================================================
// Scan Events
// =============================================================================

/// Outcome of an accepted frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Frame accepted; more frames to come.
    #[serde(rename_all = "camelCase")]
    Progress { accepted_index: u32, total: u32 },

    /// Last frame accepted; the batch is ready for reconciliation.
    #[serde(rename_all = "camelCase")]
    Completed { total: u32, items: Vec<RawItem> },
}

// =============================================================================
// Transition Function
// =============================================================================

/// Applies one frame to a session state.
///
/// ## Rules (checked in order)
/// 1. Total already fixed and `frame.total` differs → `ProtocolMismatch`
/// 2. `frame.index` below the expected index → `DuplicateFrame`
/// 3. `frame.index` above the expected index (or above the total) →
///    `OutOfSequence`
/// 4. Otherwise append the frame's items and advance; the last frame
///    completes the session.
///
/// On error the returned state is the input state, untouched.
pub fn transition(state: SessionState, frame: Frame) -> (SessionState, ScanResult<ScanEvent>) {
    let expected = state.expected_index();

    if let Some(total) = state.total() {
        if frame.total != total {
            let err = ScanError::ProtocolMismatch {
                expected: total,
                observed: frame.total,
                index: frame.index,
            };
            return (state, Err(err));
        }
    }

    let total = state.total().unwrap_or(frame.total);

    // Index 0 is never valid; it falls through to OutOfSequence.
    if state.seen_indices().contains(&frame.index) {
        let err = ScanError::DuplicateFrame {
            index: frame.index,
            expected,
            total,
        };
        return (state, Err(err));
    }

    if frame.index != expected || frame.index > total {
        let err = ScanError::OutOfSequence {
            observed: frame.index,
            expected,
            total,
        };
        return (state, Err(err));
    }

    let mut items = match state {
        SessionState::Empty => Vec::new(),
        SessionState::Awaiting { items, .. } => items,
        // Unreachable: a complete session expects total + 1, caught above.
        SessionState::Complete { items, .. } => items,
    };
    let is_last = frame.is_last();
    items.extend(frame.items);

    if is_last {
        let event = ScanEvent::Completed {
            total,
            items: items.clone(),
        };
        (SessionState::Complete { total, items }, Ok(event))
    } else {
        let event = ScanEvent::Progress {
            accepted_index: frame.index,
            total,
        };
        let state = SessionState::Awaiting {
            expected_index: frame.index + 1,
            total,
            items,
        };
        (state, Ok(event))
    }
}

// =============================================================================
// Scan Session
// =============================================================================

/// Owner of one scan session's state.
///
/// ## Usage
/// ```rust
/// use stockscan_core::session::{ScanEvent, ScanSession};
///
/// let mut session = ScanSession::new();
///
/// let event = session.submit_text("1/2|Rice~Grains~50|Beans~Grains~30").unwrap();
/// assert_eq!(event, ScanEvent::Progress { accepted_index: 1, total: 2 });
///
/// let event = session.submit_text("2/2|Oil~Pantry~12").unwrap();
/// assert!(matches!(event, ScanEvent::Completed { total: 2, .. }));
/// assert_eq!(session.items().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    state: SessionState,
}

impl ScanSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        ScanSession::default()
    }

    /// Submits a decoded frame.
    pub fn submit(&mut self, frame: Frame) -> ScanResult<ScanEvent> {
        let state = std::mem::take(&mut self.state);
        let (next, outcome) = transition(state, frame);
        self.state = next;
        outcome
    }

    /// Decodes raw scanned text and submits the resulting frame.
    ///
    /// A decode failure leaves the session unchanged.
    pub fn submit_text(&mut self, text: &str) -> ScanResult<ScanEvent> {
        let frame = decode_frame(text)?;
        self.submit(frame)
    }

    /// Discards everything and returns to `Empty`.
    pub fn reset(&mut self) {
        self.state = SessionState::Empty;
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Items accumulated so far.
    pub fn items(&self) -> &[RawItem] {
        self.state.items()
    }

    /// Index of the next frame to scan.
    pub fn expected_index(&self) -> u32 {
        self.state.expected_index()
    }

    /// Declared frame count, if known.
    pub fn total(&self) -> Option<u32> {
        self.state.total()
    }

    /// Returns true once every frame has been accepted.
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameDefect;
    use proptest::prelude::*;

    fn item(name: &str, category: &str, quantity: i64) -> RawItem {
        RawItem::new(name, category, quantity)
    }

    fn frame(index: u32, total: u32, items: Vec<RawItem>) -> Frame {
        Frame::new(index, total, items)
    }

    #[test]
    fn test_scenario_two_frames_complete() {
        let mut session = ScanSession::new();

        let event = session
            .submit_text("1/2|Rice~Grains~50|Beans~Grains~30")
            .unwrap();
        assert_eq!(
            event,
            ScanEvent::Progress {
                accepted_index: 1,
                total: 2
            }
        );
        assert_eq!(session.expected_index(), 2);

        let event = session.submit_text("2/2|Oil~Pantry~12").unwrap();
        let expected_items = vec![
            item("Rice", "Grains", 50),
            item("Beans", "Grains", 30),
            item("Oil", "Pantry", 12),
        ];
        assert_eq!(
            event,
            ScanEvent::Completed {
                total: 2,
                items: expected_items.clone()
            }
        );
        assert!(session.is_complete());
        assert_eq!(session.items(), expected_items.as_slice());
    }

    #[test]
    fn test_scenario_out_of_sequence_leaves_state() {
        let mut session = ScanSession::new();
        session.submit(frame(1, 2, vec![item("Rice", "Grains", 5)])).unwrap();
        let before = session.state().clone();

        let err = session
            .submit(frame(3, 2, vec![item("X", "Y", 1)]))
            .unwrap_err();
        assert_eq!(
            err,
            ScanError::OutOfSequence {
                observed: 3,
                expected: 2,
                total: 2
            }
        );
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_scenario_malformed_then_valid() {
        let mut session = ScanSession::new();

        let err = session.submit_text("abc").unwrap_err();
        assert!(matches!(
            err,
            ScanError::MalformedFrame {
                defect: FrameDefect::BadHeader,
                ..
            }
        ));
        assert_eq!(session.state(), &SessionState::Empty);

        let event = session.submit_text("1/1|Rice~Grains~5").unwrap();
        assert!(matches!(event, ScanEvent::Completed { total: 1, .. }));
    }

    #[test]
    fn test_replay_is_duplicate_and_harmless() {
        let mut session = ScanSession::new();
        session.submit_text("1/3|Rice~Grains~5").unwrap();
        session.submit_text("2/3|Oil~Pantry~1").unwrap();
        let before = session.state().clone();

        let err = session.submit_text("1/3|Rice~Grains~5").unwrap_err();
        assert_eq!(
            err,
            ScanError::DuplicateFrame {
                index: 1,
                expected: 3,
                total: 3
            }
        );
        assert_eq!(session.state(), &before);
        assert_eq!(session.items().len(), 2);
        assert_eq!(session.expected_index(), 3);
    }

    #[test]
    fn test_total_mismatch() {
        let mut session = ScanSession::new();
        session.submit_text("1/2|Rice~Grains~5").unwrap();

        let err = session.submit_text("2/3|Oil~Pantry~1").unwrap_err();
        assert_eq!(
            err,
            ScanError::ProtocolMismatch {
                expected: 2,
                observed: 3,
                index: 2
            }
        );
        assert_eq!(session.expected_index(), 2);
    }

    #[test]
    fn test_mismatch_checked_before_duplicate() {
        let mut session = ScanSession::new();
        session.submit_text("1/2|Rice~Grains~5").unwrap();

        let err = session.submit_text("1/5|Rice~Grains~5").unwrap_err();
        assert_eq!(err.kind(), "protocol_mismatch");
    }

    #[test]
    fn test_gap_keeps_awaiting_until_correct_index() {
        let mut session = ScanSession::new();
        session.submit_text("1/3|A~C~1").unwrap();

        for _ in 0..3 {
            assert!(session.submit_text("3/3|C~C~3").is_err());
        }
        assert!(!session.is_complete());
        assert_eq!(session.expected_index(), 2);

        session.submit_text("2/3|B~C~2").unwrap();
        session.submit_text("3/3|C~C~3").unwrap();
        assert!(session.is_complete());
        assert_eq!(session.state().seen_indices(), 1..4);
    }

    #[test]
    fn test_empty_session_rejects_later_frames() {
        let mut session = ScanSession::new();

        let err = session.submit_text("2/3|B~C~2").unwrap_err();
        assert_eq!(
            err,
            ScanError::OutOfSequence {
                observed: 2,
                expected: 1,
                total: 3
            }
        );
        assert_eq!(session.total(), None);
    }

    #[test]
    fn test_complete_session_rejects_more_frames() {
        let mut session = ScanSession::new();
        session.submit_text("1/1|A~C~1").unwrap();

        let err = session.submit_text("1/1|A~C~1").unwrap_err();
        assert_eq!(err.kind(), "duplicate_frame");

        let err = session.submit(frame(2, 1, vec![])).unwrap_err();
        assert_eq!(err.kind(), "out_of_sequence");
        assert_eq!(session.items().len(), 1);
    }

    #[test]
    fn test_index_zero_is_out_of_sequence() {
        let (state, outcome) = transition(SessionState::Empty, frame(0, 2, vec![]));
        assert_eq!(state, SessionState::Empty);
        assert_eq!(outcome.unwrap_err().kind(), "out_of_sequence");
    }

    #[test]
    fn test_duplicate_names_are_appended_not_merged() {
        let mut session = ScanSession::new();
        session.submit_text("1/2|Rice~Grains~5").unwrap();
        session.submit_text("2/2|Rice~Grains~9").unwrap();

        assert_eq!(
            session.items(),
            &[item("Rice", "Grains", 5), item("Rice", "Grains", 9)]
        );
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut session = ScanSession::new();
        session.submit_text("1/2|Rice~Grains~5").unwrap();
        session.reset();
        assert_eq!(session.state(), &SessionState::Empty);

        session.submit_text("1/1|Rice~Grains~5").unwrap();
        session.reset();
        assert_eq!(session.state(), &SessionState::Empty);
        assert_eq!(session.expected_index(), 1);
    }

    #[test]
    fn test_transition_is_pure() {
        let state = SessionState::Awaiting {
            expected_index: 2,
            total: 2,
            items: vec![item("Rice", "Grains", 5)],
        };

        let (next, outcome) = transition(state.clone(), frame(2, 2, vec![item("Oil", "P", 1)]));
        assert!(outcome.is_ok());
        assert!(next.is_complete());

        // Same input, same output.
        let (again, _) = transition(state, frame(2, 2, vec![item("Oil", "P", 1)]));
        assert_eq!(next, again);
    }

    #[test]
    fn test_progress_event_json() {
        let event = ScanEvent::Progress {
            accepted_index: 1,
            total: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "progress");
        assert_eq!(json["acceptedIndex"], 1);
    }

    fn numbered(index: u32, total: u32) -> Frame {
        frame(index, total, vec![item(&format!("Item {index}"), "Misc", 1)])
    }

    proptest! {
        #[test]
        fn test_shuffled_batch_completes_only_in_order(
            order in (1u32..8).prop_flat_map(|total| Just((1..=total).collect::<Vec<u32>>()).prop_shuffle())
        ) {
            let total = order.len() as u32;
            let mut session = ScanSession::new();
            for &index in &order {
                let _ = session.submit(numbered(index, total));
            }

            let in_order = order.windows(2).all(|pair| pair[0] < pair[1]);
            prop_assert_eq!(session.is_complete(), in_order);
        }

        #[test]
        fn test_only_the_next_index_is_accepted(
            total in 1u32..6,
            indices in prop::collection::vec(0u32..8, 0..16),
        ) {
            let mut session = ScanSession::new();
            let mut expected = 1;

            for index in indices {
                let accepted = session.submit(numbered(index, total)).is_ok();
                prop_assert_eq!(accepted, index == expected && index <= total);
                if accepted {
                    expected += 1;
                }
                prop_assert_eq!(session.items().len() as u32, expected - 1);
            }

            prop_assert_eq!(session.is_complete(), expected == total + 1);
        }
    }
}
