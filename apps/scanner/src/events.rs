//! # Event Stream
//!
//! Everything the host tells the outside world, one JSON object per line on
//! stdout.
//!
//! ## Shapes
//! ```text
//! {"event":"progress","acceptedIndex":1,"total":2}
//! {"event":"completed","total":2,"items":[...],"summary":{...}}
//! {"event":"failure","code":"OUT_OF_SEQUENCE","message":"...","text":"3/3|...",
//!  "expected":2,"observed":3}
//! {"event":"applied","applied":3,"stockUpdates":1,...}
//! {"event":"applyFailed","code":"STORE_FAILURE","message":"...","applied":2,"pending":1}
//! {"event":"cancelled","discardedItems":2}
//! {"event":"status","phase":"showingError","expectedIndex":1,"total":null,"items":0,
//!  "error":"..."}
//! ```

use std::io::Write;

use serde::Serialize;
use stockscan_core::{ItemPreview, PlanSummary, ScanError};
use stockscan_db::{ApplyError, ApplyReport};

use crate::error::{AppError, ErrorCode};
use crate::state::DeskStatus;

/// One line of output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    /// A frame was accepted; more to come.
    #[serde(rename_all = "camelCase")]
    Progress { accepted_index: u32, total: u32 },

    /// The batch is complete and waiting for confirmation.
    #[serde(rename_all = "camelCase")]
    Completed {
        total: u32,
        items: Vec<ItemPreview>,
        summary: PlanSummary,
    },

    /// A scanned text was rejected, or an operator action was not valid.
    #[serde(rename_all = "camelCase")]
    Failure {
        code: ErrorCode,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        expected: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        observed: Option<u32>,
    },

    /// The confirmed batch was written to the store.
    Applied(ApplyReport),

    /// Writing the confirmed batch stopped partway.
    #[serde(rename_all = "camelCase")]
    ApplyFailed {
        code: ErrorCode,
        message: String,
        applied: usize,
        pending: usize,
    },

    /// The session was discarded.
    #[serde(rename_all = "camelCase")]
    Cancelled { discarded_items: usize },

    /// Reply to `:status`.
    Status(DeskStatus),
}

impl Event {
    /// Failure event for a rejected scan.
    ///
    /// `text` is the literal line the camera produced.
    pub fn scan_failure(err: &ScanError, text: &str) -> Self {
        let AppError { code, message } = AppError::from(err);
        let (expected, observed) = match err.indices() {
            Some((expected, observed)) => (Some(expected), Some(observed)),
            None => (None, None),
        };
        Event::Failure {
            code,
            message,
            text: Some(text.to_string()),
            expected,
            observed,
        }
    }

    /// Failure event without scanned text (operator mistakes, store reads).
    pub fn failure(err: AppError) -> Self {
        Event::Failure {
            code: err.code,
            message: err.message,
            text: None,
            expected: None,
            observed: None,
        }
    }

    /// Event for a plan that failed to apply.
    pub fn apply_failed(err: ApplyError) -> Self {
        let applied = err.applied();
        let pending = err.pending();
        let AppError { code, message } = AppError::from(err);
        Event::ApplyFailed {
            code,
            message,
            applied,
            pending,
        }
    }
}

// =============================================================================
// Sink
// =============================================================================

/// Writes events as JSON lines.
#[derive(Debug)]
pub struct EventSink<W: Write> {
    out: W,
}

impl EventSink<std::io::Stdout> {
    /// Sink on the process stdout.
    pub fn stdout() -> Self {
        EventSink::new(std::io::stdout())
    }
}

impl<W: Write> EventSink<W> {
    pub fn new(out: W) -> Self {
        EventSink { out }
    }

    /// Writes one event and flushes, so a reader sees it immediately.
    pub fn emit(&mut self, event: &Event) -> Result<(), AppError> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockscan_core::FrameDefect;

    fn json(event: &Event) -> serde_json::Value {
        serde_json::to_value(event).unwrap()
    }

    #[test]
    fn test_progress_shape() {
        let value = json(&Event::Progress {
            accepted_index: 1,
            total: 2,
        });
        assert_eq!(value["event"], "progress");
        assert_eq!(value["acceptedIndex"], 1);
    }

    #[test]
    fn test_scan_failure_carries_text_and_indices() {
        let err = ScanError::OutOfSequence {
            observed: 3,
            expected: 2,
            total: 2,
        };
        let value = json(&Event::scan_failure(&err, "3/2|X~Y~1"));
        assert_eq!(value["event"], "failure");
        assert_eq!(value["code"], "OUT_OF_SEQUENCE");
        assert_eq!(value["text"], "3/2|X~Y~1");
        assert_eq!(value["expected"], 2);
        assert_eq!(value["observed"], 3);

        let err = ScanError::malformed("abc", FrameDefect::BadHeader);
        let value = json(&Event::scan_failure(&err, "abc"));
        assert!(value.get("expected").is_none());
    }

    #[test]
    fn test_applied_is_flattened() {
        let value = json(&Event::Applied(ApplyReport {
            applied: 3,
            stock_updates: 1,
            products_created: 1,
            categories_created: 1,
        }));
        assert_eq!(value["event"], "applied");
        assert_eq!(value["stockUpdates"], 1);
    }

    #[test]
    fn test_apply_failed_counts_pending() {
        let event = Event::apply_failed(ApplyError::UnresolvedCategory {
            position: 1,
            slot: 0,
            pending: 3,
        });
        let value = json(&event);
        assert_eq!(value["event"], "applyFailed");
        assert_eq!(value["applied"], 1);
        assert_eq!(value["pending"], 3);
    }

    #[test]
    fn test_sink_writes_lines() {
        let mut sink = EventSink::new(Vec::new());
        sink.emit(&Event::Cancelled { discarded_items: 2 }).unwrap();
        sink.emit(&Event::Cancelled { discarded_items: 0 }).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"event":"cancelled","discardedItems":2}"#);
    }
}
