//! # Camera Intake
//!
//! Stands in for the camera collaborator: a background task reads lines,
//! turns them into [`Input`]s and hands them to the controller over a
//! channel.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin / --input file                                                   │
//! │       │  one line per decoded code or operator action                   │
//! │       ▼                                                                 │
//! │  reader task ── Input::Decoded ── waits for the next scan tick ──┐      │
//! │       │                                                          │      │
//! │       └──────── Input::Action ── sent immediately ───────────────┤      │
//! │                                                                  ▼      │
//! │                                                mpsc::Receiver<Input>    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blank lines are skipped. Bytes that are not UTF-8 are replaced with
//! U+FFFD and passed on, so the decoder reports them as a malformed frame
//! and the reader keeps going.
//!
//! Decoded text and operator actions share one line stream. A scanned code
//! whose text is exactly a known action (`:confirm`) is taken as that action;
//! any other `:` line is passed on as decoded text and fails to decode.

use std::borrow::Cow;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Capacity of the reader → controller channel.
const CHANNEL_CAPACITY: usize = 64;

/// Operator actions typed between scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAction {
    /// Dismiss the error view.
    Ack,
    /// Apply the completed batch.
    Confirm,
    /// Discard the completed batch.
    Reject,
    /// Discard whatever the session holds.
    Cancel,
    /// Report the desk state.
    Status,
}

impl OperatorAction {
    /// Parses the word after `:`.
    pub fn parse(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "ack" => Some(OperatorAction::Ack),
            "confirm" => Some(OperatorAction::Confirm),
            "reject" => Some(OperatorAction::Reject),
            "cancel" | "reset" => Some(OperatorAction::Cancel),
            "status" => Some(OperatorAction::Status),
            _ => None,
        }
    }
}

/// One unit of input for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Text the camera decoded from a code.
    Decoded(String),
    /// An operator action.
    Action(OperatorAction),
}

/// Classifies one input line. Returns `None` for lines to skip.
pub fn classify_line(line: &str) -> Option<Input> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(action) = trimmed.strip_prefix(':').and_then(OperatorAction::parse) {
        return Some(Input::Action(action));
    }

    // Decoded text is passed on untrimmed; the decoder owns whitespace.
    Some(Input::Decoded(line.to_string()))
}

/// Spawns the reader task.
///
/// Decoded texts are released at most once per `scan_interval`; a zero
/// interval disables the throttle. The channel closes when the reader hits
/// end of input or the receiver is dropped.
pub fn spawn_reader<R>(
    reader: R,
    scan_interval: Duration,
) -> (mpsc::Receiver<Input>, JoinHandle<std::io::Result<()>>)
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(read_lines(reader, scan_interval, tx));
    (rx, handle)
}

async fn read_lines<R>(
    reader: R,
    scan_interval: Duration,
    tx: mpsc::Sender<Input>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut ticker = (!scan_interval.is_zero()).then(|| {
        let mut ticker = interval(scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    let mut reader = reader;
    let mut buf = Vec::new();
    let mut count = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = line_text(&buf);
        let Some(input) = classify_line(&line) else {
            continue;
        };

        if let (Input::Decoded(_), Some(ticker)) = (&input, ticker.as_mut()) {
            ticker.tick().await;
        }

        count += 1;
        if tx.send(input).await.is_err() {
            debug!("Controller gone, stopping reader");
            return Ok(());
        }
    }

    info!(lines = count, "Input closed");
    Ok(())
}

/// Strips the line ending and converts to text, replacing invalid UTF-8.
fn line_text(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    let text = String::from_utf8_lossy(raw);
    if let Cow::Owned(_) = text {
        warn!(bytes = raw.len(), "Input line is not valid UTF-8");
    }
    text.into_owned()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("   "), None);
        assert_eq!(
            classify_line("1/1|Rice~Grains~5"),
            Some(Input::Decoded("1/1|Rice~Grains~5".to_string()))
        );
        assert_eq!(
            classify_line(" :Confirm "),
            Some(Input::Action(OperatorAction::Confirm))
        );
        assert_eq!(
            classify_line(":reset"),
            Some(Input::Action(OperatorAction::Cancel))
        );
        assert_eq!(
            classify_line(":dance"),
            Some(Input::Decoded(":dance".to_string()))
        );
    }

    #[tokio::test]
    async fn test_reader_delivers_in_order() {
        let text = "1/2|Rice~Grains~5\n\n:status\n2/2|Oil~Pantry~1\n";
        let (mut rx, handle) = spawn_reader(text.as_bytes(), Duration::ZERO);

        let mut received = Vec::new();
        while let Some(input) = rx.recv().await {
            received.push(input);
        }
        handle.await.unwrap().unwrap();

        assert_eq!(
            received,
            vec![
                Input::Decoded("1/2|Rice~Grains~5".to_string()),
                Input::Action(OperatorAction::Status),
                Input::Decoded("2/2|Oil~Pantry~1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_reader_survives_invalid_utf8() {
        let text: &[u8] = b"\xff\xfe\r\n1/1|Rice~Grains~5\n";
        let (mut rx, handle) = spawn_reader(text, Duration::ZERO);

        let mut received = Vec::new();
        while let Some(input) = rx.recv().await {
            received.push(input);
        }
        handle.await.unwrap().unwrap();

        assert_eq!(
            received,
            vec![
                Input::Decoded("\u{FFFD}\u{FFFD}".to_string()),
                Input::Decoded("1/1|Rice~Grains~5".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_text_strips_endings() {
        assert_eq!(line_text(b"1/1\r\n"), "1/1");
        assert_eq!(line_text(b"1/1"), "1/1");
    }

    #[tokio::test]
    async fn test_reader_throttles_decoded_text() {
        let text = "a\nb\nc\n";
        let started = tokio::time::Instant::now();
        let (mut rx, _handle) = spawn_reader(text.as_bytes(), Duration::from_millis(20));

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }

        // First tick is immediate, then two full intervals.
        assert_eq!(count, 3);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
