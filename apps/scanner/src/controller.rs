//! # Controller
//!
//! Turns each [`Input`] into zero or more [`Event`]s.
//!
//! ## Batch Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Decoded text ──► desk.offer()                                          │
//! │                     │                                                   │
//! │                     ├── Dropped ───────────► (nothing, debug log)       │
//! │                     ├── Rejected ──────────► failure                    │
//! │                     ├── Progress ──────────► progress                   │
//! │                     └── Completed                                       │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                     db.snapshot() ──► reconcile + preview               │
//! │                           │           plan kept until :confirm          │
//! │                           ▼                                             │
//! │                     completed { items + known stock, summary }          │
//! │                           │                                             │
//! │          :confirm (or --yes) ──► db.apply_plan() ──► applied            │
//! │                                                  └─► applyFailed        │
//! │          :reject / :cancel ────► cancelled (store untouched)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The plan is computed once, against the snapshot read at completion, so
//! the stock shown to the operator is the `previousStock` that gets applied.

use stockscan_core::reconcile::{preview, reconcile_indexed};
use stockscan_core::{RawItem, ReconciliationPlan, ScanEvent};
use stockscan_db::Database;
use tracing::{error, info, warn};

use crate::camera::{Input, OperatorAction};
use crate::error::AppError;
use crate::events::Event;
use crate::state::{DeskOutcome, ScanState};

/// Drives one scanner session against one store.
#[derive(Debug)]
pub struct Controller {
    db: Database,
    state: ScanState,
    auto_confirm: bool,
    pending: Option<ReconciliationPlan>,
}

impl Controller {
    /// Creates a controller.
    pub fn new(db: Database, state: ScanState, auto_confirm: bool) -> Self {
        Controller {
            db,
            state,
            auto_confirm,
            pending: None,
        }
    }

    /// Handles one input.
    pub async fn handle(&mut self, input: Input) -> Vec<Event> {
        match input {
            Input::Decoded(text) => self.on_decoded(&text).await,
            Input::Action(action) => self.on_action(action).await,
        }
    }

    async fn on_decoded(&mut self, text: &str) -> Vec<Event> {
        let outcome = self.state.with_desk_mut(|desk| desk.offer(text));

        match outcome {
            DeskOutcome::Dropped { .. } => Vec::new(),

            DeskOutcome::Rejected(err) => {
                warn!(kind = err.kind(), error = %err, "Scan rejected");
                vec![Event::scan_failure(&err, text)]
            }

            DeskOutcome::Accepted(ScanEvent::Progress {
                accepted_index,
                total,
            }) => {
                info!(accepted_index, total, "Frame accepted");
                vec![Event::Progress {
                    accepted_index,
                    total,
                }]
            }

            DeskOutcome::Accepted(ScanEvent::Completed { total, items }) => {
                info!(total, items = items.len(), "Batch complete");
                let mut events = vec![self.prepare_batch(total, &items).await];
                if self.auto_confirm && self.pending.is_some() {
                    events.extend(self.confirm().await);
                }
                events
            }
        }
    }

    /// Reads the snapshot and builds the plan and preview for a completed batch.
    async fn prepare_batch(&mut self, total: u32, items: &[RawItem]) -> Event {
        let snapshot = match self.db.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "Snapshot read failed, discarding batch");
                self.state.with_desk_mut(|desk| desk.finish_batch());
                return Event::failure(AppError::from(err));
            }
        };

        let index = snapshot.index();
        let plan = reconcile_indexed(items, &index);
        let summary = plan.summary();
        let rows = preview(items, &index);

        info!(
            stock_updates = summary.stock_updates,
            products_created = summary.products_created,
            categories_created = summary.categories_created,
            "Plan ready for confirmation"
        );
        self.pending = Some(plan);

        Event::Completed {
            total,
            items: rows,
            summary,
        }
    }

    async fn on_action(&mut self, action: OperatorAction) -> Vec<Event> {
        match action {
            OperatorAction::Ack => {
                if self.state.with_desk_mut(|desk| desk.acknowledge()) {
                    vec![self.status()]
                } else {
                    vec![Event::failure(AppError::invalid_action(
                        "No error to acknowledge",
                    ))]
                }
            }

            OperatorAction::Confirm => self.confirm().await,

            OperatorAction::Reject => {
                if self.pending.is_none() {
                    return vec![Event::failure(AppError::invalid_action(
                        "No completed batch to reject",
                    ))];
                }
                vec![self.cancel()]
            }

            OperatorAction::Cancel => vec![self.cancel()],

            OperatorAction::Status => vec![self.status()],
        }
    }

    async fn confirm(&mut self) -> Vec<Event> {
        let Some(plan) = self.pending.take() else {
            return vec![Event::failure(AppError::invalid_action(
                "No completed batch to confirm",
            ))];
        };

        let event = match self.db.apply_plan(&plan.mutations).await {
            Ok(report) => Event::Applied(report),
            Err(err) => {
                error!(applied = err.applied(), error = %err, "Store left partially updated");
                Event::apply_failed(err)
            }
        };

        self.state.with_desk_mut(|desk| desk.finish_batch());
        vec![event]
    }

    fn cancel(&mut self) -> Event {
        self.pending = None;
        let discarded_items = self.state.with_desk_mut(|desk| desk.cancel());
        info!(discarded_items, "Session cancelled");
        Event::Cancelled { discarded_items }
    }

    fn status(&self) -> Event {
        Event::Status(self.state.with_desk(|desk| desk.status()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
