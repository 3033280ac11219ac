//! # Reconciliation
//!
//! Turns the items of a completed scan into store mutations.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reconciliation of one batch                          │
//! │                                                                         │
//! │  items (arrival order, duplicates kept)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  collapse by normalized name ── last occurrence wins,                   │
//! │       │                         first occurrence keeps its position     │
//! │       ▼                                                                 │
//! │  for each surviving item:                                               │
//! │       │                                                                 │
//! │       ├── product in snapshot? ──► UpdateStock { prev = snapshot }      │
//! │       │                                                                 │
//! │       └── no ──► category in snapshot? ──► CreateProduct(Existing)      │
//! │                       │                                                 │
//! │                       ├── created earlier in batch ──► CreateProduct    │
//! │                       │                                (Pending slot)   │
//! │                       └── no ──► CreateCategory { slot }                │
//! │                                  CreateProduct(Pending slot)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Baseline
//! `previous_stock` always comes from the pre-batch snapshot. Nothing in a
//! plan depends on another mutation of the same plan except pending category
//! slots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{normalize_name, Category, CategoryRef, Mutation, Product, RawItem, StockLevel};

// =============================================================================
// Snapshot
// =============================================================================

/// Point-in-time inventory read used as the reconciliation baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

impl Snapshot {
    /// Creates a snapshot from store reads.
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Snapshot {
            products,
            categories,
        }
    }

    /// Builds the name index for this snapshot.
    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex::build(self)
    }
}

/// Normalized-name lookup over a [`Snapshot`], built once per snapshot.
///
/// When two products (or categories) normalize to the same name, the first
/// one in snapshot order is kept.
#[derive(Debug, Clone)]
pub struct SnapshotIndex<'a> {
    products: HashMap<String, &'a Product>,
    categories: HashMap<String, &'a Category>,
}

impl<'a> SnapshotIndex<'a> {
    /// Indexes every product and category of `snapshot`.
    pub fn build(snapshot: &'a Snapshot) -> Self {
        let mut products = HashMap::with_capacity(snapshot.products.len());
        for product in &snapshot.products {
            products.entry(normalize_name(&product.name)).or_insert(product);
        }

        let mut categories = HashMap::with_capacity(snapshot.categories.len());
        for category in &snapshot.categories {
            categories
                .entry(normalize_name(&category.name))
                .or_insert(category);
        }

        SnapshotIndex {
            products,
            categories,
        }
    }

    /// Finds a product by (un-normalized) name.
    pub fn product(&self, name: &str) -> Option<&'a Product> {
        self.products.get(&normalize_name(name)).copied()
    }

    /// Finds a category by (un-normalized) name.
    pub fn category(&self, name: &str) -> Option<&'a Category> {
        self.categories.get(&normalize_name(name)).copied()
    }
}

// =============================================================================
// Plan
// =============================================================================

/// Ordered mutations produced for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPlan {
    pub mutations: Vec<Mutation>,
}

/// Counts of each mutation kind in a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub stock_updates: usize,
    pub products_created: usize,
    pub categories_created: usize,
}

impl ReconciliationPlan {
    /// Number of mutations.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns true when there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Counts mutations by kind.
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for mutation in &self.mutations {
            match mutation {
                Mutation::UpdateStock { .. } => summary.stock_updates += 1,
                Mutation::CreateProduct { .. } => summary.products_created += 1,
                Mutation::CreateCategory { .. } => summary.categories_created += 1,
            }
        }
        summary
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Reconciles scanned items against a snapshot.
///
/// ## Example
/// ```rust
/// use stockscan_core::reconcile::{reconcile, Snapshot};
/// use stockscan_core::{Mutation, Product, RawItem};
///
/// let snapshot = Snapshot::new(
///     vec![Product {
///         id: "p-1".into(),
///         name: "Rice".into(),
///         stock: 20,
///         category_id: None,
///         category_name: None,
///     }],
///     vec![],
/// );
/// let items = vec![RawItem::new("rice", "Grains", 5), RawItem::new("RICE", "Grains", 9)];
///
/// let plan = reconcile(&items, &snapshot);
/// assert_eq!(plan.mutations, vec![Mutation::UpdateStock {
///     product_id: "p-1".into(),
///     previous_stock: 20,
///     new_stock: 9,
/// }]);
/// ```
pub fn reconcile(items: &[RawItem], snapshot: &Snapshot) -> ReconciliationPlan {
    reconcile_indexed(items, &snapshot.index())
}

/// Reconciles scanned items against a prebuilt index.
pub fn reconcile_indexed(items: &[RawItem], index: &SnapshotIndex<'_>) -> ReconciliationPlan {
    let mut mutations = Vec::new();
    let mut pending_categories: HashMap<String, usize> = HashMap::new();

    for item in collapse_last_write_wins(items) {
        if let Some(product) = index.product(&item.name) {
            mutations.push(Mutation::UpdateStock {
                product_id: product.id.clone(),
                previous_stock: product.stock,
                new_stock: item.quantity,
            });
            continue;
        }

        let category = match index.category(&item.category) {
            Some(existing) => CategoryRef::Existing(existing.id.clone()),
            None => {
                let next_slot = pending_categories.len();
                let slot = *pending_categories
                    .entry(item.normalized_category())
                    .or_insert_with(|| {
                        mutations.push(Mutation::CreateCategory {
                            slot: next_slot,
                            name: item.category.trim().to_string(),
                        });
                        next_slot
                    });
                CategoryRef::Pending(slot)
            }
        };

        mutations.push(Mutation::CreateProduct {
            name: item.name.trim().to_string(),
            category,
            initial_stock: item.quantity,
        });
    }

    ReconciliationPlan { mutations }
}

/// Collapses duplicate names: each normalized name keeps the position of its
/// first occurrence and the values of its last.
fn collapse_last_write_wins(items: &[RawItem]) -> Vec<&RawItem> {
    let mut order: Vec<&RawItem> = Vec::with_capacity(items.len());
    let mut position: HashMap<String, usize> = HashMap::with_capacity(items.len());

    for item in items {
        match position.get(&item.normalized_name()) {
            Some(&at) => order[at] = item,
            None => {
                position.insert(item.normalized_name(), order.len());
                order.push(item);
            }
        }
    }

    order
}

// =============================================================================
// Preview
// =============================================================================

/// One scanned item with the stock it replaces, for "before → after" display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemPreview {
    #[serde(flatten)]
    #[ts(flatten)]
    pub item: RawItem,

    /// Stock in the pre-batch snapshot; `None` for unknown products.
    pub known_stock: Option<i64>,

    /// Level of `known_stock`.
    pub level_before: Option<StockLevel>,

    /// Stock level after the update.
    pub level_after: StockLevel,
}

/// Pairs every accumulated item (duplicates included) with its pre-batch
/// stock.
pub fn preview(items: &[RawItem], index: &SnapshotIndex<'_>) -> Vec<ItemPreview> {
    items
        .iter()
        .map(|item| {
            let known = index.product(&item.name);
            ItemPreview {
                item: item.clone(),
                known_stock: known.map(|p| p.stock),
                level_before: known.map(Product::stock_level),
                level_after: StockLevel::classify(item.quantity),
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
