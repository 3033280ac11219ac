//! # Domain Types
//!
//! Core domain types used throughout Stockscan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Scanned side                        Inventory side (snapshot)          │
//! │  ┌─────────────────┐                 ┌─────────────────┐                │
//! │  │     Frame       │                 │    Product      │                │
//! │  │  ─────────────  │                 │  ─────────────  │                │
//! │  │  index / total  │                 │  id (UUID)      │                │
//! │  │  items ───────┐ │                 │  name, stock    │                │
//! │  └───────────────┼─┘                 │  category_*     │                │
//! │                  ▼                   └─────────────────┘                │
//! │  ┌─────────────────┐                 ┌─────────────────┐                │
//! │  │    RawItem      │                 │    Category     │                │
//! │  │  name           │                 │  id, name       │                │
//! │  │  category       │                 └─────────────────┘                │
//! │  │  quantity       │                                                    │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  Output of reconciliation: Mutation (UpdateStock | CreateCategory |     │
//! │                                      CreateProduct)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Name Matching
//! Products and categories are matched by *normalized* name: trimmed and
//! case-folded. See [`normalize_name`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Name Normalization
// =============================================================================

/// Normalizes a product or category name for matching.
///
/// Trims surrounding whitespace and lowercases the result, so
/// `"  Rice "` and `"RICE"` normalize to the same key.
///
/// ## Example
/// ```rust
/// use stockscan_core::normalize_name;
///
/// assert_eq!(normalize_name("  Brown Rice "), "brown rice");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Raw Item
// =============================================================================

/// One item update carried by a frame: "set `name` to `quantity` units".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    /// Product name as scanned (trimmed, non-empty).
    pub name: String,

    /// Category name as scanned (trimmed, non-empty).
    pub category: String,

    /// New absolute stock level (never a delta).
    pub quantity: i64,
}

impl RawItem {
    /// Creates a new item.
    pub fn new(name: impl Into<String>, category: impl Into<String>, quantity: i64) -> Self {
        RawItem {
            name: name.into(),
            category: category.into(),
            quantity,
        }
    }

    /// Returns the normalized product name used for matching.
    #[inline]
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Returns the normalized category name used for matching.
    #[inline]
    pub fn normalized_category(&self) -> String {
        normalize_name(&self.category)
    }
}

// =============================================================================
// Frame
// =============================================================================

/// One decoded scan payload.
///
/// Produced by [`crate::frame::decode_frame`], which guarantees
/// `1 <= index <= total`. The fields are public so callers can build frames
/// directly; the session re-checks the bounds it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// 1-based position of this frame in the batch.
    pub index: u32,

    /// Number of frames in the batch.
    pub total: u32,

    /// Items in segment order.
    pub items: Vec<RawItem>,
}

impl Frame {
    /// Creates a frame from its parts.
    pub fn new(index: u32, total: u32, items: Vec<RawItem>) -> Self {
        Frame {
            index,
            total,
            items,
        }
    }

    /// Returns true if this is the last frame of its batch.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.index == self.total
    }
}

// =============================================================================
// Snapshot Entities
// =============================================================================

/// A product as read from the inventory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Current stock level.
    pub stock: i64,

    /// Category the product belongs to, if any.
    pub category_id: Option<String>,

    /// Name of that category (joined at read time).
    pub category_name: Option<String>,
}

impl Product {
    /// Classifies the current stock level.
    #[inline]
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.stock)
    }
}

/// A product category as read from the inventory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Stock Level
// =============================================================================

/// Coarse stock availability used when displaying stock.
///
/// ## Thresholds
/// ```text
///   0 ──────── 10 ──────── 25 ─────────────►
///   │   Low     │  Medium   │   Available
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// 10 units or fewer.
    Low,
    /// 11 to 25 units.
    Medium,
    /// More than 25 units.
    Available,
}

impl StockLevel {
    /// Upper bound (inclusive) of the low band.
    pub const LOW_MAX: i64 = 10;

    /// Upper bound (inclusive) of the medium band.
    pub const MEDIUM_MAX: i64 = 25;

    /// Classifies a stock count.
    pub fn classify(stock: i64) -> Self {
        if stock <= Self::LOW_MAX {
            StockLevel::Low
        } else if stock <= Self::MEDIUM_MAX {
            StockLevel::Medium
        } else {
            StockLevel::Available
        }
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Reference to the category a new product should belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CategoryRef {
    /// A category that already exists in the snapshot.
    Existing(String),

    /// A category created earlier in the same plan, identified by the
    /// `slot` of its [`Mutation::CreateCategory`].
    Pending(usize),
}

/// One store change produced by reconciliation.
///
/// Mutations are applied in order and exactly once. A `CreateProduct` that
/// references [`CategoryRef::Pending`] always comes after the
/// `CreateCategory` carrying that slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    /// Overwrite the stock of an existing product.
    #[serde(rename_all = "camelCase")]
    UpdateStock {
        product_id: String,
        /// Stock in the pre-batch snapshot.
        previous_stock: i64,
        new_stock: i64,
    },

    /// Create a category that is missing from the snapshot.
    #[serde(rename_all = "camelCase")]
    CreateCategory { slot: usize, name: String },

    /// Create a product that is missing from the snapshot.
    #[serde(rename_all = "camelCase")]
    CreateProduct {
        name: String,
        category: CategoryRef,
        initial_stock: i64,
    },
}

impl Mutation {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::UpdateStock { .. } => "update_stock",
            Mutation::CreateCategory { .. } => "create_category",
            Mutation::CreateProduct { .. } => "create_product",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Rice"), "rice");
        assert_eq!(normalize_name("  RICE\t"), "rice");
        assert_eq!(normalize_name("Aceite de Oliva"), "aceite de oliva");
    }

    #[test]
    fn test_stock_level_bands() {
        assert_eq!(StockLevel::classify(0), StockLevel::Low);
        assert_eq!(StockLevel::classify(10), StockLevel::Low);
        assert_eq!(StockLevel::classify(11), StockLevel::Medium);
        assert_eq!(StockLevel::classify(25), StockLevel::Medium);
        assert_eq!(StockLevel::classify(26), StockLevel::Available);
    }

    #[test]
    fn test_frame_is_last() {
        assert!(Frame::new(2, 2, vec![]).is_last());
        assert!(!Frame::new(1, 2, vec![]).is_last());
    }

    #[test]
    fn test_mutation_json_shape() {
        let mutation = Mutation::CreateProduct {
            name: "Oil".to_string(),
            category: CategoryRef::Pending(0),
            initial_stock: 12,
        };
        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json["type"], "create_product");
        assert_eq!(json["initialStock"], 12);
        assert_eq!(json["category"]["kind"], "pending");
        assert_eq!(json["category"]["value"], 0);
    }
}
