//! # Plan Application
//!
//! Executes a reconciliation plan against the store, one mutation at a time.
//!
//! ## Execution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mutations[0] ──► mutations[1] ──► ... ──► mutations[n-1]               │
//! │       │                │                                                │
//! │       ▼                ▼                                                │
//! │   committed        committed        each write commits on its own       │
//! │                                                                         │
//! │  CreateCategory { slot } ──► slots[slot] = new category id              │
//! │  CreateProduct(Pending(slot)) ──► reads slots[slot]                     │
//! │                                                                         │
//! │  First failure stops the run:                                           │
//! │    StoreFailure { applied: k, pending: n - k, source }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no enclosing transaction. A failed run leaves the first `k`
//! mutations in place; the error reports `k` so the operator knows the store
//! is partially updated.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ApplyError, DbResult};
use crate::repository::category::CategoryRepository;
use crate::repository::product::ProductRepository;
use stockscan_core::{CategoryRef, Mutation};

/// Outcome of a fully applied plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub applied: usize,
    pub stock_updates: usize,
    pub products_created: usize,
    pub categories_created: usize,
}

/// Applies `mutations` in order, stopping at the first failure.
pub async fn apply_mutations(
    categories: &CategoryRepository,
    products: &ProductRepository,
    mutations: &[Mutation],
) -> Result<ApplyReport, ApplyError> {
    info!(mutations = mutations.len(), "Applying reconciliation plan");

    let mut report = ApplyReport::default();
    let mut slots: HashMap<usize, String> = HashMap::new();

    for (position, mutation) in mutations.iter().enumerate() {
        debug!(position, kind = mutation.label(), "Applying mutation");

        let outcome = match mutation {
            Mutation::UpdateStock {
                product_id,
                previous_stock,
                new_stock,
            } => {
                debug!(product_id = %product_id, previous_stock, new_stock, "Stock update");
                products
                    .set_stock(product_id, *new_stock)
                    .await
                    .map(|()| report.stock_updates += 1)
            }

            Mutation::CreateCategory { slot, name } => {
                categories.insert(name).await.map(|category| {
                    slots.insert(*slot, category.id);
                    report.categories_created += 1;
                })
            }

            Mutation::CreateProduct {
                name,
                category,
                initial_stock,
            } => {
                let category_id = match category {
                    CategoryRef::Existing(id) => id.as_str(),
                    CategoryRef::Pending(slot) => match slots.get(slot) {
                        Some(id) => id.as_str(),
                        None => {
                            warn!(position, slot, "Pending category slot never filled");
                            return Err(ApplyError::UnresolvedCategory {
                                position,
                                slot: *slot,
                                pending: mutations.len() - position,
                            });
                        }
                    },
                };

                create_product(products, name, category_id, *initial_stock)
                    .await
                    .map(|()| report.products_created += 1)
            }
        };

        if let Err(source) = outcome {
            let pending = mutations.len() - position;
            warn!(
                applied = position,
                pending,
                kind = mutation.label(),
                error = %source,
                "Plan application stopped"
            );
            return Err(ApplyError::StoreFailure {
                applied: position,
                pending,
                source,
            });
        }

        report.applied += 1;
    }

    info!(
        applied = report.applied,
        stock_updates = report.stock_updates,
        products_created = report.products_created,
        categories_created = report.categories_created,
        "Reconciliation plan applied"
    );
    Ok(report)
}

async fn create_product(
    products: &ProductRepository,
    name: &str,
    category_id: &str,
    stock: i64,
) -> DbResult<()> {
    products.insert(name, Some(category_id), stock).await.map(|_| ())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use stockscan_core::reconcile::reconcile;
    use stockscan_core::RawItem;

    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let grains = db.categories().insert("Grains").await.unwrap();
        db.products()
            .insert("Rice", Some(&grains.id), 20)
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_apply_reconciled_batch() {
        let db = seeded().await;
        let snapshot = db.snapshot().await.unwrap();
        let items = vec![
            RawItem::new("Rice", "Grains", 5),
            RawItem::new("Oil", "Pantry", 12),
            RawItem::new("Salt", "pantry", 3),
            RawItem::new("rice", "Grains", 9),
        ];
        let plan = reconcile(&items, &snapshot);

        let report = db.apply_plan(&plan.mutations).await.unwrap();
        assert_eq!(
            report,
            ApplyReport {
                applied: 4,
                stock_updates: 1,
                products_created: 2,
                categories_created: 1,
            }
        );

        let after = db.snapshot().await.unwrap();
        assert_eq!(after.categories.len(), 2);
        let rice = after.products.iter().find(|p| p.name == "Rice").unwrap();
        assert_eq!(rice.stock, 9);
        let salt = after.products.iter().find(|p| p.name == "Salt").unwrap();
        assert_eq!(salt.category_name.as_deref(), Some("Pantry"));
    }

    #[tokio::test]
    async fn test_failure_reports_partial_progress() {
        let db = seeded().await;
        let snapshot = db.snapshot().await.unwrap();
        let plan = reconcile(
            &[
                RawItem::new("Oil", "Pantry", 12),
                RawItem::new("Rice", "Grains", 9),
                RawItem::new("Salt", "Pantry", 3),
            ],
            &snapshot,
        );
        // CreateCategory, CreateProduct(Oil), UpdateStock(Rice), CreateProduct(Salt)
        assert_eq!(plan.len(), 4);

        let rice_id = snapshot.products[0].id.clone();
        db.products().delete(&rice_id).await.unwrap();

        let err = db.apply_plan(&plan.mutations).await.unwrap_err();
        match err {
            ApplyError::StoreFailure {
                applied,
                pending,
                source,
            } => {
                assert_eq!(applied, 2);
                assert_eq!(pending, 2);
                assert!(matches!(source, DbError::NotFound { .. }));
            }
            other => panic!("expected StoreFailure, got {other:?}"),
        }

        // Earlier mutations stay committed; later ones never ran.
        let after = db.snapshot().await.unwrap();
        assert!(after.products.iter().any(|p| p.name == "Oil"));
        assert!(!after.products.iter().any(|p| p.name == "Salt"));
    }

    #[tokio::test]
    async fn test_unfilled_slot_is_rejected() {
        let db = seeded().await;
        let mutations = vec![
            Mutation::CreateProduct {
                name: "Oil".to_string(),
                category: CategoryRef::Pending(3),
                initial_stock: 1,
            },
            Mutation::CreateCategory {
                slot: 3,
                name: "Pantry".to_string(),
            },
        ];

        let err = db.apply_plan(&mutations).await.unwrap_err();
        assert!(matches!(
            err,
            ApplyError::UnresolvedCategory {
                position: 0,
                slot: 3,
                pending: 2
            }
        ));
        assert_eq!(err.applied(), 0);
        assert_eq!(err.pending(), 2);
    }

    #[tokio::test]
    async fn test_empty_plan_is_noop() {
        let db = seeded().await;
        let report = db.apply_plan(&[]).await.unwrap();
        assert_eq!(report, ApplyReport::default());
    }
}
