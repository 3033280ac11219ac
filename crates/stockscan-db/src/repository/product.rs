//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Listing with the category name joined in (snapshot reads)
//! - Creating products with an initial stock
//! - Setting stock to an absolute level
//!
//! ## Absolute Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A scanned quantity is a count, not a movement:                         │
//! │                                                                         │
//! │     UPDATE products SET stock = 9 WHERE id = ?                          │
//! │                                                                         │
//! │  The previous level only matters for display, so it is never read back  │
//! │  here; the caller already has it from the snapshot.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockscan_core::Product;

/// Row shape of `products` joined with its category name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product {
            id: record.id,
            name: record.name,
            stock: record.stock,
            category_id: record.category_id,
            category_name: record.category_name,
        }
    }
}

const SELECT_PRODUCTS: &str = r#"
    SELECT
        p.id,
        p.name,
        p.stock,
        p.category_id,
        c.name AS category_name
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let rice = repo.insert("Rice", Some(&grains.id), 20).await?;
/// repo.set_stock(&rice.id, 9).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product in insertion order.
    ///
    /// Insertion order is the snapshot order: when two products share a
    /// normalized name, reconciliation picks the one listed first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCTS} ORDER BY p.rowid");
        let records = sqlx::query_as::<_, ProductRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = records.len(), "Listed products");
        Ok(records.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCTS} WHERE p.id = ?1");
        let record = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Product::from))
    }

    /// Creates a product with a fresh ID.
    ///
    /// ## Arguments
    /// * `name` - Display name (trimmed before storing)
    /// * `category_id` - Existing category, if any
    /// * `stock` - Initial stock level
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Category doesn't exist
    pub async fn insert(
        &self,
        name: &str,
        category_id: Option<&str>,
        stock: i64,
    ) -> DbResult<Product> {
        let name = name.trim();
        debug!(name = %name, stock, "Inserting product");

        let id = generate_product_id();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category_id, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(category_id)
        .bind(stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        // Re-read to pick up the joined category name.
        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &id))
    }

    /// Sets a product's stock to an absolute level.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<()> {
        debug!(id = %id, stock, "Setting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
