//! # Category Repository
//!
//! Database operations for categories.
//!
//! Category names are unique case-insensitively (`COLLATE NOCASE` in the
//! schema), so inserting "grains" when "Grains" exists fails with
//! [`DbError::UniqueViolation`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockscan_core::Category;

/// Row shape of the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category {
            id: record.id,
            name: record.name,
        }
    }
}

/// Repository for category database operations.
///
/// ## Usage
/// ```rust,ignore
/// let grains = db.categories().insert("Grains").await?;
/// let all = db.categories().list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists every category in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name
            FROM categories
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Category::from).collect())
    }

    /// Finds a category by name, ignoring case and surrounding whitespace.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name
            FROM categories
            WHERE name = ?1 COLLATE NOCASE
            ORDER BY rowid
            LIMIT 1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Category::from))
    }

    /// Creates a category with a fresh ID.
    ///
    /// ## Returns
    /// * `Ok(Category)` - The stored category
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        let name = name.trim();
        debug!(name = %name, "Inserting category");

        let category = Category {
            id: generate_category_id(),
            name: name.to_string(),
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
            other => other,
        })?;

        Ok(category)
    }

    /// Counts categories (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new category ID.
pub fn generate_category_id() -> String {
    Uuid::new_v4().to_string()
}
