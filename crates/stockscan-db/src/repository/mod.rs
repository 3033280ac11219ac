//! # Repository Module
//!
//! Database repository implementations for the inventory store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Database::snapshot() / apply_plan()                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CategoryRepository              ProductRepository                      │
//! │  ├── list()                      ├── list()       (joins category name) │
//! │  ├── find_by_name(name)          ├── get_by_id(id)                      │
//! │  └── insert(name)                ├── insert(name, category, stock)      │
//! │                                  ├── set_stock(id, stock)               │
//! │                                  └── delete(id)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod category;
pub mod product;
