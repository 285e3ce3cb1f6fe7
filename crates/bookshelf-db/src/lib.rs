//! Bookshelf-DB: schema, sample data and the authors/books query catalog
//!
//! Every query shape exists twice: once built with sea-query from typed table
//! identifiers (`queries::mapped`) and once as literal SQL (`queries::literal`). Both run
//! against SQLite through rusqlite with r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management and database bootstrap
//! - `seed` - Sample authors and books
//! - `models` - Rust models matching database schema
//! - `sql` - Runs sea-query statements on rusqlite connections
//! - `queries` - Query catalog and mutation helpers
//! - `catalog` - Runs any shape by name
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_db::pool::{open_database, DbConfig};
//! use bookshelf_db::queries::{literal, mapped};
//!
//! let pool = open_database(&DbConfig::at("./sqliteDB.db")).unwrap();
//!
//! let mapped = mapped::books_by_title(&pool).unwrap();
//! let literal = literal::books_by_title(&pool).unwrap();
//! assert_eq!(mapped, literal);
//! ```

pub mod catalog;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod seed;
pub mod sql;
