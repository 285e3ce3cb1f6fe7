//! Database connection pool management.
//!
//! The pool is the session factory: every catalog function checks out one
//! connection, runs its statement and hands the connection back when the
//! guard drops. Pools are built from an explicit [`DbConfig`]; nothing here is
//! process-global.

use std::path::{Path, PathBuf};

use bookshelf_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};

use crate::{migrations, seed};

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Where the database lives and how many connections the pool may hold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DbConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,

    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_path() -> PathBuf {
    PathBuf::from("./sqliteDB.db")
}

fn default_pool_size() -> u32 {
    4
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            pool_size: default_pool_size(),
        }
    }
}

impl DbConfig {
    /// Config for a database file at `path` with the default pool size.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Initialize a new database pool for the configured file.
///
/// This function will:
/// - Create the SQLite database file (and its parent directory) if missing
/// - Enable foreign key constraints on every new connection
/// - Run pending database migrations
///
/// It does not insert sample rows; see [`open_database`].
pub fn init_pool(config: &DbConfig) -> Result<DbPool> {
    if config.pool_size == 0 {
        return Err(Error::invalid_input("pool_size must be at least 1"));
    }

    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    build_pool(manager, config.pool_size)
}

/// Open the configured database, creating and seeding it when needed.
///
/// The sample rows are inserted when the file is new and re-checked on every
/// call, so an existing but empty database is seeded too.
pub fn open_database(config: &DbConfig) -> Result<DbPool> {
    let existed = database_exists(&config.path);
    if existed {
        tracing::debug!("Opening database at {}", config.path.display());
    } else {
        tracing::info!("Creating database at {}", config.path.display());
    }

    let pool = init_pool(config)?;
    let report = seed::bootstrap(&pool)?;
    if report.is_empty() {
        tracing::debug!("Sample data already present");
    } else {
        tracing::info!(
            "Seeded {} authors and {} books",
            report.authors_inserted,
            report.books_inserted
        );
    }

    Ok(pool)
}

/// Initialize an in-memory database pool (useful for tests).
///
/// Each call creates a uniquely-named shared-cache in-memory database so
/// that parallel tests do not interfere with each other, while all
/// connections within a single pool still share state.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:bookshelf_mem_{n}?mode=memory&cache=shared");

    let manager = SqliteConnectionManager::file(uri)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    build_pool(manager, default_pool_size())
}

/// In-memory pool with the sample rows already inserted.
pub fn open_memory_database() -> Result<DbPool> {
    let pool = init_memory_pool()?;
    seed::bootstrap(&pool)?;
    Ok(pool)
}

/// Get a connection from the pool.
///
/// The returned guard is the session of one catalog call.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}

fn database_exists(path: &Path) -> bool {
    path.is_file()
}

fn build_pool(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {e}")))?;

    migrations::run_migrations(&conn)?;

    Ok(pool)
}
