//! Schema setup.
//!
//! Schema scripts are embedded and applied in order. The number of applied
//! scripts is kept in SQLite's `user_version` header field, so opening an
//! up-to-date database changes nothing.

use rusqlite::Connection;
use thiserror::Error;

/// Schema scripts; the script at index `i` moves the schema to version `i + 1`.
const SCRIPTS: &[(&str, &str)] = &[("authors_and_books", include_str!("001_initial.sql"))];

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema script {version} ({name}) failed: {source}")]
    Script {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },

    #[error("Database schema version {found} is newer than this build ({known})")]
    TooNew { found: u32, known: u32 },
}

impl From<MigrationError> for bookshelf_common::Error {
    fn from(err: MigrationError) -> Self {
        bookshelf_common::Error::database(format!("Failed to prepare schema: {err}"))
    }
}

fn schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Bring the schema of `conn` up to date.
///
/// Each pending script runs in its own transaction together with the version
/// bump, so a failed script leaves the previous version in place.
///
/// # Returns
///
/// * `Ok(usize)` - Number of scripts applied
/// * `Err(MigrationError)` - If a script fails or the file was written by a newer schema
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let known = SCRIPTS.len() as u32;
    let found = schema_version(conn)?;
    if found > known {
        return Err(MigrationError::TooNew { found, known });
    }

    let mut applied = 0;
    for (version, &(name, sql)) in (1..).zip(SCRIPTS).skip(found as usize) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| MigrationError::Script {
                version,
                name,
                source,
            })?;
        tx.commit()?;

        tracing::info!("Applied schema script {version}: {name}");
        applied += 1;
    }

    if applied == 0 {
        tracing::debug!("Schema is up to date at version {found}");
    }
    Ok(applied)
}
