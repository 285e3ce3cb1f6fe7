//! Sample data bootstrap.
//!
//! Two authors with two books each. Every startup re-checks both tables and
//! fills whichever is empty, so running it again is a no-op.

use bookshelf_common::{Error, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::pool::{get_conn, DbPool};

/// Seed author rows as `(name, bio)`.
pub const SEED_AUTHORS: &[(&str, &str)] = &[
    ("Author One", "Bio of Author One"),
    ("Author Two", "Bio of Author Two"),
];

/// Seed book rows as `(title, summary, author name)`.
pub const SEED_BOOKS: &[(&str, &str, &str)] = &[
    ("Book One", "Summary of Book One", "Author One"),
    ("Book Two", "Summary of Book Two", "Author One"),
    ("Book Three", "Summary of Book Three", "Author Two"),
    ("Book Four", "Summary of Book Four", "Author Two"),
];

/// What a bootstrap run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub authors_inserted: usize,
    pub books_inserted: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.authors_inserted == 0 && self.books_inserted == 0
    }
}

/// Insert the sample rows into whichever table is empty.
pub fn bootstrap(pool: &DbPool) -> Result<SeedReport> {
    let conn = get_conn(pool)?;
    seed_connection(&conn)
}

/// Seed through an existing connection, inside one transaction.
///
/// Authors go in first so that the books can look up their generated ids.
pub fn seed_connection(conn: &Connection) -> Result<SeedReport> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let mut report = SeedReport::default();

    if table_is_empty(&tx, "author")? {
        for (name, bio) in SEED_AUTHORS {
            tx.execute(
                "INSERT INTO author (name, bio) VALUES (:name, :bio)",
                rusqlite::named_params! { ":name": name, ":bio": bio },
            )
            .map_err(|e| Error::database(e.to_string()))?;
            report.authors_inserted += 1;
        }
    }

    if table_is_empty(&tx, "book")? {
        for (title, summary, author) in SEED_BOOKS {
            let Some(author_id) = author_id_by_name(&tx, author)? else {
                tracing::warn!("Skipping seed book {:?}: author {:?} not found", title, author);
                continue;
            };
            tx.execute(
                "INSERT INTO book (title, summary, author_id) VALUES (:title, :summary, :author_id)",
                rusqlite::named_params! {
                    ":title": title,
                    ":summary": summary,
                    ":author_id": author_id,
                },
            )
            .map_err(|e| Error::database(e.to_string()))?;
            report.books_inserted += 1;
        }
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    Ok(report)
}

fn table_is_empty(conn: &Connection, table: &str) -> Result<bool> {
    // Table names come from this module only.
    let sql = format!("SELECT NOT EXISTS (SELECT 1 FROM {table})");
    conn.query_row(&sql, [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

fn author_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM author WHERE name = ? ORDER BY id LIMIT 1",
        [name],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    fn count(pool: &DbPool, table: &str) -> i64 {
        get_conn(pool)
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_bootstrap_inserts_sample_rows() {
        let pool = init_memory_pool().unwrap();

        let report = bootstrap(&pool).unwrap();
        assert_eq!(
            report,
            SeedReport {
                authors_inserted: 2,
                books_inserted: 4
            }
        );
        assert_eq!(count(&pool, "author"), 2);
        assert_eq!(count(&pool, "book"), 4);
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let pool = init_memory_pool().unwrap();
        bootstrap(&pool).unwrap();

        let report = bootstrap(&pool).unwrap();
        assert!(report.is_empty());
        assert_eq!(count(&pool, "author"), 2);
        assert_eq!(count(&pool, "book"), 4);
    }

    #[test]
    fn test_bootstrap_refills_empty_book_table() {
        let pool = init_memory_pool().unwrap();
        bootstrap(&pool).unwrap();
        get_conn(&pool)
            .unwrap()
            .execute("DELETE FROM book", [])
            .unwrap();

        let report = bootstrap(&pool).unwrap();
        assert_eq!(report.authors_inserted, 0);
        assert_eq!(report.books_inserted, 4);
    }

    #[test]
    fn test_books_reference_seed_authors() {
        let pool = init_memory_pool().unwrap();
        bootstrap(&pool).unwrap();

        let conn = get_conn(&pool).unwrap();
        let owner: String = conn
            .query_row(
                "SELECT author.name FROM book JOIN author ON author.id = book.author_id \
                 WHERE book.title = 'Book Four'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(owner, "Author Two");
    }

    #[test]
    fn test_books_without_matching_author_are_skipped() {
        let pool = init_memory_pool().unwrap();
        get_conn(&pool)
            .unwrap()
            .execute(
                "INSERT INTO author (name, bio) VALUES ('Author One', 'someone else')",
                [],
            )
            .unwrap();

        let report = bootstrap(&pool).unwrap();
        assert_eq!(report.authors_inserted, 0);
        assert_eq!(report.books_inserted, 2);
    }
}
