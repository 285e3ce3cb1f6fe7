//! Book mutations.
//!
//! Both helpers read the row back after writing, so callers get exactly what
//! is stored.

use bookshelf_common::{BookId, Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use sea_query::{Expr, Query, UpdateStatement};

use crate::models::{Book, BookIden, BookUpdate, NewBook};
use crate::pool::{get_conn, DbPool};
use crate::queries::mapped::book_by_id;
use crate::sql::{execute, fetch_optional};

fn load_book(conn: &Connection, id: BookId) -> Result<Option<Book>> {
    fetch_optional(conn, &book_by_id(id))
}

/// SET clause with the supplied fields only, plus `updated_at`.
fn update_statement(
    id: BookId,
    update: &BookUpdate,
    updated_at: DateTime<Utc>,
) -> UpdateStatement {
    let mut statement = Query::update();
    statement.table(BookIden::Table);
    if let Some(title) = &update.title {
        statement.value(BookIden::Title, title.as_str());
    }
    if let Some(summary) = &update.summary {
        statement.value(BookIden::Summary, summary.as_str());
    }
    statement
        .value(BookIden::UpdatedAt, updated_at.to_rfc3339())
        .and_where(Expr::col(BookIden::Id).eq(id.get()))
        .to_owned()
}

/// Insert a new book.
///
/// # Returns
///
/// * `Ok(Book)` - The stored row, including its assigned id
/// * `Err(Error::InvalidInput)` - If a text field exceeds the schema bound
/// * `Err(Error::Database)` - If the author does not exist or the insert fails
pub fn create_book(pool: &DbPool, new_book: &NewBook) -> Result<Book> {
    new_book.validate()?;

    let conn = get_conn(pool)?;
    conn.execute(
        "INSERT INTO book (title, summary, author_id)
         VALUES (:title, :summary, :author_id)",
        rusqlite::named_params! {
            ":title": new_book.title,
            ":summary": new_book.summary,
            ":author_id": new_book.author_id.get(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let id = BookId::from(conn.last_insert_rowid());
    tracing::info!(%id, title = %new_book.title, "Created book");

    load_book(&conn, id)?.ok_or_else(|| Error::internal(format!("book {id} vanished after insert")))
}

/// Overwrite the supplied fields of a book.
///
/// # Returns
///
/// * `Ok(Some(Book))` - The updated row
/// * `Ok(None)` - If no book has this id; nothing is written
/// * `Err(Error)` - If validation or the database fails
pub fn update_book(pool: &DbPool, id: BookId, update: &BookUpdate) -> Result<Option<Book>> {
    update.validate()?;

    let conn = get_conn(pool)?;
    let Some(book) = load_book(&conn, id)? else {
        tracing::debug!(%id, "No book to update");
        return Ok(None);
    };

    if update.is_empty() {
        return Ok(Some(book));
    }

    execute(&conn, &update_statement(id, update, Utc::now()))?;
    tracing::info!(%id, "Updated book");

    load_book(&conn, id)
}
