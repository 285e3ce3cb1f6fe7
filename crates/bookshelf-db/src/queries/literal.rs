//! The query catalog written as literal SQL.
//!
//! Same functions and results as [`super::mapped`], but every statement is a
//! string. Inputs are always bound as parameters.

use bookshelf_common::{BookId, Error, Result};
use rusqlite::{Connection, OptionalExtension, Params};

use crate::models::{AuthorBookCount, Book, TitleAuthor, TitleLabel, TitleRank};
use crate::pool::{get_conn, DbPool};
use crate::sql::FromRow;

fn query_rows<T: FromRow, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>> {
    tracing::debug!(sql = %sql, "literal query");

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(params, |row| T::from_row(row))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows)
}

/// Every book, in storage order.
pub fn fetch_all(pool: &DbPool) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    query_rows(&conn, "SELECT * FROM book", [])
}

/// The book with `id`, or `None`.
pub fn fetch_by_id(pool: &DbPool, id: BookId) -> Result<Option<Book>> {
    let conn = get_conn(pool)?;
    tracing::debug!(id = %id, "literal query by id");
    conn.query_row(
        "SELECT * FROM book WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
        |row| Book::from_row(row),
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Author names with how many books each wrote.
pub fn books_per_author(pool: &DbPool) -> Result<Vec<AuthorBookCount>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT author.name, COUNT(book.id) FROM author \
         JOIN book ON author.id = book.author_id \
         GROUP BY author.name",
        [],
    )
}

/// Every book, ordered by title.
pub fn books_by_title(pool: &DbPool) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    query_rows(&conn, "SELECT * FROM book ORDER BY title", [])
}

/// Authors with more than one book.
pub fn authors_with_multiple_books(pool: &DbPool) -> Result<Vec<AuthorBookCount>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT author.name, COUNT(book.id) FROM author \
         JOIN book ON author.id = book.author_id \
         GROUP BY author.name \
         HAVING COUNT(book.id) > 1",
        [],
    )
}

/// The first `limit` books in storage order.
pub fn first_books(pool: &DbPool, limit: u32) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    query_rows(&conn, "SELECT * FROM book LIMIT ?1", [limit])
}

/// Titles with author names, joining `author` under the alias `a`.
pub fn books_with_author_alias(pool: &DbPool) -> Result<Vec<TitleAuthor>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT book.title, a.name FROM book JOIN author AS a ON book.author_id = a.id",
        [],
    )
}

/// Titles with author names.
pub fn books_with_authors(pool: &DbPool) -> Result<Vec<TitleAuthor>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT book.title, author.name FROM book JOIN author ON book.author_id = author.id",
        [],
    )
}

/// Book titles and author names in one deduplicated column.
pub fn titles_and_names(pool: &DbPool) -> Result<Vec<String>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT title FROM book UNION SELECT name FROM author",
        [],
    )
}

/// Every title in upper case.
pub fn uppercase_titles(pool: &DbPool) -> Result<Vec<String>> {
    let conn = get_conn(pool)?;
    query_rows(&conn, "SELECT UPPER(title) FROM book", [])
}

/// Titles labelled by a CASE on the book id.
pub fn title_labels(pool: &DbPool) -> Result<Vec<TitleLabel>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT title, \
         CASE WHEN id > :threshold THEN :above WHEN id <= :threshold THEN :at_most \
         ELSE :unknown END AS description \
         FROM book",
        rusqlite::named_params! {
            ":threshold": 1_i64,
            ":above": "More than 1",
            ":at_most": "1 or less",
            ":unknown": "Unknown",
        },
    )
}

/// Every author with a book count computed by a correlated subquery.
pub fn book_counts_by_subquery(pool: &DbPool) -> Result<Vec<AuthorBookCount>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT author.name, \
         (SELECT COUNT(*) FROM book WHERE book.author_id = author.id) AS book_count \
         FROM author",
        [],
    )
}

/// Titles with their ROW_NUMBER over title order.
pub fn titles_with_row_number(pool: &DbPool) -> Result<Vec<TitleRank>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "SELECT title, ROW_NUMBER() OVER (ORDER BY title) FROM book",
        [],
    )
}

/// Titles read through the `book_cte` common table expression.
pub fn titles_via_cte(pool: &DbPool) -> Result<Vec<String>> {
    let conn = get_conn(pool)?;
    query_rows(
        &conn,
        "WITH book_cte AS (SELECT * FROM book) SELECT title FROM book_cte",
        [],
    )
}

/// Every book, copied into the `temp_books` temporary table and read back.
pub fn books_via_temp_table(pool: &DbPool) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    conn.execute_batch(
        "DROP TABLE IF EXISTS temp.temp_books;
         CREATE TEMPORARY TABLE temp_books AS SELECT * FROM book;",
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let rows = query_rows(&conn, "SELECT * FROM temp_books", []);
    conn.execute_batch("DROP TABLE IF EXISTS temp.temp_books")
        .map_err(|e| Error::database(e.to_string()))?;
    rows
}
