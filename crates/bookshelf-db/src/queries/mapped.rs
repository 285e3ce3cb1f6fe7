//! The query catalog built with sea-query.
//!
//! Each function checks out one pooled connection, runs one statement built
//! from the [`BookIden`] and [`AuthorIden`] identifiers and returns the mapped
//! rows. The connection goes back to the pool when the function returns, on
//! success or error. [`super::literal`] holds the same catalog as hand-written
//! SQL.

use bookshelf_common::{BookId, Result};
use sea_query::{
    Alias, CommonTableExpression, Expr, Func, JoinType, Order, Query, SelectStatement,
    SimpleExpr, SqliteQueryBuilder, Table, UnionType, WindowStatement, WithClause, WithQuery,
};

use crate::models::{
    AuthorBookCount, AuthorIden, Book, BookIden, TitleAuthor, TitleLabel, TitleRank,
};
use crate::pool::{get_conn, DbPool};
use crate::sql::{execute_sql, fetch_all as run, fetch_optional, render, Params};

/// Ids above this are labelled "More than 1".
const LABEL_THRESHOLD: i64 = 1;

fn books() -> SelectStatement {
    Query::select()
        .columns(BookIden::COLUMNS)
        .from(BookIden::Table)
        .to_owned()
}

/// Every book, in storage order.
pub fn fetch_all(pool: &DbPool) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    run(&conn, &books())
}

pub(crate) fn book_by_id(id: BookId) -> SelectStatement {
    books()
        .and_where(Expr::col(BookIden::Id).eq(id.get()))
        .to_owned()
}

/// The book with `id`, or `None`.
pub fn fetch_by_id(pool: &DbPool, id: BookId) -> Result<Option<Book>> {
    let conn = get_conn(pool)?;
    fetch_optional(&conn, &book_by_id(id))
}

fn author_book_counts() -> SelectStatement {
    Query::select()
        .column((AuthorIden::Table, AuthorIden::Name))
        .expr(Func::count(Expr::col((BookIden::Table, BookIden::Id))))
        .from(AuthorIden::Table)
        .inner_join(
            BookIden::Table,
            Expr::col((BookIden::Table, BookIden::AuthorId))
                .equals((AuthorIden::Table, AuthorIden::Id)),
        )
        .group_by_col((AuthorIden::Table, AuthorIden::Name))
        .to_owned()
}

/// Author names with how many books each wrote.
pub fn books_per_author(pool: &DbPool) -> Result<Vec<AuthorBookCount>> {
    let conn = get_conn(pool)?;
    run(&conn, &author_book_counts())
}

/// Every book, ordered by title.
pub fn books_by_title(pool: &DbPool) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    let query = books().order_by(BookIden::Title, Order::Asc).to_owned();
    run(&conn, &query)
}

/// Authors with more than one book.
pub fn authors_with_multiple_books(pool: &DbPool) -> Result<Vec<AuthorBookCount>> {
    let conn = get_conn(pool)?;
    let book_count = Func::count(Expr::col((BookIden::Table, BookIden::Id)));
    let query = author_book_counts()
        .and_having(Expr::expr(book_count).gt(1))
        .to_owned();
    run(&conn, &query)
}

/// The first `limit` books in storage order.
pub fn first_books(pool: &DbPool, limit: u32) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    let query = books().limit(u64::from(limit)).to_owned();
    run(&conn, &query)
}

/// Titles with author names, joining `author` under the alias `a`.
pub fn books_with_author_alias(pool: &DbPool) -> Result<Vec<TitleAuthor>> {
    let conn = get_conn(pool)?;
    let a = Alias::new("a");
    let query = Query::select()
        .column((BookIden::Table, BookIden::Title))
        .column((a.clone(), AuthorIden::Name))
        .from(BookIden::Table)
        .join_as(
            JoinType::InnerJoin,
            AuthorIden::Table,
            a.clone(),
            Expr::col((BookIden::Table, BookIden::AuthorId)).equals((a, AuthorIden::Id)),
        )
        .to_owned();
    run(&conn, &query)
}

/// Titles with author names.
pub fn books_with_authors(pool: &DbPool) -> Result<Vec<TitleAuthor>> {
    let conn = get_conn(pool)?;
    let query = Query::select()
        .column((BookIden::Table, BookIden::Title))
        .column((AuthorIden::Table, AuthorIden::Name))
        .from(BookIden::Table)
        .inner_join(
            AuthorIden::Table,
            Expr::col((BookIden::Table, BookIden::AuthorId))
                .equals((AuthorIden::Table, AuthorIden::Id)),
        )
        .to_owned();
    run(&conn, &query)
}

/// Book titles and author names in one deduplicated column.
pub fn titles_and_names(pool: &DbPool) -> Result<Vec<String>> {
    let conn = get_conn(pool)?;
    let names = Query::select()
        .column(AuthorIden::Name)
        .from(AuthorIden::Table)
        .to_owned();
    let query = Query::select()
        .column(BookIden::Title)
        .from(BookIden::Table)
        .union(UnionType::Distinct, names)
        .to_owned();
    run(&conn, &query)
}

/// Every title in upper case.
pub fn uppercase_titles(pool: &DbPool) -> Result<Vec<String>> {
    let conn = get_conn(pool)?;
    let query = Query::select()
        .expr(Func::upper(Expr::col(BookIden::Title)))
        .from(BookIden::Table)
        .to_owned();
    run(&conn, &query)
}

fn title_labels_query() -> SelectStatement {
    let label = Expr::case(Expr::col(BookIden::Id).gt(LABEL_THRESHOLD), "More than 1")
        .case(Expr::col(BookIden::Id).lte(LABEL_THRESHOLD), "1 or less")
        .finally("Unknown");

    Query::select()
        .column(BookIden::Title)
        .expr_as(label, Alias::new("description"))
        .from(BookIden::Table)
        .to_owned()
}

/// Titles labelled by a CASE on the book id.
pub fn title_labels(pool: &DbPool) -> Result<Vec<TitleLabel>> {
    let conn = get_conn(pool)?;
    run(&conn, &title_labels_query())
}

/// Every author with a book count computed by a correlated subquery.
pub fn book_counts_by_subquery(pool: &DbPool) -> Result<Vec<AuthorBookCount>> {
    let conn = get_conn(pool)?;
    let per_author = Query::select()
        .expr(Func::count(Expr::col((BookIden::Table, BookIden::Id))))
        .from(BookIden::Table)
        .and_where(
            Expr::col((BookIden::Table, BookIden::AuthorId))
                .equals((AuthorIden::Table, AuthorIden::Id)),
        )
        .to_owned();
    let query = Query::select()
        .column((AuthorIden::Table, AuthorIden::Name))
        .expr_as(
            SimpleExpr::SubQuery(None, Box::new(per_author.into_sub_query_statement())),
            Alias::new("book_count"),
        )
        .from(AuthorIden::Table)
        .to_owned();
    run(&conn, &query)
}

/// Titles with their ROW_NUMBER over title order.
pub fn titles_with_row_number(pool: &DbPool) -> Result<Vec<TitleRank>> {
    let conn = get_conn(pool)?;
    let window = WindowStatement::new()
        .order_by(BookIden::Title, Order::Asc)
        .to_owned();
    let query = Query::select()
        .column(BookIden::Title)
        .expr_window_as(Func::cust(Alias::new("ROW_NUMBER")), window, Alias::new("row_num"))
        .from(BookIden::Table)
        .to_owned();
    run(&conn, &query)
}

fn titles_via_cte_query() -> WithQuery {
    let book_cte = Alias::new("book_cte");
    let cte = CommonTableExpression::new()
        .query(books())
        .table_name(book_cte.clone())
        .to_owned();
    Query::select()
        .column((book_cte.clone(), BookIden::Title))
        .from(book_cte)
        .to_owned()
        .with(WithClause::new().cte(cte).to_owned())
}

/// Titles read through the `book_cte` common table expression.
pub fn titles_via_cte(pool: &DbPool) -> Result<Vec<String>> {
    let conn = get_conn(pool)?;
    run(&conn, &titles_via_cte_query())
}

/// Every book, copied into the `temp_books` temporary table and read back.
///
/// The table lives on the pooled connection, so it is dropped before the
/// connection is returned.
pub fn books_via_temp_table(pool: &DbPool) -> Result<Vec<Book>> {
    let conn = get_conn(pool)?;
    let temp_books = Alias::new("temp_books");
    let drop = Table::drop()
        .table(temp_books.clone())
        .if_exists()
        .to_string(SqliteQueryBuilder);

    execute_sql(&conn, &drop, &Params::default())?;
    // sea-query has no CREATE TABLE ... AS, so the SELECT is rendered on its own.
    let (select, params) = render(&books());
    let create = format!("CREATE TEMP TABLE \"temp_books\" AS {select}");
    execute_sql(&conn, &create, &params)?;

    let query = Query::select()
        .columns(BookIden::COLUMNS)
        .from(temp_books)
        .to_owned();
    let rows = run(&conn, &query);
    execute_sql(&conn, &drop, &Params::default())?;
    rows
}
