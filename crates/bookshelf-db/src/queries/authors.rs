//! Author lookups.
//!
//! Books refer to authors by id only; these resolve an id when a caller needs
//! more than the name a join already provides.

use bookshelf_common::{AuthorId, Result};
use sea_query::{Expr, Order, Query, SelectStatement};

use crate::models::{Author, AuthorIden};
use crate::pool::{get_conn, DbPool};
use crate::sql::{fetch_all, fetch_optional};

fn authors() -> SelectStatement {
    Query::select()
        .columns(AuthorIden::COLUMNS)
        .from(AuthorIden::Table)
        .to_owned()
}

/// All authors ordered by id.
pub fn list_authors(pool: &DbPool) -> Result<Vec<Author>> {
    let conn = get_conn(pool)?;
    let query = authors().order_by(AuthorIden::Id, Order::Asc).to_owned();
    fetch_all(&conn, &query)
}

/// The author with `id`, or `None`.
pub fn get_author(pool: &DbPool, id: AuthorId) -> Result<Option<Author>> {
    let conn = get_conn(pool)?;
    let query = authors()
        .and_where(Expr::col(AuthorIden::Id).eq(id.get()))
        .to_owned();
    fetch_optional(&conn, &query)
}
