//! Running sea-query statements on rusqlite connections.
//!
//! Statements are rendered with [`SqliteQueryBuilder`]; every value ends up as
//! a positional `?` parameter, converted here into the driver's own value type.

use bookshelf_common::{Error, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use sea_query::{QueryStatementWriter, SqliteQueryBuilder, Value, Values};

/// Build a value from one result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl FromRow for String {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        row.get(0)
    }
}

/// Parameters of a rendered statement, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(pub Vec<SqlValue>);

impl From<Values> for Params {
    fn from(values: Values) -> Self {
        Self(values.0.into_iter().map(to_sql_value).collect())
    }
}

fn or_null<T>(value: Option<T>, f: impl FnOnce(T) -> SqlValue) -> SqlValue {
    value.map_or(SqlValue::Null, f)
}

fn to_sql_value(value: Value) -> SqlValue {
    match value {
        Value::Bool(v) => or_null(v, |b| SqlValue::Integer(i64::from(b))),
        Value::TinyInt(v) => or_null(v, |n| SqlValue::Integer(n.into())),
        Value::SmallInt(v) => or_null(v, |n| SqlValue::Integer(n.into())),
        Value::Int(v) => or_null(v, |n| SqlValue::Integer(n.into())),
        Value::BigInt(v) => or_null(v, SqlValue::Integer),
        Value::TinyUnsigned(v) => or_null(v, |n| SqlValue::Integer(n.into())),
        Value::SmallUnsigned(v) => or_null(v, |n| SqlValue::Integer(n.into())),
        Value::Unsigned(v) => or_null(v, |n| SqlValue::Integer(n.into())),
        // SQLite integers are signed 64-bit; larger values keep their digits as text.
        Value::BigUnsigned(v) => or_null(v, |n| {
            i64::try_from(n)
                .map(SqlValue::Integer)
                .unwrap_or_else(|_| SqlValue::Text(n.to_string()))
        }),
        Value::Float(v) => or_null(v, |n| SqlValue::Real(n.into())),
        Value::Double(v) => or_null(v, SqlValue::Real),
        Value::String(v) => or_null(v, |s| SqlValue::Text(*s)),
        Value::Char(v) => or_null(v, |c| SqlValue::Text(c.to_string())),
        Value::Bytes(v) => or_null(v, |b| SqlValue::Blob(*b)),
    }
}

/// Render `statement` for SQLite.
pub fn render<S: QueryStatementWriter>(statement: &S) -> (String, Params) {
    let (sql, values) = statement.build(SqliteQueryBuilder);
    (sql, values.into())
}

/// Run `statement` and map every row.
pub fn fetch_all<T: FromRow, S: QueryStatementWriter>(
    conn: &Connection,
    statement: &S,
) -> Result<Vec<T>> {
    let (sql, params) = render(statement);
    tracing::debug!(sql = %sql, params = params.0.len(), "mapped query");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(params_from_iter(params.0.iter()), |row| T::from_row(row))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows)
}

/// Run `statement` and map the first row, if any.
pub fn fetch_optional<T: FromRow, S: QueryStatementWriter>(
    conn: &Connection,
    statement: &S,
) -> Result<Option<T>> {
    let (sql, params) = render(statement);
    tracing::debug!(sql = %sql, params = params.0.len(), "mapped query");

    conn.query_row(&sql, params_from_iter(params.0.iter()), |row| T::from_row(row))
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// Run a statement that returns no rows; yields the number of changed rows.
pub fn execute<S: QueryStatementWriter>(conn: &Connection, statement: &S) -> Result<usize> {
    let (sql, params) = render(statement);
    execute_sql(conn, &sql, &params)
}

/// Run already rendered SQL, for statements the builder has no type for.
pub fn execute_sql(conn: &Connection, sql: &str, params: &Params) -> Result<usize> {
    tracing::debug!(sql = %sql, params = params.0.len(), "mapped statement");

    conn.execute(sql, params_from_iter(params.0.iter()))
        .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::{Expr, Iden, Order, Query};

    #[derive(Iden, Clone, Copy)]
    enum Numbers {
        Table,
        V,
    }

    impl FromRow for i64 {
        fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
            row.get(0)
        }
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE numbers (v INTEGER NOT NULL);
             INSERT INTO numbers (v) VALUES (1), (2), (3);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_fetch_all_binds_params() {
        let conn = conn();
        let query = Query::select()
            .column(Numbers::V)
            .from(Numbers::Table)
            .and_where(Expr::col(Numbers::V).gt(1))
            .order_by(Numbers::V, Order::Asc)
            .to_owned();

        let (sql, params) = render(&query);
        assert_eq!(
            sql,
            r#"SELECT "v" FROM "numbers" WHERE "v" > ? ORDER BY "v" ASC"#
        );
        assert_eq!(params, Params(vec![SqlValue::Integer(1)]));

        let rows: Vec<i64> = fetch_all(&conn, &query).unwrap();
        assert_eq!(rows, vec![2, 3]);
    }

    #[test]
    fn test_fetch_optional_none() {
        let conn = conn();
        let query = Query::select()
            .column(Numbers::V)
            .from(Numbers::Table)
            .and_where(Expr::col(Numbers::V).eq(42))
            .to_owned();
        let row: Option<i64> = fetch_optional(&conn, &query).unwrap();
        assert_eq!(row, None);
    }

    #[test]
    fn test_execute_counts_changed_rows() {
        let conn = conn();
        let update = Query::update()
            .table(Numbers::Table)
            .value(Numbers::V, 10)
            .and_where(Expr::col(Numbers::V).lte(2))
            .to_owned();
        assert_eq!(execute(&conn, &update).unwrap(), 2);
    }

    #[test]
    fn test_driver_errors_are_database_errors() {
        let conn = conn();
        let query = Query::select()
            .column(Numbers::V)
            .from(sea_query::Alias::new("missing"))
            .to_owned();
        let err = fetch_all::<i64, _>(&conn, &query).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_value_conversion() {
        let values = Values(vec![
            Value::Bool(Some(true)),
            Value::BigUnsigned(Some(u64::MAX)),
            Value::String(Some(Box::new("Unknown".into()))),
            Value::Int(None),
            Value::Double(Some(0.5)),
        ]);
        assert_eq!(
            Params::from(values),
            Params(vec![
                SqlValue::Integer(1),
                SqlValue::Text(u64::MAX.to_string()),
                SqlValue::Text("Unknown".into()),
                SqlValue::Null,
                SqlValue::Real(0.5),
            ])
        );
    }
}
