//! Named access to the query catalog.
//!
//! [`run`] executes any [`QueryShape`] through either approach and wraps the
//! rows in a [`QueryOutput`], which the CLI prints or serializes.

use std::fmt;

use bookshelf_common::{BookId, Error, Result};
use serde::Serialize;

use crate::models::{AuthorBookCount, Book, TitleAuthor, TitleLabel, TitleRank};
use crate::pool::DbPool;
use crate::queries::{literal, mapped};

/// One of the demonstrated query patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryShape {
    FetchAll,
    FetchById,
    GroupByAuthor,
    OrderByTitle,
    HavingMultiple,
    Limit,
    AliasJoin,
    Join,
    Union,
    Uppercase,
    CaseExpression,
    CorrelatedSubquery,
    WindowRowNumber,
    Cte,
    TempTable,
}

impl QueryShape {
    /// Every shape, in catalog order.
    pub const ALL: [QueryShape; 15] = [
        Self::FetchAll,
        Self::FetchById,
        Self::GroupByAuthor,
        Self::OrderByTitle,
        Self::HavingMultiple,
        Self::Limit,
        Self::AliasJoin,
        Self::Join,
        Self::Union,
        Self::Uppercase,
        Self::CaseExpression,
        Self::CorrelatedSubquery,
        Self::WindowRowNumber,
        Self::Cte,
        Self::TempTable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchAll => "fetch-all",
            Self::FetchById => "fetch-by-id",
            Self::GroupByAuthor => "group-by-author",
            Self::OrderByTitle => "order-by-title",
            Self::HavingMultiple => "having-multiple",
            Self::Limit => "limit",
            Self::AliasJoin => "alias-join",
            Self::Join => "join",
            Self::Union => "union",
            Self::Uppercase => "uppercase",
            Self::CaseExpression => "case-expression",
            Self::CorrelatedSubquery => "correlated-subquery",
            Self::WindowRowNumber => "window-row-number",
            Self::Cte => "cte",
            Self::TempTable => "temp-table",
        }
    }

    /// True when the query itself fixes the row order.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::FetchById | Self::OrderByTitle)
    }
}

impl fmt::Display for QueryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QueryShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("Invalid query shape: {}", s))
    }
}

/// How a shape is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// Built from typed entity references.
    #[default]
    Mapped,
    /// Hand-written SQL.
    Literal,
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapped => write!(f, "mapped"),
            Self::Literal => write!(f, "literal"),
        }
    }
}

/// Inputs for the shapes that take one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryArgs {
    /// Used by fetch-by-id.
    pub id: BookId,
    /// Used by limit.
    pub limit: u32,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            id: BookId::from(1),
            limit: 2,
        }
    }
}

/// Rows returned by a catalog query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Books(Vec<Book>),
    Book(Option<Book>),
    Counts(Vec<AuthorBookCount>),
    TitleAuthors(Vec<TitleAuthor>),
    Labels(Vec<TitleLabel>),
    Ranks(Vec<TitleRank>),
    Values(Vec<String>),
}

impl QueryOutput {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Books(rows) => rows.len(),
            Self::Book(row) => usize::from(row.is_some()),
            Self::Counts(rows) => rows.len(),
            Self::TitleAuthors(rows) => rows.len(),
            Self::Labels(rows) => rows.len(),
            Self::Ranks(rows) => rows.len(),
            Self::Values(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The same rows in a canonical order, for comparing unordered results.
    pub fn sorted(mut self) -> Self {
        match &mut self {
            Self::Books(rows) => rows.sort_by_key(|b| b.id),
            Self::Book(_) => {}
            Self::Counts(rows) => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            Self::TitleAuthors(rows) => {
                rows.sort_by(|a, b| (&a.title, &a.author).cmp(&(&b.title, &b.author)))
            }
            Self::Labels(rows) => {
                rows.sort_by(|a, b| (&a.title, &a.label).cmp(&(&b.title, &b.label)))
            }
            Self::Ranks(rows) => rows.sort_by_key(|r| r.rank),
            Self::Values(rows) => rows.sort(),
        }
        self
    }
}

fn write_book(f: &mut fmt::Formatter<'_>, book: &Book) -> fmt::Result {
    write!(
        f,
        "{}\t{}\t{}\tauthor={}",
        book.id, book.title, book.summary, book.author_id
    )?;
    if let Some(ts) = book.updated_at {
        write!(f, "\tupdated={}", ts.to_rfc3339())?;
    }
    writeln!(f)
}

impl fmt::Display for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Books(rows) => rows.iter().try_for_each(|b| write_book(f, b)),
            Self::Book(Some(book)) => write_book(f, book),
            Self::Book(None) => writeln!(f, "(no book)"),
            Self::Counts(rows) => rows
                .iter()
                .try_for_each(|r| writeln!(f, "{}\t{}", r.name, r.book_count)),
            Self::TitleAuthors(rows) => rows
                .iter()
                .try_for_each(|r| writeln!(f, "{}\t{}", r.title, r.author)),
            Self::Labels(rows) => rows
                .iter()
                .try_for_each(|r| writeln!(f, "{}\t{}", r.title, r.label)),
            Self::Ranks(rows) => rows
                .iter()
                .try_for_each(|r| writeln!(f, "{}\t{}", r.rank, r.title)),
            Self::Values(rows) => rows.iter().try_for_each(|v| writeln!(f, "{v}")),
        }
    }
}

macro_rules! dispatch {
    ($queries:ident, $pool:expr, $shape:expr, $args:expr) => {
        match $shape {
            QueryShape::FetchAll => QueryOutput::Books($queries::fetch_all($pool)?),
            QueryShape::FetchById => QueryOutput::Book($queries::fetch_by_id($pool, $args.id)?),
            QueryShape::GroupByAuthor => QueryOutput::Counts($queries::books_per_author($pool)?),
            QueryShape::OrderByTitle => QueryOutput::Books($queries::books_by_title($pool)?),
            QueryShape::HavingMultiple => {
                QueryOutput::Counts($queries::authors_with_multiple_books($pool)?)
            }
            QueryShape::Limit => QueryOutput::Books($queries::first_books($pool, $args.limit)?),
            QueryShape::AliasJoin => {
                QueryOutput::TitleAuthors($queries::books_with_author_alias($pool)?)
            }
            QueryShape::Join => QueryOutput::TitleAuthors($queries::books_with_authors($pool)?),
            QueryShape::Union => QueryOutput::Values($queries::titles_and_names($pool)?),
            QueryShape::Uppercase => QueryOutput::Values($queries::uppercase_titles($pool)?),
            QueryShape::CaseExpression => QueryOutput::Labels($queries::title_labels($pool)?),
            QueryShape::CorrelatedSubquery => {
                QueryOutput::Counts($queries::book_counts_by_subquery($pool)?)
            }
            QueryShape::WindowRowNumber => {
                QueryOutput::Ranks($queries::titles_with_row_number($pool)?)
            }
            QueryShape::Cte => QueryOutput::Values($queries::titles_via_cte($pool)?),
            QueryShape::TempTable => QueryOutput::Books($queries::books_via_temp_table($pool)?),
        }
    };
}

/// Run `shape` through `approach`.
pub fn run(
    pool: &DbPool,
    shape: QueryShape,
    approach: Approach,
    args: QueryArgs,
) -> Result<QueryOutput> {
    tracing::debug!(%shape, %approach, "Running catalog query");

    let output = match approach {
        Approach::Mapped => dispatch!(mapped, pool, shape, args),
        Approach::Literal => dispatch!(literal, pool, shape, args),
    };

    tracing::debug!(%shape, rows = output.len(), "Catalog query finished");
    Ok(output)
}

/// Run `shape` both ways and fail if the results differ.
pub fn compare(pool: &DbPool, shape: QueryShape, args: QueryArgs) -> Result<QueryOutput> {
    let mut via_builder = run(pool, shape, Approach::Mapped, args)?;
    let mut via_sql = run(pool, shape, Approach::Literal, args)?;

    if !shape.is_ordered() {
        via_builder = via_builder.sorted();
        via_sql = via_sql.sorted();
    }

    if via_builder != via_sql {
        return Err(Error::internal(format!(
            "{shape}: mapped and literal results differ"
        )));
    }
    Ok(via_builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use crate::pool::open_memory_database;
    use crate::queries::books;
    use bookshelf_common::AuthorId;

    #[test]
    fn test_shape_names_round_trip() {
        for shape in QueryShape::ALL {
            assert_eq!(shape.to_string().parse::<QueryShape>(), Ok(shape));
        }
        assert!("select-star".parse::<QueryShape>().is_err());
    }

    #[test]
    fn test_run_fetch_by_id() {
        let pool = open_memory_database().unwrap();
        let args = QueryArgs {
            id: BookId::from(2),
            ..QueryArgs::default()
        };

        let output = run(&pool, QueryShape::FetchById, Approach::Literal, args).unwrap();
        match output {
            QueryOutput::Book(Some(book)) => assert_eq!(book.title, "Book Two"),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn test_display_one_row_per_line() {
        let pool = open_memory_database().unwrap();
        let output = run(
            &pool,
            QueryShape::Uppercase,
            Approach::Mapped,
            QueryArgs::default(),
        )
        .unwrap();

        assert_eq!(
            output.to_string(),
            "BOOK ONE\nBOOK TWO\nBOOK THREE\nBOOK FOUR\n"
        );
    }

    #[test]
    fn test_json_is_plain_rows() {
        let output = QueryOutput::Counts(vec![AuthorBookCount {
            name: "Author One".into(),
            book_count: 2,
        }]);
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"[{"name":"Author One","book_count":2}]"#);
    }

    #[test]
    fn test_sorted_labels_break_title_ties() {
        let label = |title: &str, label: &str| TitleLabel {
            title: title.into(),
            label: label.into(),
        };
        let one = QueryOutput::Labels(vec![
            label("Dune", "More than 1"),
            label("Dune", "1 or less"),
        ]);
        let other = QueryOutput::Labels(vec![
            label("Dune", "1 or less"),
            label("Dune", "More than 1"),
        ]);
        assert_eq!(one.sorted(), other.sorted());
    }

    #[test]
    fn test_compare_with_duplicate_titles() {
        let pool = open_memory_database().unwrap();
        let reprint = NewBook::new("Book One", "Second edition", AuthorId::from(2));
        books::create_book(&pool, &reprint).unwrap();

        for shape in QueryShape::ALL {
            compare(&pool, shape, QueryArgs::default()).unwrap();
        }
    }

    #[test]
    fn test_compare_every_shape() {
        let pool = open_memory_database().unwrap();
        for shape in QueryShape::ALL {
            let output = compare(&pool, shape, QueryArgs::default()).unwrap();
            assert!(!output.is_empty(), "{shape} returned nothing");
        }
    }
}
