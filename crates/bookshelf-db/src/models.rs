//! Rust models matching the database schema.
//!
//! `Author` and `Book` are the two entities; the remaining structs are the
//! row shapes returned by projection queries. The one-to-many relation is kept
//! as a plain `author_id` field: use a join or `queries::authors::get_author`
//! to reach the author of a book.

use bookshelf_common::{AuthorId, BookId, Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use sea_query::Iden;
use serde::{Deserialize, Serialize};

use crate::sql::FromRow;

/// Maximum length of every text column in the schema.
pub const MAX_TEXT_LEN: usize = 100;

/// Author model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub bio: String,
}

/// Table and column names of [`Author`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Iden)]
#[iden = "author"]
pub enum AuthorIden {
    Table,
    Id,
    Name,
    Bio,
}

impl AuthorIden {
    /// The columns [`Author`] is read from.
    pub const COLUMNS: [Self; 3] = [Self::Id, Self::Name, Self::Bio];
}

impl FromRow for Author {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: AuthorId::from(row.get::<_, i64>("id")?),
            name: row.get("name")?,
            bio: row.get("bio")?,
        })
    }
}

/// Book model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub summary: String,
    pub author_id: AuthorId,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Table and column names of [`Book`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Iden)]
#[iden = "book"]
pub enum BookIden {
    Table,
    Id,
    Title,
    Summary,
    AuthorId,
    UpdatedAt,
}

impl BookIden {
    /// The columns [`Book`] is read from.
    pub const COLUMNS: [Self; 5] = [
        Self::Id,
        Self::Title,
        Self::Summary,
        Self::AuthorId,
        Self::UpdatedAt,
    ];
}

impl FromRow for Book {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let updated_at: Option<String> = row.get("updated_at")?;
        Ok(Self {
            id: BookId::from(row.get::<_, i64>("id")?),
            title: row.get("title")?,
            summary: row.get("summary")?,
            author_id: AuthorId::from(row.get::<_, i64>("author_id")?),
            updated_at: updated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

/// Parse an RFC 3339 timestamp stored in a TEXT column.
pub(crate) fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))
}

/// Fields for a book that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub summary: String,
    pub author_id: AuthorId,
}

impl NewBook {
    pub fn new(title: impl Into<String>, summary: impl Into<String>, author_id: AuthorId) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            author_id,
        }
    }

    /// Check the text bounds of the schema.
    pub fn validate(&self) -> Result<()> {
        check_len("title", &self.title)?;
        check_len("summary", &self.summary)
    }
}

/// Partial update of a book; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
}

impl BookUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.summary.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            check_len("title", title)?;
        }
        if let Some(summary) = &self.summary {
            check_len("summary", summary)?;
        }
        Ok(())
    }
}

fn check_len(field: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(Error::invalid_input(format!(
            "{field} is {len} characters long, the limit is {MAX_TEXT_LEN}"
        )));
    }
    Ok(())
}

/// An author name with the number of books written by that author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorBookCount {
    pub name: String,
    pub book_count: i64,
}

impl FromRow for AuthorBookCount {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            book_count: row.get(1)?,
        })
    }
}

/// A book title paired with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleAuthor {
    pub title: String,
    pub author: String,
}

impl FromRow for TitleAuthor {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            author: row.get(1)?,
        })
    }
}

/// A book title with the label produced by a CASE expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleLabel {
    pub title: String,
    pub label: String,
}

impl FromRow for TitleLabel {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            label: row.get(1)?,
        })
    }
}

/// A book title with its 1-based position in title order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleRank {
    pub title: String,
    pub rank: i64,
}

impl FromRow for TitleRank {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            rank: row.get(1)?,
        })
    }
}
