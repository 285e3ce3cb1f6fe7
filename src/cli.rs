use bookshelf_common::{AuthorId, BookId};
use bookshelf_db::catalog::QueryShape;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(
    author,
    version,
    about = "Mapped-object queries side by side with literal SQL over authors and books"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Without a subcommand, every book is listed through literal SQL
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one query shape and print its rows
    Query {
        /// Shape name (see `bookshelf shapes`)
        shape: QueryShape,

        /// Use the literal SQL variant instead of the mapped one
        #[arg(long)]
        literal: bool,

        /// Book id for fetch-by-id
        #[arg(long, default_value = "1")]
        id: BookId,

        /// Row count for limit
        #[arg(long, default_value = "2")]
        limit: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run shapes through both variants and check that they agree
    Compare {
        /// Shape to compare (all shapes if omitted)
        shape: Option<QueryShape>,
    },

    /// List the available query shapes
    Shapes,

    /// List all authors
    Authors,

    /// Insert a new book
    CreateBook {
        #[arg(long)]
        title: String,

        #[arg(long)]
        summary: String,

        /// Id of an existing author
        #[arg(long)]
        author_id: AuthorId,
    },

    /// Change the title and/or summary of a book
    UpdateBook {
        /// Book to update
        id: BookId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        summary: Option<String>,
    },

    /// Display version information
    Version,
}
