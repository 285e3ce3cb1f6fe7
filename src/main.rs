mod cli;

use bookshelf::config;
use bookshelf_common::BookId;
use bookshelf_db::catalog::{self, Approach, QueryArgs, QueryOutput, QueryShape};
use bookshelf_db::models::{BookUpdate, NewBook};
use bookshelf_db::pool::{open_database, DbPool};
use bookshelf_db::queries::{authors, books};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "bookshelf=debug,bookshelf_db=debug".to_string()
        } else {
            "bookshelf=info,bookshelf_db=warn".to_string()
        }
    });

    // stdout carries query results only
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Version) => {
            println!("bookshelf {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Shapes) => {
            for shape in QueryShape::ALL {
                println!("{}", shape);
            }
            Ok(())
        }
        command => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let pool = open_database(&config.database).with_context(|| {
                format!(
                    "Failed to open database at {}",
                    config.database.path.display()
                )
            })?;
            run_command(&pool, command)
        }
    }
}

fn run_command(pool: &DbPool, command: Option<Commands>) -> Result<()> {
    match command {
        None => {
            let output = catalog::run(
                pool,
                QueryShape::FetchAll,
                Approach::Literal,
                QueryArgs::default(),
            )?;
            print_output(&output, false)
        }
        Some(Commands::Query {
            shape,
            literal,
            id,
            limit,
            json,
        }) => {
            let approach = if literal {
                Approach::Literal
            } else {
                Approach::Mapped
            };
            let output = catalog::run(pool, shape, approach, QueryArgs { id, limit })?;
            print_output(&output, json)
        }
        Some(Commands::Compare { shape }) => compare(pool, shape),
        Some(Commands::Authors) => list_authors(pool),
        Some(Commands::CreateBook {
            title,
            summary,
            author_id,
        }) => create_book(pool, NewBook::new(title, summary, author_id)),
        Some(Commands::UpdateBook { id, title, summary }) => {
            update_book(pool, id, BookUpdate { title, summary })
        }
        Some(Commands::Version) | Some(Commands::Shapes) => Ok(()),
    }
}

fn print_output(output: &QueryOutput, json: bool) -> Result<()> {
    if json {
        let json_str = serde_json::to_string_pretty(output)?;
        println!("{}", json_str);
    } else {
        print!("{}", output);
    }
    Ok(())
}

fn compare(pool: &DbPool, shape: Option<QueryShape>) -> Result<()> {
    let shapes = match shape {
        Some(shape) => vec![shape],
        None => QueryShape::ALL.to_vec(),
    };

    for shape in shapes {
        let output = catalog::compare(pool, shape, QueryArgs::default())?;
        println!("✓ {} ({} rows)", shape, output.len());
    }

    Ok(())
}

fn list_authors(pool: &DbPool) -> Result<()> {
    for author in authors::list_authors(pool)? {
        println!("{}\t{}\t{}", author.id, author.name, author.bio);
    }
    Ok(())
}

fn create_book(pool: &DbPool, new_book: NewBook) -> Result<()> {
    let book = books::create_book(pool, &new_book)
        .with_context(|| format!("Failed to create book for author {}", new_book.author_id))?;
    print_output(&QueryOutput::Book(Some(book)), false)
}

fn update_book(pool: &DbPool, id: BookId, update: BookUpdate) -> Result<()> {
    match books::update_book(pool, id, &update)? {
        Some(book) => print_output(&QueryOutput::Book(Some(book)), false),
        None => anyhow::bail!("Book {} does not exist", id),
    }
}
