//! Database query modules.
//!
//! This module organizes all database operations into logical groups:
//! - mapped: the query catalog built from typed entity references
//! - literal: the same catalog as hand-written SQL
//! - books: book creation and partial updates
//! - authors: author lookup by identifier

pub mod authors;
pub mod books;
pub mod literal;
pub mod mapped;
