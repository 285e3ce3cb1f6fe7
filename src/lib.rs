//! Bookshelf - mapped-object queries next to literal SQL
//!
//! This library crate exposes the configuration layer for integration testing.
//! The query catalog itself lives in `bookshelf_db`.

pub mod config;
