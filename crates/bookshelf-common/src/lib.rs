//! Bookshelf-Common: shared types used across the bookshelf crates.
//!
//! - **Typed IDs**: integer newtypes so an author id cannot stand in for a book id
//! - **Error Handling**: the common error type and result alias
//!
//! # Examples
//!
//! ```
//! use bookshelf_common::{BookId, Error, Result};
//!
//! let id = BookId::from(3);
//! assert_eq!(id.get(), 3);
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("title is too long"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
