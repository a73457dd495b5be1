//! SQLite backend for the Holocron archive.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. That thread is also the single
//! writer queue: an import is one closure on it, inside one transaction.

mod encode;
mod import;
mod query;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
