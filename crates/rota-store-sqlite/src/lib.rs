//! SQLite backend for the rota entity store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Rows live in one table per collection
//! as `(rowid, tenant, body)` with the body as JSON; list filters compile to
//! `json_extract` conditions.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
