//! In-memory document backend for the rota entity store.
//!
//! Rows live as JSON objects in per-collection vectors behind an async
//! RwLock, with generated 32-hex string ids. This is the test double for
//! everything above the store trait, and a real backend for ephemeral runs.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::MemStore;
