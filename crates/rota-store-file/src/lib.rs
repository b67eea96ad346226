//! Flat-file storage backend for rota.
//!
//! Each collection lives in one pretty-printed JSON array file under the
//! store directory. The whole dataset is held in memory and every mutation
//! rewrites the affected collection file, so this backend suits demo and
//! small-school deployments rather than high write volumes.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FileStore;

#[cfg(test)]
mod tests;
