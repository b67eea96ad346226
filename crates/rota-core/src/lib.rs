//! Core types and trait definitions for the rota timetabling store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod doc;
pub mod entities;
pub mod error;
pub mod id;
pub mod store;
pub mod week;

pub use error::{Error, Result};
