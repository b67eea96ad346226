//! Error type for `rota-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rota_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Filters compare scalars; arrays and objects have no SQL encoding.
  #[error("unsupported filter value: {0}")]
  UnsupportedFilterValue(serde_json::Value),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Wrap a core error so it can cross a `conn.call` closure boundary.
pub(crate) fn box_err(e: rota_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}
