//! Error type for `rota-store-file`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rota_core::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error at {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    source: std::io::Error,
  },

  /// A collection file exists but does not hold a JSON array of objects.
  #[error("corrupt collection file {}: {source}", path.display())]
  Corrupt {
    path:   PathBuf,
    source: serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
