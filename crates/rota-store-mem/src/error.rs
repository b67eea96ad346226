//! Error type for `rota-store-mem`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rota_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
