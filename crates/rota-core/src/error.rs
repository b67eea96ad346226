//! Error types for `rota-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("{collection} row is not a JSON object")]
  NotAnObject { collection: &'static str },

  #[error("{collection} row has no id")]
  MissingId { collection: &'static str },

  #[error("{collection} row {id} failed to decode: {source}")]
  Decode {
    collection: &'static str,
    id:         String,
    #[source]
    source:     serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
