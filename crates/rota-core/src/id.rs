//! Native entity identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A backend-native row identifier.
///
/// The relational backend assigns surrogate integers; the document and
/// flat-file backends assign generated strings. Ids are opaque within a
/// (collection, tenant) scope and are never portable across backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
  Int(i64),
  Str(String),
}

impl EntityId {
  /// Parse a path or query segment: anything that parses as `i64` is an
  /// integer id, everything else is a string id. The string backends
  /// generate ids that never parse as integers, so this cannot misfile.
  pub fn parse(raw: &str) -> Self {
    match raw.parse::<i64>() {
      Ok(n) => EntityId::Int(n),
      Err(_) => EntityId::Str(raw.to_string()),
    }
  }
}

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EntityId::Int(n) => write!(f, "{n}"),
      EntityId::Str(s) => f.write_str(s),
    }
  }
}

impl From<i64> for EntityId {
  fn from(n: i64) -> Self {
    EntityId::Int(n)
  }
}

impl From<String> for EntityId {
  fn from(s: String) -> Self {
    EntityId::Str(s)
  }
}

impl From<&str> for EntityId {
  fn from(s: &str) -> Self {
    EntityId::Str(s.to_string())
  }
}

impl From<EntityId> for Value {
  fn from(id: EntityId) -> Self {
    match id {
      EntityId::Int(n) => Value::from(n),
      EntityId::Str(s) => Value::from(s),
    }
  }
}

impl From<&EntityId> for Value {
  fn from(id: &EntityId) -> Self {
    id.clone().into()
  }
}
