//! Encoding between typed rows and the JSON `body` column.
//!
//! Each table stores a row's fields as one JSON object, minus `id` (the
//! SQLite rowid is authoritative) and minus `tenant` (its own column).
//! Helpers that run inside `conn.call` closures return core results so the
//! caller can box them across the closure boundary.

use serde_json::{Map, Value};

use rota_core::{
  doc,
  entities::Record,
  id::EntityId,
  store::{Filter, Patch},
};

use crate::{Error, Result};

/// Raw column pair read from a collection table.
pub struct RawRow {
  pub id:   i64,
  pub body: String,
}

impl RawRow {
  pub fn into_record<R: Record>(self) -> Result<R> {
    decode_record(self.id, &self.body)
  }
}

/// Rebuild a typed row from its rowid and JSON body.
pub fn decode_record<R: Record>(id: i64, body: &str) -> Result<R> {
  let mut doc: Map<String, Value> = serde_json::from_str(body)?;
  doc.insert("id".to_string(), Value::from(id));
  Ok(doc::decode(&doc)?)
}

/// Serialise a draft to its body form.
pub fn encode_body<R: Record>(draft: &R::New) -> Result<String> {
  let doc = doc::to_doc::<R>(draft)?;
  Ok(Value::Object(doc).to_string())
}

/// Merge a patch into a stored body, narrowing through the row type.
pub fn patch_body<R: Record>(
  current: &str,
  patch: &Patch,
  id: i64,
) -> rota_core::Result<String> {
  let doc: Map<String, Value> = serde_json::from_str(current)?;
  let (_, clean) = doc::apply_patch::<R>(&doc, patch, &EntityId::Int(id))?;
  Ok(strip_to_body(clean))
}

/// Build the body for an upsert miss from the natural key plus the patch.
pub fn upsert_body<R: Record>(key: &Filter, patch: &Patch) -> rota_core::Result<String> {
  let mut doc = Map::new();
  for (field, value) in &key.0 {
    doc.insert(field.clone(), value.clone());
  }
  doc::merge(&mut doc, patch);
  // Placeholder id for the shape check; the real rowid is assigned on insert.
  doc.insert("id".to_string(), Value::from(0));
  let clean = doc::retype::<R>(&doc)?;
  Ok(strip_to_body(clean))
}

fn strip_to_body(mut doc: Map<String, Value>) -> String {
  doc.remove("id");
  doc.remove("tenant");
  Value::Object(doc).to_string()
}

/// Translate a JSON filter value to its SQL parameter form.
pub fn sql_value(value: &Value) -> Result<rusqlite::types::Value> {
  use rusqlite::types::Value as Sql;

  Ok(match value {
    Value::Null => Sql::Null,
    Value::Bool(b) => Sql::Integer(i64::from(*b)),
    Value::Number(n) => {
      if let Some(i) = n.as_i64() {
        Sql::Integer(i)
      } else if let Some(f) = n.as_f64() {
        Sql::Real(f)
      } else {
        return Err(Error::UnsupportedFilterValue(value.clone()));
      }
    }
    Value::String(s) => Sql::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => {
      return Err(Error::UnsupportedFilterValue(value.clone()));
    }
  })
}
