//! JSON-document mapping shared by every store backend.
//!
//! Rows travel through the stores as JSON objects: a draft serialises to an
//! object, the backend injects the assigned `id` (and its tenant scope), and
//! the object decodes back into the typed row. Patches merge field-wise and
//! are then re-typed through the row so unknown fields never reach disk.

use serde_json::{Map, Value};

use crate::{
  entities::Record,
  error::{Error, Result},
  id::EntityId,
  store::{Filter, ListQuery, Patch},
};

/// Fields a patch may never overwrite.
const PROTECTED: [&str; 2] = ["id", "tenant"];

/// Serialise a draft to its JSON object form, with protected fields removed.
pub fn to_doc<R: Record>(draft: &R::New) -> Result<Map<String, Value>> {
  match serde_json::to_value(draft)? {
    Value::Object(mut map) => {
      for field in PROTECTED {
        map.remove(field);
      }
      Ok(map)
    }
    _ => Err(Error::NotAnObject { collection: R::COLLECTION }),
  }
}

/// Serialise a full row (id included) to its JSON object form.
pub fn row_doc<R: Record>(row: &R) -> Result<Map<String, Value>> {
  match serde_json::to_value(row)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject { collection: R::COLLECTION }),
  }
}

/// Decode a stored doc (id embedded) into its typed row.
pub fn decode<R: Record>(doc: &Map<String, Value>) -> Result<R> {
  serde_json::from_value(Value::Object(doc.clone())).map_err(|e| Error::Decode {
    collection: R::COLLECTION,
    id:         doc.get("id").map(Value::to_string).unwrap_or_default(),
    source:     e,
  })
}

/// Decode then re-encode a doc through its typed row, dropping unknown
/// fields and materialising serde defaults. The result includes `id`.
pub fn retype<R: Record>(doc: &Map<String, Value>) -> Result<Map<String, Value>> {
  let row: R = decode(doc)?;
  row_doc(&row)
}

/// Shallow-merge `patch` into `doc`, skipping protected fields.
pub fn merge(doc: &mut Map<String, Value>, patch: &Patch) {
  for (field, value) in &patch.0 {
    if PROTECTED.contains(&field.as_str()) {
      continue;
    }
    doc.insert(field.clone(), value.clone());
  }
}

/// Merge a patch into a stored doc and narrow the result through the row
/// type. Returns the typed row and its clean doc form (id included).
pub fn apply_patch<R: Record>(
  current: &Map<String, Value>,
  patch: &Patch,
  id: &EntityId,
) -> Result<(R, Map<String, Value>)> {
  let mut merged = current.clone();
  merge(&mut merged, patch);
  merged.insert("id".to_string(), Value::from(id));
  let row: R = decode(&merged)?;
  let clean = row_doc(&row)?;
  Ok((row, clean))
}

/// The embedded id of a stored doc.
pub fn doc_id(collection: &'static str, doc: &Map<String, Value>) -> Result<EntityId> {
  let value = doc
    .get("id")
    .cloned()
    .ok_or(Error::MissingId { collection })?;
  serde_json::from_value(value).map_err(Error::Serialization)
}

pub fn tenant_matches(doc: &Map<String, Value>, tenant: &str) -> bool {
  doc.get("tenant").and_then(Value::as_str) == Some(tenant)
}

pub fn id_matches(doc: &Map<String, Value>, id: &EntityId) -> bool {
  doc.get("id") == Some(&Value::from(id))
}

/// True when every condition in `filter` holds on `doc`.
pub fn matches(doc: &Map<String, Value>, filter: &Filter) -> bool {
  filter.0.iter().all(|(field, value)| doc.get(field) == Some(value))
}

/// Apply tenant scope, filters, text match, and pagination over raw docs,
/// preserving insertion order.
pub fn select<'a>(
  docs: &'a [Map<String, Value>],
  tenant: &str,
  query: &ListQuery,
) -> Vec<&'a Map<String, Value>> {
  let needle = query.name_contains.as_ref().map(|s| s.to_lowercase());
  docs
    .iter()
    .filter(|d| tenant_matches(d, tenant))
    .filter(|d| matches(d, &query.filter))
    .filter(|d| match &needle {
      Some(needle) => d
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| name.to_lowercase().contains(needle)),
      None => true,
    })
    .skip(query.offset.unwrap_or(0))
    .take(query.limit.unwrap_or(usize::MAX))
    .collect()
}
