//! [`MemStore`] — the in-memory implementation of [`EntityStore`].

use std::{collections::HashMap, sync::Arc};

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use rota_core::{
  doc,
  entities::Record,
  id::EntityId,
  store::{EntityStore, Filter, ListQuery, Patch},
};

use crate::{Error, Result};

type Collections = HashMap<String, Vec<Map<String, Value>>>;

/// A rota entity store held entirely in process memory.
///
/// Cloning is cheap; clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
  collections: Arc<RwLock<Collections>>,
}

impl MemStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn generate_id() -> EntityId {
  EntityId::Str(Uuid::new_v4().simple().to_string())
}

fn push_draft<R: Record>(
  collections: &mut Collections,
  tenant: &str,
  draft: &R::New,
) -> Result<R> {
  let mut doc = doc::to_doc::<R>(draft)?;
  doc.insert("id".to_string(), Value::from(&generate_id()));
  let row: R = doc::decode(&doc)?;
  let mut stored = doc::row_doc(&row)?;
  stored.insert("tenant".to_string(), Value::from(tenant));
  collections
    .entry(R::COLLECTION.to_string())
    .or_default()
    .push(stored);
  Ok(row)
}

impl EntityStore for MemStore {
  type Error = Error;

  async fn list<R: Record>(&self, tenant: &str, query: &ListQuery) -> Result<Vec<R>> {
    let collections = self.collections.read().await;
    let docs = collections
      .get(R::COLLECTION)
      .map(Vec::as_slice)
      .unwrap_or_default();
    doc::select(docs, tenant, query)
      .into_iter()
      .map(|d| doc::decode::<R>(d).map_err(Error::from))
      .collect()
  }

  async fn get<R: Record>(&self, tenant: &str, id: &EntityId) -> Result<Option<R>> {
    let collections = self.collections.read().await;
    let Some(docs) = collections.get(R::COLLECTION) else {
      return Ok(None);
    };
    for d in docs {
      if doc::id_matches(d, id) && doc::tenant_matches(d, tenant) {
        return Ok(Some(doc::decode(d)?));
      }
    }
    Ok(None)
  }

  async fn insert<R: Record>(&self, tenant: &str, draft: &R::New) -> Result<R> {
    let mut collections = self.collections.write().await;
    push_draft(&mut collections, tenant, draft)
  }

  async fn insert_many<R: Record>(&self, tenant: &str, drafts: &[R::New]) -> Result<Vec<R>> {
    let mut collections = self.collections.write().await;
    drafts
      .iter()
      .map(|draft| push_draft(&mut collections, tenant, draft))
      .collect()
  }

  async fn update<R: Record>(
    &self,
    tenant: &str,
    id: &EntityId,
    patch: &Patch,
  ) -> Result<Option<R>> {
    let mut collections = self.collections.write().await;
    let Some(docs) = collections.get_mut(R::COLLECTION) else {
      return Ok(None);
    };
    for d in docs.iter_mut() {
      if doc::id_matches(d, id) && doc::tenant_matches(d, tenant) {
        let (row, mut stored) = doc::apply_patch::<R>(d, patch, id)?;
        stored.insert("tenant".to_string(), Value::from(tenant));
        *d = stored;
        return Ok(Some(row));
      }
    }
    Ok(None)
  }

  async fn upsert<R: Record>(&self, tenant: &str, key: &Filter, patch: &Patch) -> Result<R> {
    let mut collections = self.collections.write().await;
    let docs = collections.entry(R::COLLECTION.to_string()).or_default();

    for d in docs.iter_mut() {
      if doc::tenant_matches(d, tenant) && doc::matches(d, key) {
        let id = doc::doc_id(R::COLLECTION, d)?;
        let (row, mut stored) = doc::apply_patch::<R>(d, patch, &id)?;
        stored.insert("tenant".to_string(), Value::from(tenant));
        *d = stored;
        return Ok(row);
      }
    }

    // Insert path: the natural key plus the patch must form a full draft.
    let mut fresh = Map::new();
    for (field, value) in &key.0 {
      fresh.insert(field.clone(), value.clone());
    }
    doc::merge(&mut fresh, patch);
    fresh.insert("id".to_string(), Value::from(&generate_id()));
    let row: R = doc::decode(&fresh)?;
    let mut stored = doc::row_doc(&row)?;
    stored.insert("tenant".to_string(), Value::from(tenant));
    docs.push(stored);
    Ok(row)
  }

  async fn delete<R: Record>(&self, tenant: &str, id: &EntityId) -> Result<bool> {
    let mut collections = self.collections.write().await;
    let Some(docs) = collections.get_mut(R::COLLECTION) else {
      return Ok(false);
    };
    let before = docs.len();
    docs.retain(|d| !(doc::id_matches(d, id) && doc::tenant_matches(d, tenant)));
    Ok(docs.len() < before)
  }

  async fn delete_matching<R: Record>(&self, tenant: &str, filter: &Filter) -> Result<usize> {
    let mut collections = self.collections.write().await;
    let Some(docs) = collections.get_mut(R::COLLECTION) else {
      return Ok(0);
    };
    let before = docs.len();
    docs.retain(|d| !(doc::tenant_matches(d, tenant) && doc::matches(d, filter)));
    Ok(before - docs.len())
  }
}
