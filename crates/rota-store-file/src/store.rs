//! [`FileStore`] — one JSON array file per collection.

use std::{
  collections::HashMap,
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use rand::Rng;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use rota_core::{
  doc,
  entities::{COLLECTIONS, Record},
  id::EntityId,
  store::{EntityStore, Filter, ListQuery, Patch},
};

use crate::{Error, Result};

type Collections = HashMap<String, Vec<Map<String, Value>>>;

/// A rota entity store backed by per-collection JSON files.
///
/// The full dataset is loaded at open and kept in memory; mutations rewrite
/// the affected file (tmp file then rename) before returning. Clones share
/// the same in-memory state and directory.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir:         PathBuf,
  collections: Arc<RwLock<Collections>>,
}

/// Ids start with a letter so they can never be mistaken for the relational
/// backend's integer ids when parsed back out of a URL.
fn generate_id() -> EntityId {
  let mut rng = rand::thread_rng();
  let head = char::from(rng.gen_range(b'a'..=b'z'));
  let tail: String = (0..15)
    .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
    .collect();
  EntityId::Str(format!("{head}{tail}"))
}

impl FileStore {
  /// Open a store rooted at `dir`, creating the directory if needed and
  /// loading every collection file that already exists.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(|source| Error::Io { path: dir.clone(), source })?;

    let mut collections = Collections::new();
    for collection in COLLECTIONS {
      let path = collection_path(&dir, collection);
      let docs = match tokio::fs::read(&path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
          .map_err(|source| Error::Corrupt { path: path.clone(), source })?,
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(source) => return Err(Error::Io { path, source }),
      };
      collections.insert(collection.to_string(), docs);
    }

    Ok(Self { dir, collections: Arc::new(RwLock::new(collections)) })
  }

  /// Rewrite one collection file. Called with the write lock held so file
  /// contents always reflect a single mutation order.
  async fn save(&self, collection: &str, docs: &[Map<String, Value>]) -> Result<()> {
    let path = collection_path(&self.dir, collection);
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(docs)?;
    tokio::fs::write(&tmp, &bytes)
      .await
      .map_err(|source| Error::Io { path: tmp.clone(), source })?;
    tokio::fs::rename(&tmp, &path)
      .await
      .map_err(|source| Error::Io { path, source })?;
    Ok(())
  }
}

fn collection_path(dir: &Path, collection: &str) -> PathBuf {
  dir.join(format!("{collection}.json"))
}

impl EntityStore for FileStore {
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
    let docs = collections.entry(R::COLLECTION.to_string()).or_default();
    let row = push_draft::<R>(docs, tenant, draft)?;
    self.save(R::COLLECTION, docs).await?;
    Ok(row)
  }

  async fn insert_many<R: Record>(&self, tenant: &str, drafts: &[R::New]) -> Result<Vec<R>> {
    let mut collections = self.collections.write().await;
    let docs = collections.entry(R::COLLECTION.to_string()).or_default();
    let rows = drafts
      .iter()
      .map(|draft| push_draft::<R>(docs, tenant, draft))
      .collect::<Result<Vec<_>>>()?;
    self.save(R::COLLECTION, docs).await?;
    Ok(rows)
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
    let mut updated = None;
    for d in docs.iter_mut() {
      if doc::id_matches(d, id) && doc::tenant_matches(d, tenant) {
        let (row, mut stored) = doc::apply_patch::<R>(d, patch, id)?;
        stored.insert("tenant".to_string(), Value::from(tenant));
        *d = stored;
        updated = Some(row);
        break;
      }
    }
    if updated.is_some() {
      self.save(R::COLLECTION, docs).await?;
    }
    Ok(updated)
  }

  async fn upsert<R: Record>(&self, tenant: &str, key: &Filter, patch: &Patch) -> Result<R> {
    let mut collections = self.collections.write().await;
    let docs = collections.entry(R::COLLECTION.to_string()).or_default();

    let mut merged = None;
    for d in docs.iter_mut() {
      if doc::tenant_matches(d, tenant) && doc::matches(d, key) {
        let id = doc::doc_id(R::COLLECTION, d)?;
        let (row, mut stored) = doc::apply_patch::<R>(d, patch, &id)?;
        stored.insert("tenant".to_string(), Value::from(tenant));
        *d = stored;
        merged = Some(row);
        break;
      }
    }

    let row = match merged {
      Some(row) => row,
      None => {
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
        row
      }
    };

    self.save(R::COLLECTION, docs).await?;
    Ok(row)
  }

  async fn delete<R: Record>(&self, tenant: &str, id: &EntityId) -> Result<bool> {
    let mut collections = self.collections.write().await;
    let Some(docs) = collections.get_mut(R::COLLECTION) else {
      return Ok(false);
    };
    let before = docs.len();
    docs.retain(|d| !(doc::id_matches(d, id) && doc::tenant_matches(d, tenant)));
    if docs.len() == before {
      return Ok(false);
    }
    self.save(R::COLLECTION, docs).await?;
    Ok(true)
  }

  async fn delete_matching<R: Record>(&self, tenant: &str, filter: &Filter) -> Result<usize> {
    let mut collections = self.collections.write().await;
    let Some(docs) = collections.get_mut(R::COLLECTION) else {
      return Ok(0);
    };
    let before = docs.len();
    docs.retain(|d| !(doc::tenant_matches(d, tenant) && doc::matches(d, filter)));
    let removed = before - docs.len();
    if removed > 0 {
      self.save(R::COLLECTION, docs).await?;
    }
    Ok(removed)
  }
}

fn push_draft<R: Record>(
  docs: &mut Vec<Map<String, Value>>,
  tenant: &str,
  draft: &R::New,
) -> Result<R> {
  let mut doc = doc::to_doc::<R>(draft)?;
  doc.insert("id".to_string(), Value::from(&generate_id()));
  let row: R = doc::decode(&doc)?;
  let mut stored = doc::row_doc(&row)?;
  stored.insert("tenant".to_string(), Value::from(tenant));
  docs.push(stored);
  Ok(row)
}
