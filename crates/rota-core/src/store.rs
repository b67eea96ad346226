//! The `EntityStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`rota-store-sqlite`,
//! `rota-store-file`, `rota-store-mem`). Higher layers depend on this
//! abstraction and never branch on backend identity.

use std::future::Future;

use serde_json::{Map, Value};

use crate::{entities::Record, id::EntityId};

// ─── Query types ─────────────────────────────────────────────────────────────

/// A conjunction of field-equality conditions, compared as JSON values.
///
/// Field names come from typed callers, never raw client input; backends may
/// interpolate them into query text.
#[derive(Debug, Clone, Default)]
pub struct Filter(pub Vec<(String, Value)>);

impl Filter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Require `field == value`.
  pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.0.push((field.into(), value.into()));
    self
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// A partial row update, merged field-wise onto the stored document and then
/// narrowed through the row type (unknown fields are dropped, `id` and
/// `tenant` are never writable).
#[derive(Debug, Clone, Default)]
pub struct Patch(pub Map<String, Value>);

impl Patch {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.0.insert(field.into(), value.into());
    self
  }
}

/// Parameters for [`EntityStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
  /// Field-equality conditions, all of which must hold.
  pub filter:        Filter,
  /// Case-insensitive substring match on the row's `name` field.
  pub name_contains: Option<String>,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

impl ListQuery {
  /// Everything in the collection, in insertion order.
  pub fn all() -> Self {
    Self::default()
  }

  /// Rows matching `filter`, in insertion order.
  pub fn matching(filter: Filter) -> Self {
    Self { filter, ..Self::default() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a rota storage backend.
///
/// All rows are scoped by tenant. Identifier schemes are backend-specific
/// (surrogate integers or generated strings) but stable and unique within a
/// (collection, tenant) for the row's lifetime. Every mutating call durably
/// persists before returning.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with `axum`).
pub trait EntityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List rows in insertion order, narrowed and paged by `query`.
  fn list<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + 'a;

  /// Fetch one row by native id. Returns `None` if not found.
  fn get<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    id: &'a EntityId,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + 'a;

  /// Persist a new row and return it with its backend-assigned id.
  fn insert<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    draft: &'a R::New,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + 'a;

  /// Persist a batch of new rows, preserving order.
  fn insert_many<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    drafts: &'a [R::New],
  ) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + 'a;

  /// Merge `patch` into an existing row. Returns `None` if the id does not
  /// exist in this tenant.
  fn update<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    id: &'a EntityId,
    patch: &'a Patch,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + 'a;

  /// Insert-or-merge on a natural `key`. Concurrent upserts against the same
  /// key converge on one row instead of erroring or duplicating.
  fn upsert<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    key: &'a Filter,
    patch: &'a Patch,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + 'a;

  /// Delete one row. Returns `false` if the id does not exist. Deletion does
  /// not cascade; dangling edges are caught by solve-time validation.
  fn delete<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    id: &'a EntityId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete every row matching `filter`, returning the count removed.
  fn delete_matching<'a, R: Record>(
    &'a self,
    tenant: &'a str,
    filter: &'a Filter,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
