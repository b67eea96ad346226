//! [`SqliteStore`] — the SQLite implementation of [`EntityStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use rota_core::{
  entities::Record,
  id::EntityId,
  store::{EntityStore, Filter, ListQuery, Patch},
};

use crate::{
  Error, Result,
  encode::{RawRow, decode_record, encode_body, patch_body, sql_value, upsert_body},
  error::box_err,
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A rota entity store backed by a single SQLite file.
///
/// Cloning is cheap; clones share one connection. Every `conn.call` closure
/// runs alone on the connection thread, so read-modify-write sequences inside
/// one closure cannot interleave with other calls.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let ddl = schema::ddl();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query building ──────────────────────────────────────────────────────────

fn build_select(
  collection: &str,
  tenant: &str,
  query: &ListQuery,
) -> Result<(String, Vec<rusqlite::types::Value>)> {
  let mut sql = format!("SELECT id, body FROM {collection} WHERE tenant = ?1");
  let mut params = vec![rusqlite::types::Value::from(tenant.to_string())];

  push_filter(&mut sql, &mut params, &query.filter)?;

  if let Some(needle) = &query.name_contains {
    params.push(rusqlite::types::Value::from(format!(
      "%{}%",
      needle.to_lowercase()
    )));
    sql.push_str(&format!(
      " AND LOWER(json_extract(body, '$.name')) LIKE ?{}",
      params.len()
    ));
  }

  sql.push_str(" ORDER BY id");
  match (query.limit, query.offset) {
    (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
    (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
    // SQLite requires a LIMIT clause before OFFSET; -1 means unbounded.
    (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
    (None, None) => {}
  }

  Ok((sql, params))
}

fn build_delete(
  collection: &str,
  tenant: &str,
  filter: &Filter,
) -> Result<(String, Vec<rusqlite::types::Value>)> {
  let mut sql = format!("DELETE FROM {collection} WHERE tenant = ?1");
  let mut params = vec![rusqlite::types::Value::from(tenant.to_string())];
  push_filter(&mut sql, &mut params, filter)?;
  Ok((sql, params))
}

/// Append one `json_extract` condition per filter field. Field names come
/// from typed callers, never from client input, so interpolation is safe.
fn push_filter(
  sql: &mut String,
  params: &mut Vec<rusqlite::types::Value>,
  filter: &Filter,
) -> Result<()> {
  for (field, value) in &filter.0 {
    params.push(sql_value(value)?);
    sql.push_str(&format!(
      " AND json_extract(body, '$.{field}') IS ?{}",
      params.len()
    ));
  }
  Ok(())
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

impl EntityStore for SqliteStore {
  type Error = Error;

  async fn list<R: Record>(&self, tenant: &str, query: &ListQuery) -> Result<Vec<R>> {
    let (sql, params) = build_select(R::COLLECTION, tenant, query)?;
    let raws: Vec<RawRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawRow { id: row.get(0)?, body: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_record()).collect()
  }

  async fn get<R: Record>(&self, tenant: &str, id: &EntityId) -> Result<Option<R>> {
    // Integer rowids are the only ids this backend ever assigns.
    let &EntityId::Int(rowid) = id else {
      return Ok(None);
    };
    let sql = format!(
      "SELECT body FROM {} WHERE id = ?1 AND tenant = ?2",
      R::COLLECTION
    );
    let tenant = tenant.to_string();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![rowid, tenant], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;

    body.map(|b| decode_record(rowid, &b)).transpose()
  }

  async fn insert<R: Record>(&self, tenant: &str, draft: &R::New) -> Result<R> {
    let body = encode_body::<R>(draft)?;
    let sql = format!(
      "INSERT INTO {} (tenant, body) VALUES (?1, ?2)",
      R::COLLECTION
    );
    let tenant = tenant.to_string();

    let raw: RawRow = self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![tenant, body])?;
        Ok(RawRow { id: conn.last_insert_rowid(), body })
      })
      .await?;

    raw.into_record()
  }

  async fn insert_many<R: Record>(&self, tenant: &str, drafts: &[R::New]) -> Result<Vec<R>> {
    let bodies = drafts
      .iter()
      .map(|draft| encode_body::<R>(draft))
      .collect::<Result<Vec<_>>>()?;
    let sql = format!(
      "INSERT INTO {} (tenant, body) VALUES (?1, ?2)",
      R::COLLECTION
    );
    let tenant = tenant.to_string();

    let raws: Vec<RawRow> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut out = Vec::with_capacity(bodies.len());
        {
          let mut stmt = tx.prepare(&sql)?;
          for body in bodies {
            stmt.execute(rusqlite::params![tenant, body])?;
            out.push(RawRow { id: tx.last_insert_rowid(), body });
          }
        }
        tx.commit()?;
        Ok(out)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_record()).collect()
  }

  async fn update<R: Record>(
    &self,
    tenant: &str,
    id: &EntityId,
    patch: &Patch,
  ) -> Result<Option<R>> {
    let &EntityId::Int(rowid) = id else {
      return Ok(None);
    };
    let select = format!(
      "SELECT body FROM {} WHERE id = ?1 AND tenant = ?2",
      R::COLLECTION
    );
    let update = format!("UPDATE {} SET body = ?1 WHERE id = ?2", R::COLLECTION);
    let tenant = tenant.to_string();
    let patch = patch.clone();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        let current: Option<String> = conn
          .query_row(&select, rusqlite::params![rowid, tenant], |row| row.get(0))
          .optional()?;
        let Some(current) = current else {
          return Ok(None);
        };
        let body = patch_body::<R>(&current, &patch, rowid).map_err(box_err)?;
        conn.execute(&update, rusqlite::params![body, rowid])?;
        Ok(Some(body))
      })
      .await?;

    body.map(|b| decode_record(rowid, &b)).transpose()
  }

  async fn upsert<R: Record>(&self, tenant: &str, key: &Filter, patch: &Patch) -> Result<R> {
    let probe = ListQuery {
      filter: key.clone(),
      limit: Some(1),
      ..ListQuery::default()
    };
    let (find_sql, find_params) = build_select(R::COLLECTION, tenant, &probe)?;
    let insert_sql = format!(
      "INSERT INTO {} (tenant, body) VALUES (?1, ?2)",
      R::COLLECTION
    );
    let update_sql = format!("UPDATE {} SET body = ?1 WHERE id = ?2", R::COLLECTION);
    let tenant = tenant.to_string();
    let key = key.clone();
    let patch = patch.clone();

    let raw: RawRow = self
      .conn
      .call(move |conn| {
        let hit: Option<(i64, String)> = conn
          .query_row(&find_sql, rusqlite::params_from_iter(find_params), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })
          .optional()?;

        match hit {
          Some((rowid, current)) => {
            let body = patch_body::<R>(&current, &patch, rowid).map_err(box_err)?;
            conn.execute(&update_sql, rusqlite::params![body, rowid])?;
            Ok(RawRow { id: rowid, body })
          }
          None => {
            let body = upsert_body::<R>(&key, &patch).map_err(box_err)?;
            conn.execute(&insert_sql, rusqlite::params![tenant, body])?;
            Ok(RawRow { id: conn.last_insert_rowid(), body })
          }
        }
      })
      .await?;

    raw.into_record()
  }

  async fn delete<R: Record>(&self, tenant: &str, id: &EntityId) -> Result<bool> {
    let &EntityId::Int(rowid) = id else {
      return Ok(false);
    };
    let sql = format!(
      "DELETE FROM {} WHERE id = ?1 AND tenant = ?2",
      R::COLLECTION
    );
    let tenant = tenant.to_string();

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![rowid, tenant])?))
      .await?;
    Ok(changed > 0)
  }

  async fn delete_matching<R: Record>(&self, tenant: &str, filter: &Filter) -> Result<usize> {
    let (sql, params) = build_delete(R::COLLECTION, tenant, filter)?;
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?))
      .await?;
    Ok(removed)
  }
}
