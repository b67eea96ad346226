//! SQL schema for the rota SQLite store.
//!
//! Every collection shares one shape: an autoincrement rowid, the tenant
//! scope, and the remaining row fields as a JSON body. Executed once at
//! connection startup; future migrations will be gated on
//! `PRAGMA user_version`.

use rota_core::entities::COLLECTIONS;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub fn ddl() -> String {
  let mut sql = String::from("PRAGMA journal_mode = WAL;\n");
  for collection in COLLECTIONS {
    sql.push_str(&format!(
      "
CREATE TABLE IF NOT EXISTS {collection} (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant TEXT NOT NULL,
    body   TEXT NOT NULL    -- row fields as JSON; id and tenant excluded
);
CREATE INDEX IF NOT EXISTS {collection}_tenant_idx ON {collection}(tenant);
"
    ));
  }
  sql.push_str("\nPRAGMA user_version = 1;\n");
  sql
}
