//! SQL schema for the Catalog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document. `seq` fixes list order; `body` never holds `_id`.
CREATE TABLE IF NOT EXISTS documents (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    collection  TEXT NOT NULL,
    doc_id      TEXT NOT NULL,   -- 24 lowercase hex chars
    body        TEXT NOT NULL,   -- JSON object
    UNIQUE (collection, doc_id)
);

CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents(collection, seq);

PRAGMA user_version = 1;
";

/// DDL for a unique index on one JSON field of one collection.
///
/// Callers must have checked both names with [`is_valid_name`]; they are
/// interpolated, not bound.
pub fn unique_index_sql(collection: &str, field: &str) -> String {
  format!(
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_{collection}_{field}
       ON documents (json_extract(body, '$.{field}'))
       WHERE collection = '{collection}'"
  )
}

pub fn is_valid_name(name: &str) -> bool {
  !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
