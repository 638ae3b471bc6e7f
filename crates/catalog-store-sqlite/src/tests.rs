//! Integration tests for `SqliteStore` against an in-memory database.

use catalog_core::{
  ObjectId, StoreError as _,
  store::{Document, DocumentStore, ID_FIELD, UpdateResult},
};
use serde_json::{Value, json};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn doc(value: Value) -> Document {
  match value {
    Value::Object(map) => map,
    other => panic!("not an object: {other}"),
  }
}

fn ada() -> Document {
  doc(json!({ "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com" }))
}

// ─── Insert / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_one() {
  let s = store().await;

  let res = s.insert_one("users", ada()).await.unwrap();
  assert!(res.acknowledged);

  let fetched = s.find_one("users", res.inserted_id).await.unwrap();
  let fetched = fetched.expect("document should exist");
  assert_eq!(fetched["firstName"], json!("Ada"));
  assert_eq!(fetched[ID_FIELD], json!(res.inserted_id.to_string()));
}

#[tokio::test]
async fn find_one_missing_returns_none() {
  let s = store().await;
  let result = s.find_one("users", ObjectId::new()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn find_one_is_scoped_to_collection() {
  let s = store().await;
  let res = s.insert_one("users", ada()).await.unwrap();
  assert!(s.find_one("products", res.inserted_id).await.unwrap().is_none());
}

#[tokio::test]
async fn client_supplied_id_is_ignored() {
  let s = store().await;
  let mut input = ada();
  input.insert(ID_FIELD.into(), json!("000000000000000000000000"));

  let res = s.insert_one("users", input).await.unwrap();
  assert_ne!(res.inserted_id.to_string(), "000000000000000000000000");
  let fetched = s.find_one("users", res.inserted_id).await.unwrap().unwrap();
  assert_eq!(fetched[ID_FIELD], json!(res.inserted_id.to_string()));
}

#[tokio::test]
async fn find_returns_insertion_order() {
  let s = store().await;
  let mut ids = Vec::new();
  for name in ["a", "b", "c"] {
    let res = s
      .insert_one("products", doc(json!({ "name": name })))
      .await
      .unwrap();
    ids.push(json!(res.inserted_id.to_string()));
  }
  s.insert_one("users", ada()).await.unwrap();

  let all = s.find("products").await.unwrap();
  let listed: Vec<_> = all.iter().map(|d| d[ID_FIELD].clone()).collect();
  assert_eq!(listed, ids);
}

#[tokio::test]
async fn numbers_and_nulls_roundtrip() {
  let s = store().await;
  let res = s
    .insert_one(
      "products",
      doc(json!({ "price": 1.5, "stock": 0, "manufacturer": "", "note": null })),
    )
    .await
    .unwrap();
  let got = s.find_one("products", res.inserted_id).await.unwrap().unwrap();
  assert_eq!(got["price"], json!(1.5));
  assert_eq!(got["stock"], json!(0));
  assert_eq!(got["manufacturer"], json!(""));
  assert_eq!(got["note"], Value::Null);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_merges_fields() {
  let s = store().await;
  let id = s.insert_one("users", ada()).await.unwrap().inserted_id;

  let res = s
    .update_one("users", id, doc(json!({ "favoriteColor": "green" })))
    .await
    .unwrap();
  assert_eq!(res, UpdateResult { matched_count: 1, modified_count: 1 });

  let got = s.find_one("users", id).await.unwrap().unwrap();
  assert_eq!(got["favoriteColor"], json!("green"));
  assert_eq!(got["lastName"], json!("Lovelace"));
}

#[tokio::test]
async fn update_with_same_value_modifies_nothing() {
  let s = store().await;
  let id = s.insert_one("users", ada()).await.unwrap().inserted_id;

  let res = s
    .update_one("users", id, doc(json!({ "firstName": "Ada" })))
    .await
    .unwrap();
  assert_eq!(res, UpdateResult { matched_count: 1, modified_count: 0 });
}

#[tokio::test]
async fn update_missing_matches_nothing() {
  let s = store().await;
  let res = s
    .update_one("users", ObjectId::new(), doc(json!({ "firstName": "X" })))
    .await
    .unwrap();
  assert_eq!(res, UpdateResult { matched_count: 0, modified_count: 0 });
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_once() {
  let s = store().await;
  let id = s.insert_one("users", ada()).await.unwrap().inserted_id;

  assert_eq!(s.delete_one("users", id).await.unwrap().deleted_count, 1);
  assert_eq!(s.delete_one("users", id).await.unwrap().deleted_count, 0);
  assert!(s.find_one("users", id).await.unwrap().is_none());
}

// ─── Unique indexes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn unique_index_rejects_duplicate_insert() {
  let s = store().await;
  s.ensure_unique_index("users", "email").await.unwrap();
  s.insert_one("users", ada()).await.unwrap();

  let err = s.insert_one("users", ada()).await.unwrap_err();
  assert!(err.is_duplicate_key(), "{err}");
  assert_eq!(s.find("users").await.unwrap().len(), 1);
}

#[tokio::test]
async fn unique_index_is_scoped_to_collection() {
  let s = store().await;
  s.ensure_unique_index("users", "email").await.unwrap();
  s.insert_one("users", ada()).await.unwrap();
  s.insert_one("products", ada()).await.unwrap();
  s.insert_one("products", ada()).await.unwrap();
}

#[tokio::test]
async fn unique_index_rejects_duplicate_update() {
  let s = store().await;
  s.ensure_unique_index("users", "email").await.unwrap();
  s.insert_one("users", ada()).await.unwrap();
  let mut grace = ada();
  grace.insert("email".into(), json!("grace@example.com"));
  let id = s.insert_one("users", grace).await.unwrap().inserted_id;

  let err = s
    .update_one("users", id, doc(json!({ "email": "ada@example.com" })))
    .await
    .unwrap_err();
  assert!(err.is_duplicate_key(), "{err}");

  let got = s.find_one("users", id).await.unwrap().unwrap();
  assert_eq!(got["email"], json!("grace@example.com"));
}

#[tokio::test]
async fn unique_index_rejects_bad_names() {
  let s = store().await;
  let err = s
    .ensure_unique_index("users", "email'); DROP TABLE documents; --")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidName(_)));
}

#[tokio::test]
async fn ensure_unique_index_is_idempotent() {
  let s = store().await;
  s.ensure_unique_index("users", "email").await.unwrap();
  s.ensure_unique_index("users", "email").await.unwrap();
}

#[tokio::test]
async fn plain_errors_are_not_duplicates() {
  assert!(!Error::InvalidName("x".into()).is_duplicate_key());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_store_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("catalog-store-{}", ObjectId::new()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("catalog.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_one("users", ada()).await.unwrap().inserted_id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.find_one("users", id).await.unwrap().is_some());

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
