//! Integration tests for `FileStore` against a temporary directory.

use rota_core::{
  entities::{Class, NewClass, NewSubject, Subject},
  id::EntityId,
  store::{EntityStore, Filter, ListQuery, Patch},
};

use crate::{Error, FileStore};

fn class(code: &str) -> NewClass {
  NewClass { code: code.into(), section: "A".into(), size: 30 }
}

#[tokio::test]
async fn open_creates_directory_and_starts_empty() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("store");

  let s = FileStore::open(&path).await.unwrap();
  let all: Vec<Class> = s.list("demo", &ListQuery::all()).await.unwrap();
  assert!(all.is_empty());
  assert!(path.is_dir());
}

#[tokio::test]
async fn generated_ids_never_parse_as_integers() {
  let dir = tempfile::tempdir().unwrap();
  let s = FileStore::open(dir.path()).await.unwrap();

  let row: Class = s.insert("demo", &class("8")).await.unwrap();
  let EntityId::Str(raw) = &row.id else {
    panic!("file store assigned a non-string id");
  };
  assert!(matches!(EntityId::parse(raw), EntityId::Str(_)));
}

#[tokio::test]
async fn rows_survive_reopen() {
  let dir = tempfile::tempdir().unwrap();

  let id = {
    let s = FileStore::open(dir.path()).await.unwrap();
    let row: Class = s.insert("demo", &class("8")).await.unwrap();
    let _: Subject = s
      .insert("demo", &NewSubject { code: "SCI".into(), name: "Science".into(), is_lab: true })
      .await
      .unwrap();
    row.id
  };

  let s = FileStore::open(dir.path()).await.unwrap();
  let fetched: Class = s.get("demo", &id).await.unwrap().unwrap();
  assert_eq!(fetched.code, "8");

  let subjects: Vec<Subject> = s.list("demo", &ListQuery::all()).await.unwrap();
  assert_eq!(subjects.len(), 1);
  assert!(subjects[0].is_lab);
}

#[tokio::test]
async fn update_and_delete_persist_across_reopen() {
  let dir = tempfile::tempdir().unwrap();

  let (kept, dropped) = {
    let s = FileStore::open(dir.path()).await.unwrap();
    let kept: Class = s.insert("demo", &class("7")).await.unwrap();
    let dropped: Class = s.insert("demo", &class("8")).await.unwrap();
    let _: Class = s
      .update("demo", &kept.id, &Patch::new().set("size", 32))
      .await
      .unwrap()
      .unwrap();
    assert!(s.delete::<Class>("demo", &dropped.id).await.unwrap());
    (kept.id, dropped.id)
  };

  let s = FileStore::open(dir.path()).await.unwrap();
  let kept: Class = s.get("demo", &kept).await.unwrap().unwrap();
  assert_eq!(kept.size, 32);
  assert!(s.get::<Class>("demo", &dropped).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_converges_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let key = Filter::new().eq("code", "MATH");

  let first = {
    let s = FileStore::open(dir.path()).await.unwrap();
    let row: Subject = s
      .upsert("demo", &key, &Patch::new().set("name", "Mathematics"))
      .await
      .unwrap();
    row.id
  };

  let s = FileStore::open(dir.path()).await.unwrap();
  let again: Subject = s
    .upsert("demo", &key, &Patch::new().set("name", "Maths"))
    .await
    .unwrap();
  assert_eq!(again.id, first);
  assert_eq!(again.name, "Maths");

  let all: Vec<Subject> = s.list("demo", &ListQuery::all()).await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn corrupt_collection_file_is_reported_with_its_path() {
  let dir = tempfile::tempdir().unwrap();
  let bad = dir.path().join("classes.json");
  std::fs::write(&bad, b"not json").unwrap();

  let err = FileStore::open(dir.path()).await.unwrap_err();
  assert!(matches!(err, Error::Corrupt { ref path, .. } if *path == bad));
}
