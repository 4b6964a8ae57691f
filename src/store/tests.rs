//! Tests for the document store, run against the redb backend.

use super::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    title: String,
    #[serde(default)]
    tags: Vec<String>,
}

fn note(title: &str) -> Note {
    Note {
        title: title.to_string(),
        tags: Vec::new(),
    }
}

fn open(tmp: &TempDir) -> DocStore {
    DocStore::file(tmp.path().join("test.redb")).unwrap()
}

#[tokio::test]
async fn test_put_and_get() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    store.put("notes", "n1", &note("first")).await.unwrap();
    let loaded: Note = store.get_as("notes", "n1").await.unwrap().unwrap();
    assert_eq!(loaded, note("first"));
}

#[tokio::test]
async fn test_get_nonexistent() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    let loaded: Option<Note> = store.get_as("notes", "missing").await.unwrap();
    assert!(loaded.is_none());
    assert!(!store.exists("notes", "missing").await.unwrap());
}

#[tokio::test]
async fn test_delete() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    store.put("notes", "n1", &note("first")).await.unwrap();
    assert!(store.delete("notes", "n1").await.unwrap());
    assert!(!store.delete("notes", "n1").await.unwrap());
    assert!(store.get("notes", "n1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_is_scoped_and_ordered() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    store.put("notes", "b", &note("b")).await.unwrap();
    store.put("notes", "a", &note("a")).await.unwrap();
    store.put("notesx", "c", &note("c")).await.unwrap();
    store.put("other", "d", &note("d")).await.unwrap();

    let listed: Vec<(String, Note)> = store.list_as("notes").await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn test_update_merges_fields() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    store.put("notes", "n1", &note("first")).await.unwrap();

    let mut patch = Map::new();
    patch.insert("tags".into(), json!(["x"]));
    assert!(store.update("notes", "n1", patch).await.unwrap());

    let loaded: Note = store.get_as("notes", "n1").await.unwrap().unwrap();
    assert_eq!(loaded.title, "first");
    assert_eq!(loaded.tags, vec!["x"]);
}

#[tokio::test]
async fn test_update_missing_document() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    let mut patch = Map::new();
    patch.insert("title".into(), json!("ghost"));
    assert!(!store.update("notes", "ghost", patch).await.unwrap());
    assert!(!store.exists("notes", "ghost").await.unwrap());
}

#[tokio::test]
async fn test_get_many_preserves_order() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    store.put("notes", "a", &note("a")).await.unwrap();
    store.put("notes", "c", &note("c")).await.unwrap();

    let ids = vec!["c".to_string(), "b".to_string(), "a".to_string()];
    let loaded: Vec<Option<Note>> = store.get_many_as("notes", &ids).await.unwrap();
    assert_eq!(loaded, vec![Some(note("c")), None, Some(note("a"))]);
}

#[tokio::test]
async fn test_commit_applies_deletes_and_sets() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    store.put("notes", "old", &note("old")).await.unwrap();

    let mut batch = WriteBatch::new();
    batch
        .delete("notes", "old")
        .set("notes", "new", json!({"title": "new"}));
    assert_eq!(batch.len(), 2);
    store.commit(batch).await.unwrap();

    assert!(!store.exists("notes", "old").await.unwrap());
    let loaded: Note = store.get_as("notes", "new").await.unwrap().unwrap();
    assert_eq!(loaded.title, "new");
}

#[tokio::test]
async fn test_commit_later_op_wins_for_same_key() {
    let tmp = TempDir::new().unwrap();
    let store = open(&tmp);

    let mut batch = WriteBatch::new();
    batch
        .set("notes", "k", json!({"title": "one"}))
        .delete("notes", "k")
        .set("notes", "k", json!({"title": "two"}));
    store.commit(batch).await.unwrap();

    let loaded: Note = store.get_as("notes", "k").await.unwrap().unwrap();
    assert_eq!(loaded.title, "two");
}

#[tokio::test]
async fn test_persistence_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("nested").join("test.redb");

    {
        let store = DocStore::file(&db_path).unwrap();
        store.put("notes", "n1", &note("kept")).await.unwrap();
    }

    let store = DocStore::file(&db_path).unwrap();
    let loaded: Note = store.get_as("notes", "n1").await.unwrap().unwrap();
    assert_eq!(loaded.title, "kept");
}

#[tokio::test]
async fn test_malformed_document_is_an_error() {
    let store = DocStore::memory();
    store.put("notes", "bad", &json!({"title": 42})).await.unwrap();

    let result: anyhow::Result<Option<Note>> = store.get_as("notes", "bad").await;
    assert!(result.is_err());
}
