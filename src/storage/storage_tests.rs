use super::*;
use chrono::{Duration, TimeZone, Utc};

use crate::identity::SubjectId;

fn owner(s: &str) -> SubjectId { SubjectId::new(s).unwrap() }

fn new_at(text: &str, who: &str, secs: i64) -> NewConfession {
    NewConfession { text: text.into(), owner_id: owner(who), created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap() }
}

async fn fill(store: &dyn ConfessionStore, n: i64) -> Vec<Confession> {
    let mut out = Vec::new();
    for i in 0..n {
        out.push(store.insert(new_at(&format!("confession number {i}"), "alice", i)).await.unwrap());
    }
    out
}

#[tokio::test]
async fn insert_sets_both_timestamps_and_trims() {
    let store = MemoryStore::new();
    let c = store.insert(new_at("   hello world  ", "alice", 0)).await.unwrap();
    assert_eq!(c.text, "hello world");
    assert_eq!(c.created_at, c.updated_at);
    assert_eq!(store.find_by_id(&c.id).await.unwrap(), Some(c));
}

#[tokio::test]
async fn schema_bounds_reject_short_and_long_text() {
    let store = MemoryStore::new();
    assert!(matches!(store.insert(new_at(" abc ", "alice", 0)).await, Err(StoreError::Validation(_))));
    assert!(matches!(store.insert(new_at(&"y".repeat(501), "alice", 0)).await, Err(StoreError::Validation(_))));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn page_is_newest_first_with_total() {
    let store = MemoryStore::new();
    let all = fill(&store, 7).await;
    let first = store.find_page(0, 3).await.unwrap();
    assert_eq!(first.total, 7);
    let ids: Vec<_> = first.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![all[6].id, all[5].id, all[4].id]);

    let tail = store.find_page(6, 3).await.unwrap();
    assert_eq!(tail.items.len(), 1);
    assert_eq!(tail.items[0].id, all[0].id);
    assert!(store.find_page(50, 3).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn equal_timestamps_break_ties_by_insertion_order() {
    let store = MemoryStore::new();
    let a = store.insert(new_at("first at same instant", "alice", 5)).await.unwrap();
    let b = store.insert(new_at("second at same instant", "bob", 5)).await.unwrap();
    for _ in 0..3 {
        let page = store.find_page(0, 10).await.unwrap();
        assert_eq!(page.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    }
}

#[tokio::test]
async fn save_rejects_owner_and_creation_changes() {
    let store = MemoryStore::new();
    let c = store.insert(new_at("original text", "alice", 0)).await.unwrap();

    let mut stolen = c.clone();
    stolen.owner_id = owner("mallory");
    assert!(matches!(store.save(&stolen).await, Err(StoreError::Validation(_))));

    let mut moved = c.clone();
    moved.created_at = c.created_at + Duration::seconds(1);
    assert!(matches!(store.save(&moved).await, Err(StoreError::Validation(_))));

    let mut edited = c.clone();
    edited.text = "edited text".into();
    edited.updated_at = c.created_at + Duration::seconds(10);
    let saved = store.save(&edited).await.unwrap();
    assert!(saved.is_edited());
    assert_eq!(store.find_by_id(&c.id).await.unwrap().unwrap().text, "edited text");
}

#[tokio::test]
async fn save_and_delete_of_missing_documents() {
    let store = MemoryStore::new();
    let c = store.insert(new_at("soon to be gone", "alice", 0)).await.unwrap();
    assert!(store.delete_by_id(&c.id).await.unwrap());
    assert!(!store.delete_by_id(&c.id).await.unwrap());
    assert!(matches!(store.save(&c).await, Err(StoreError::Missing(_))));
    assert!(store.find_page(0, 5).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn file_store_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let kept = {
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        let all = fill(&store, 4).await;
        assert!(store.delete_by_id(&all[1].id).await.unwrap());
        let mut edited = all[3].clone();
        edited.text = "rewritten on disk".into();
        edited.updated_at = edited.created_at + Duration::seconds(1);
        store.save(&edited).await.unwrap();
        all
    };
    assert!(tmp.path().join(SNAPSHOT_FILE).exists());

    let reopened = JsonFileStore::open(tmp.path()).await.unwrap();
    let page = reopened.find_page(0, 10).await.unwrap();
    assert_eq!(page.total, 3);
    let ids: Vec<_> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![kept[3].id, kept[2].id, kept[0].id]);
    assert_eq!(page.items[0].text, "rewritten on disk");
    assert!(reopened.find_by_id(&kept[1].id).await.unwrap().is_none());

    // sequence continues after reopen so new documents still sort first on ties
    let later = reopened.insert(new_at("after reopen here", "bob", 3)).await.unwrap();
    assert_eq!(reopened.find_page(0, 1).await.unwrap().items[0].id, later.id);
}

#[tokio::test]
async fn file_store_rejected_write_leaves_state_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(tmp.path()).await.unwrap();
    fill(&store, 2).await;
    let before = std::fs::read(tmp.path().join(SNAPSHOT_FILE)).unwrap();
    assert!(store.insert(new_at("nope", "alice", 9)).await.is_err());
    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(std::fs::read(tmp.path().join(SNAPSHOT_FILE)).unwrap(), before);
}

#[tokio::test]
async fn open_store_selects_backend() {
    let mem = open_store(None).await.unwrap();
    assert_eq!(mem.count().await.unwrap(), 0);
    let tmp = tempfile::tempdir().unwrap();
    let disk = open_store(Some(tmp.path())).await.unwrap();
    disk.insert(new_at("persisted entry", "carol", 0)).await.unwrap();
    assert!(tmp.path().join(SNAPSHOT_FILE).exists());
}

#[tokio::test]
async fn snapshot_rows_colliding_in_listing_order_are_corrupt() {
    let tmp = tempfile::tempdir().unwrap();
    let row = |id: &str, text: &str| {
        serde_json::json!({
            "seq": 4,
            "id": id,
            "text": text,
            "ownerId": "alice",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z",
        })
    };
    let snapshot = serde_json::json!({
        "version": 1,
        "nextSeq": 5,
        "confessions": [
            row("6f1c2a3e-7d4b-4c5a-9e8f-0a1b2c3d4e5f", "first of the pair"),
            row("0b9e8d7c-6a5f-4e3d-8c2b-1a0f9e8d7c6b", "second of the pair"),
        ],
    });
    std::fs::write(tmp.path().join(SNAPSHOT_FILE), serde_json::to_vec(&snapshot).unwrap()).unwrap();

    let err = JsonFileStore::open(tmp.path()).await.err().unwrap();
    assert!(matches!(err, StoreError::Corrupt(_)), "{err}");

    // the same rows with distinct sequence numbers load fine
    let mut snapshot = snapshot;
    snapshot["confessions"][1]["seq"] = serde_json::json!(3);
    std::fs::write(tmp.path().join(SNAPSHOT_FILE), serde_json::to_vec(&snapshot).unwrap()).unwrap();
    let store = JsonFileStore::open(tmp.path()).await.unwrap();
    assert_eq!(store.find_page(0, 10).await.unwrap().items.len(), 2);
}
