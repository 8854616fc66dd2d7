use std::fs;
use std::sync::Arc;

use memedb::votes::{LedgerError, VoteLedger};

#[tokio::test]
async fn first_increment_returns_one_then_two() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = VoteLedger::load(dir.path().join("votes.json"));
    assert_eq!(ledger.increment("cat1.jpg").await.unwrap(), 1);
    assert_eq!(ledger.increment("cat1.jpg").await.unwrap(), 2);
    assert_eq!(ledger.count("cat1.jpg").await, 2);
    assert_eq!(ledger.count("never-voted.png").await, 0);
}

#[tokio::test]
async fn empty_filename_is_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votes.json");
    let ledger = VoteLedger::load(&path);

    let err = ledger.increment("").await.unwrap_err();
    assert!(matches!(err, LedgerError::MissingInput));
    assert!(!path.exists(), "no snapshot may be written for a rejected vote");
}

#[tokio::test]
async fn increments_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votes.json");
    {
        let ledger = VoteLedger::load(&path);
        for _ in 0..5 {
            ledger.increment("a.png").await.unwrap();
        }
        ledger.increment("b.mp4").await.unwrap();
    }

    let reloaded = VoteLedger::load(&path);
    assert_eq!(reloaded.count("a.png").await, 5);
    assert_eq!(reloaded.count("b.mp4").await, 1);
}

#[tokio::test]
async fn snapshot_is_pretty_printed_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votes.json");
    let ledger = VoteLedger::load(&path);
    ledger.increment("cat.gif").await.unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains('\n'), "expected pretty-printed JSON:\n{raw}");
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, serde_json::json!({ "cat.gif": 1 }));
    assert!(!dir.path().join("votes.json.tmp").exists());
}

#[tokio::test]
async fn existing_snapshot_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votes.json");
    fs::write(&path, r#"{ "cat2.mp4": 3, "deleted-long-ago.jpg": 9 }"#).unwrap();

    let ledger = VoteLedger::load(&path);
    assert_eq!(ledger.count("cat2.mp4").await, 3);
    assert_eq!(ledger.increment("cat2.mp4").await.unwrap(), 4);

    let snapshot = ledger.snapshot().await;
    assert_eq!(snapshot.len(), 2, "stale entries are kept");
    assert_eq!(snapshot.get("deleted-long-ago.jpg"), 9);
}

#[tokio::test]
async fn corrupt_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votes.json");
    fs::write(&path, "{ this is not json").unwrap();

    let ledger = VoteLedger::load(&path);
    assert!(ledger.snapshot().await.is_empty());
    assert_eq!(ledger.increment("x.jpg").await.unwrap(), 1);

    let reloaded = VoteLedger::load(&path);
    assert_eq!(reloaded.count("x.jpg").await, 1);
}

#[tokio::test]
async fn failed_persist_keeps_in_memory_increment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-subdir").join("votes.json");
    let ledger = VoteLedger::load(&path);

    let err = ledger.increment("a.jpg").await.unwrap_err();
    assert!(matches!(err, LedgerError::Persistence { .. }));
    assert_eq!(ledger.count("a.jpg").await, 1);

    fs::create_dir(dir.path().join("missing-subdir")).unwrap();
    assert_eq!(ledger.increment("a.jpg").await.unwrap(), 2);
    assert_eq!(VoteLedger::load(&path).count("a.jpg").await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_votes_on_different_files_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("votes.json");
    let ledger = Arc::new(VoteLedger::load(&path));
    const ROUNDS: u64 = 50;

    let tasks: Vec<_> = ["left.jpg", "right.mp4"]
        .into_iter()
        .map(|name| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                for _ in 0..ROUNDS {
                    ledger.increment(name).await.unwrap();
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(ledger.count("left.jpg").await, ROUNDS);
    assert_eq!(ledger.count("right.mp4").await, ROUNDS);

    // The on-disk snapshot must carry both final counts, not just the last writer's.
    let reloaded = VoteLedger::load(&path);
    assert_eq!(reloaded.count("left.jpg").await, ROUNDS);
    assert_eq!(reloaded.count("right.mp4").await, ROUNDS);
}
