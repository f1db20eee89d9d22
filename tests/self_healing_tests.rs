/// Self-healing read tests
///
/// A record that fails to decode is deleted on read, so the next read is a
/// clean miss instead of a repeated failure.
/// Run with: cargo test --test self_healing_tests
use assetstore::{AssetBackend, AssetRecord, AssetStore, FileBackend, InMemoryBackend, Namespace};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

async fn wait_settled(store: &AssetStore) {
    for _ in 0..500 {
        if store.pending_writes() == 0 {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("background flushes did not settle");
}

#[tokio::test]
async fn test_corrupt_file_record_is_deleted_on_read() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(FileBackend::open(dir.path()).await.unwrap());
    let store = AssetStore::new(backend.clone());

    store.store(AssetRecord::new("sh1", vec![1, 2, 3])).await;
    wait_settled(&store).await;

    // Scramble the stored bytes underneath the coordinator.
    let path = backend.record_path("sh1", Namespace::Permanent);
    std::fs::write(&path, b"scrambled").unwrap();

    assert!(store.get("sh1").await.is_none());
    assert!(!store.exists("sh1").await);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_corrupt_memory_record_is_deleted_on_read() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = AssetStore::new(backend.clone());

    backend
        .put_raw("bad", Namespace::Permanent, b"junk".to_vec())
        .unwrap();

    assert!(store.get("bad").await.is_none());
    assert!(!backend.exists("bad", Namespace::Permanent).await.unwrap());

    // The self-heal is counted as a delete, not an error.
    let stats = store.statistics().await;
    assert_eq!(stats.counters.deletes, 1);
    assert_eq!(stats.counters.errors, 0);
    assert_eq!(stats.counters.gets, 0);
}

#[tokio::test]
async fn test_corrupt_temporary_record_heals_in_place() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = AssetStore::new(backend.clone());

    backend
        .put_raw("j2kCache-bad", Namespace::Temporary, vec![0xc1, 0xc1])
        .unwrap();

    assert!(store.get("j2kCache-bad").await.is_none());
    assert!(
        !backend
            .exists("j2kCache-bad", Namespace::Temporary)
            .await
            .unwrap()
    );
    assert_eq!(store.statistics().await.counters.deletes_temp, 1);
}

#[tokio::test]
async fn test_reread_after_heal_is_a_clean_miss() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = AssetStore::new(backend.clone());

    backend
        .put_raw("bad", Namespace::Permanent, b"junk".to_vec())
        .unwrap();

    assert!(store.get("bad").await.is_none());
    assert!(store.get("bad").await.is_none());

    // Only the first read had anything to heal.
    assert_eq!(store.statistics().await.counters.deletes, 1);
}

#[tokio::test]
async fn test_healed_id_can_be_stored_again() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = AssetStore::new(backend.clone());

    backend
        .put_raw("sh2", Namespace::Permanent, b"junk".to_vec())
        .unwrap();
    assert!(store.get("sh2").await.is_none());

    store.store(AssetRecord::new("sh2", vec![7, 7])).await;
    wait_settled(&store).await;

    assert_eq!(store.get_data("sh2").await, Some(vec![7, 7]));
}
