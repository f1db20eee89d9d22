/// Write-coalescing tests
///
/// Concurrent stores for one ID must admit exactly one background flush,
/// and the pending set must drain once flushes settle.
/// Run with: cargo test --test coalescing_tests
use assetstore::{AssetBackend, AssetError, AssetRecord, AssetStore, InMemoryBackend, Namespace, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Backend that parks every write until a permit is released, so tests can
/// hold a flush open and observe the gate.
struct GatedBackend {
    inner: InMemoryBackend,
    permits: Semaphore,
    puts_started: AtomicUsize,
}

impl GatedBackend {
    fn new() -> Self {
        Self {
            inner: InMemoryBackend::new(),
            permits: Semaphore::new(0),
            puts_started: AtomicUsize::new(0),
        }
    }

    fn release_puts(&self, n: usize) {
        self.permits.add_permits(n);
    }

    fn puts_started(&self) -> usize {
        self.puts_started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetBackend for GatedBackend {
    async fn get(&self, id: &str, ns: Namespace) -> Result<AssetRecord> {
        self.inner.get(id, ns).await
    }

    async fn put(&self, record: &AssetRecord, ns: Namespace) -> Result<()> {
        self.puts_started.fetch_add(1, Ordering::SeqCst);
        let permit = self.permits.acquire().await.expect("semaphore closed");
        permit.forget();
        self.inner.put(record, ns).await
    }

    async fn delete(&self, id: &str, ns: Namespace) -> Result<()> {
        self.inner.delete(id, ns).await
    }

    async fn exists(&self, id: &str, ns: Namespace) -> Result<bool> {
        self.inner.exists(id, ns).await
    }

    async fn touch(&self, id: &str, ns: Namespace, accessed_at: i64) -> Result<()> {
        self.inner.touch(id, ns, accessed_at).await
    }

    async fn count(&self, ns: Namespace) -> Result<usize> {
        self.inner.count(ns).await
    }
}

/// Backend whose writes fail on demand.
struct FlakyBackend {
    inner: InMemoryBackend,
    fail_puts: AtomicBool,
}

impl FlakyBackend {
    fn new() -> Self {
        Self {
            inner: InMemoryBackend::new(),
            fail_puts: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AssetBackend for FlakyBackend {
    async fn get(&self, id: &str, ns: Namespace) -> Result<AssetRecord> {
        self.inner.get(id, ns).await
    }

    async fn put(&self, record: &AssetRecord, ns: Namespace) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(AssetError::Store("injected write failure".to_string()));
        }
        self.inner.put(record, ns).await
    }

    async fn delete(&self, id: &str, ns: Namespace) -> Result<()> {
        self.inner.delete(id, ns).await
    }

    async fn exists(&self, id: &str, ns: Namespace) -> Result<bool> {
        self.inner.exists(id, ns).await
    }

    async fn touch(&self, id: &str, ns: Namespace, accessed_at: i64) -> Result<()> {
        self.inner.touch(id, ns, accessed_at).await
    }

    async fn count(&self, ns: Namespace) -> Result<usize> {
        self.inner.count(ns).await
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_concurrent_stores_admit_single_flush() {
    let backend = Arc::new(GatedBackend::new());
    let store = Arc::new(AssetStore::new(backend.clone()));

    let mut handles = vec![];
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.store(AssetRecord::new("a1", vec![1, 2, 3])).await
        }));
    }
    for handle in handles {
        // Every caller returns promptly even though the flush is parked.
        assert_eq!(handle.await.unwrap(), "a1");
    }

    wait_until(|| backend.puts_started() == 1).await;
    assert_eq!(store.pending_writes(), 1);

    backend.release_puts(1);
    wait_until(|| store.pending_writes() == 0).await;

    // Exactly one write reached the backend; the rest were coalesced.
    assert_eq!(backend.puts_started(), 1);
    assert!(store.exists("a1").await);
    assert_eq!(store.statistics().await.counters.stores, 1);
}

#[tokio::test]
async fn test_store_while_flush_pending_is_dropped() {
    let backend = Arc::new(GatedBackend::new());
    let store = AssetStore::new(backend.clone());

    store.store(AssetRecord::new("a1", vec![1, 2, 3])).await;
    wait_until(|| backend.puts_started() == 1).await;

    // A second store for the same ID while the flush is parked is dropped,
    // not queued.
    store.store(AssetRecord::new("a1", vec![9, 9, 9])).await;
    assert_eq!(store.pending_writes(), 1);

    backend.release_puts(1);
    wait_until(|| store.pending_writes() == 0).await;

    assert_eq!(backend.puts_started(), 1);
    assert_eq!(store.get("a1").await.unwrap().data, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_distinct_ids_flush_independently() {
    let backend = Arc::new(GatedBackend::new());
    let store = AssetStore::new(backend.clone());

    store.store(AssetRecord::new("b1", vec![1])).await;
    store.store(AssetRecord::new("b2", vec![2])).await;

    // No cross-ID coalescing: both flushes are in flight at once.
    wait_until(|| backend.puts_started() == 2).await;
    assert_eq!(store.pending_writes(), 2);

    backend.release_puts(2);
    wait_until(|| store.pending_writes() == 0).await;

    assert!(store.exists("b1").await);
    assert!(store.exists("b2").await);
}

#[tokio::test]
async fn test_failed_flush_releases_gate() {
    let backend = Arc::new(FlakyBackend::new());
    let store = AssetStore::new(backend.clone());

    backend.fail_puts.store(true, Ordering::SeqCst);
    store.store(AssetRecord::new("a1", vec![1])).await;
    wait_until(|| store.pending_writes() == 0).await;

    assert!(!store.exists("a1").await);
    assert_eq!(store.statistics().await.counters.errors, 1);
    assert_eq!(store.statistics().await.counters.stores, 0);

    // The ID must be admissible again after the failed attempt.
    backend.fail_puts.store(false, Ordering::SeqCst);
    store.store(AssetRecord::new("a1", vec![1])).await;
    wait_until(|| store.pending_writes() == 0).await;
    assert!(store.exists("a1").await);
}
