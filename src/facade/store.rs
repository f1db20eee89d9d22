use crate::config::StoreConfig;
use crate::core::{AssetError, AssetRecord, Namespace, is_temporary_id};
use crate::gate::{PendingGuard, WriteGate};
use crate::stats::{StatsCollector, StatsSnapshot};
use crate::storage::AssetBackend;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Write-coalescing coordinator over a persistent asset backend.
///
/// Concurrent producers may request the same asset; at most one physical
/// write per asset ID is in flight at any time, and competing writes for an
/// ID with a pending flush are silently dropped. Reads go straight to the
/// backend; records that fail to decode are deleted so the next read is a
/// clean miss.
///
/// Backend failures never reach callers: a failed store is silent, a failed
/// read looks like a miss. The error counter and the log are the only
/// observable traces.
///
/// # Examples
///
/// ```no_run
/// use assetstore::{AssetRecord, AssetStore, FileBackend};
/// use std::sync::Arc;
///
/// # async fn demo() -> assetstore::Result<()> {
/// let backend = FileBackend::open("/var/lib/assets").await?;
/// let store = AssetStore::new(Arc::new(backend));
///
/// let id = store.store(AssetRecord::new("", b"payload".to_vec())).await;
/// if let Some(record) = store.get(&id).await {
///     println!("{} bytes", record.data.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct AssetStore {
    backend: Arc<dyn AssetBackend>,
    gate: Arc<WriteGate>,
    stats: Arc<StatsCollector>,
    config: StoreConfig,
}

impl AssetStore {
    pub fn new(backend: Arc<dyn AssetBackend>) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    pub fn with_config(backend: Arc<dyn AssetBackend>, config: StoreConfig) -> Self {
        Self {
            backend,
            gate: Arc::new(WriteGate::new()),
            stats: Arc::new(StatsCollector::new()),
            config,
        }
    }

    /// Persist an asset, assigning a random ID when none is given.
    ///
    /// Returns the final ID immediately; the durable write runs in the
    /// background and may still be in flight when this returns.
    pub async fn store(&self, mut record: AssetRecord) -> String {
        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        }
        let id = record.id.clone();
        self.cache(record).await;
        id
    }

    /// Admit an asset for background persistence.
    ///
    /// The write is skipped when the record already exists in its namespace
    /// (unless the store is configured to overwrite) and when a flush for
    /// the same ID is already in flight. Either way the call returns
    /// immediately and without error.
    pub async fn cache(&self, record: AssetRecord) {
        self.cache_inner(record).await;
    }

    // True iff a background flush was scheduled for this call.
    async fn cache_inner(&self, record: AssetRecord) -> bool {
        let ns = self.namespace_of(&record);

        if !self.config.overwrite_existing {
            match self.backend.exists(&record.id, ns).await {
                Ok(true) => {
                    debug!(id = %record.id, "asset already stored, skipping");
                    return false;
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(id = %record.id, %err, "existence probe failed, skipping store");
                    self.stats.record_error();
                    return false;
                }
            }
        }

        let Some(guard) = self.gate.admit(&record.id) else {
            debug!(id = %record.id, "flush already pending, write coalesced");
            return false;
        };

        let backend = Arc::clone(&self.backend);
        let stats = Arc::clone(&self.stats);
        tokio::spawn(async move {
            flush(backend, stats, record, ns, guard).await;
        });
        true
    }

    /// Fetch an asset by ID.
    ///
    /// IDs carrying the temporary marker probe only the temporary namespace;
    /// all other IDs probe the permanent namespace first, then the temporary
    /// one.
    pub async fn get(&self, id: &str) -> Option<AssetRecord> {
        if self.namespace_of_id(id).is_temporary() {
            self.lookup(id, Namespace::Temporary).await
        } else {
            match self.lookup(id, Namespace::Permanent).await {
                Some(record) => Some(record),
                None => self.lookup(id, Namespace::Temporary).await,
            }
        }
    }

    /// Fetch from an explicitly chosen namespace, for callers that already
    /// know the asset's classification.
    pub async fn get_from(&self, id: &str, temporary: bool) -> Option<AssetRecord> {
        self.lookup(id, Namespace::for_temp(temporary)).await
    }

    /// Payload-only read.
    pub async fn get_data(&self, id: &str) -> Option<Vec<u8>> {
        self.get(id).await.map(|record| record.data)
    }

    /// Replace an existing asset's payload under the same ID.
    ///
    /// Requires `StoreConfig::overwrite_existing`; under the default
    /// immutable-asset policy the update is suppressed and `false` is
    /// returned. Also returns `false` when the asset is unknown or the
    /// replacement write was coalesced away.
    pub async fn update_content(&self, id: &str, data: Vec<u8>) -> bool {
        if !self.config.overwrite_existing {
            debug!(%id, "update suppressed by immutable-asset policy");
            return false;
        }

        let Some(mut record) = self.get(id).await else {
            return false;
        };
        record.data = data;
        self.cache_inner(record).await
    }

    /// Delete an asset from the namespace implied by its ID. Deleting an
    /// unknown ID is a no-op.
    pub async fn delete(&self, id: &str) {
        self.remove(id, self.namespace_of_id(id)).await;
    }

    /// Evict a record from the temporary namespace only.
    pub async fn expire(&self, id: &str) {
        self.remove(id, Namespace::Temporary).await;
    }

    /// Existence check against the namespace implied by the ID.
    pub async fn exists(&self, id: &str) -> bool {
        match self.backend.exists(id, self.namespace_of_id(id)).await {
            Ok(found) => found,
            Err(err) => {
                error!(%id, %err, "existence check failed");
                self.stats.record_error();
                false
            }
        }
    }

    /// Event counters plus live per-namespace record counts.
    pub async fn statistics(&self) -> StatsSnapshot {
        StatsSnapshot {
            counters: self.stats.counters(),
            assets: self.live_count(Namespace::Permanent).await,
            assets_temp: self.live_count(Namespace::Temporary).await,
            since: self.stats.since(),
        }
    }

    /// Zero the event counters. Live counts are unaffected.
    pub fn reset_statistics(&self) {
        self.stats.reset();
    }

    /// Number of asset IDs with a flush currently in flight.
    pub fn pending_writes(&self) -> usize {
        self.gate.pending_len()
    }

    fn namespace_of(&self, record: &AssetRecord) -> Namespace {
        Namespace::for_temp(
            record.temporary || is_temporary_id(&record.id, &self.config.temp_marker),
        )
    }

    fn namespace_of_id(&self, id: &str) -> Namespace {
        Namespace::for_temp(is_temporary_id(id, &self.config.temp_marker))
    }

    async fn lookup(&self, id: &str, ns: Namespace) -> Option<AssetRecord> {
        match self.backend.get(id, ns).await {
            Ok(record) => {
                debug!(%id, namespace = ns.partition(), "hit");
                self.stats.record_get(ns.is_temporary());
                self.touch(id, ns).await;
                Some(record)
            }
            Err(AssetError::NotFound) => None,
            Err(AssetError::Deserialization(err)) => {
                warn!(%id, %err, "corrupt record, deleting");
                self.remove(id, ns).await;
                None
            }
            Err(err) => {
                error!(%id, %err, "read failed");
                self.stats.record_error();
                None
            }
        }
    }

    // Best-effort access-time update; a failure never fails the read.
    async fn touch(&self, id: &str, ns: Namespace) {
        if let Err(err) = self.backend.touch(id, ns, Utc::now().timestamp()).await {
            warn!(%id, %err, "access-time update failed");
            self.stats.record_error();
        }
    }

    async fn remove(&self, id: &str, ns: Namespace) {
        match self.backend.delete(id, ns).await {
            Ok(()) => self.stats.record_delete(ns.is_temporary()),
            Err(err) => {
                error!(%id, %err, "delete failed");
                self.stats.record_error();
            }
        }
    }

    async fn live_count(&self, ns: Namespace) -> usize {
        match self.backend.count(ns).await {
            Ok(count) => count,
            Err(err) => {
                error!(%err, namespace = ns.partition(), "live count failed");
                self.stats.record_error();
                0
            }
        }
    }
}

/// Background flush: the one durable write admitted for an ID.
///
/// The guard releases the gate entry when this task finishes, whatever the
/// outcome, so a failed write cannot starve later writers of the same ID.
async fn flush(
    backend: Arc<dyn AssetBackend>,
    stats: Arc<StatsCollector>,
    mut record: AssetRecord,
    ns: Namespace,
    guard: PendingGuard,
) {
    let _guard = guard;

    let now = Utc::now().timestamp();
    if record.created_at == 0 {
        record.created_at = now;
    }
    record.accessed_at = now;
    record.temporary = ns.is_temporary();

    match backend.put(&record, ns).await {
        Ok(()) => {
            debug!(id = %record.id, namespace = ns.partition(), "asset stored");
            stats.record_store(ns.is_temporary());
        }
        Err(err) => {
            error!(id = %record.id, %err, "store failed");
            stats.record_error();
        }
    }
}
