use crate::core::{AssetRecord, Namespace, Result};
use async_trait::async_trait;

/// Persistent store contract - allows pluggable storage backends.
///
/// Backends serialize their own internal access; callers acquire nothing
/// across calls. Namespaces are the two fixed partitions of [`Namespace`].
#[async_trait]
pub trait AssetBackend: Send + Sync + 'static {
    /// Fetch a record. Fails with `AssetError::NotFound` on a miss and with
    /// `AssetError::Deserialization` on a corrupt record, so callers can
    /// self-heal only on the latter.
    async fn get(&self, id: &str, ns: Namespace) -> Result<AssetRecord>;

    /// Write a record, replacing any existing one with the same ID.
    async fn put(&self, record: &AssetRecord, ns: Namespace) -> Result<()>;

    /// Remove a record. Deleting an absent ID is not an error.
    async fn delete(&self, id: &str, ns: Namespace) -> Result<()>;

    async fn exists(&self, id: &str, ns: Namespace) -> Result<bool>;

    /// Update only the record's access time.
    async fn touch(&self, id: &str, ns: Namespace, accessed_at: i64) -> Result<()>;

    /// Live record count for a namespace, queried fresh per call.
    async fn count(&self, ns: Namespace) -> Result<usize>;
}
