//! Durable file-per-record backend.

use crate::core::{AssetError, AssetRecord, Namespace, Result};
use crate::storage::backend::AssetBackend;
use crate::storage::{decode_record, encode_record};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Stores each record as `<root>/<partition>/<hex(id)>.bin`, the file body
/// being the MessagePack encoding of the full record. IDs are hex-encoded so
/// any ID string maps onto a valid file name. Writes land in a sibling temp
/// file and are renamed into place.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open a store rooted at `root`, creating the namespace directories if
    /// they do not exist yet.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for ns in [Namespace::Permanent, Namespace::Temporary] {
            let dir = root.join(ns.partition());
            fs::create_dir_all(&dir).await.map_err(|err| {
                AssetError::Store(format!(
                    "Failed to create store directory '{}': {}",
                    dir.display(),
                    err
                ))
            })?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path of a record.
    pub fn record_path(&self, id: &str, ns: Namespace) -> PathBuf {
        self.root
            .join(ns.partition())
            .join(format!("{}.bin", hex::encode(id)))
    }

    async fn atomic_write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).await.map_err(|err| {
            AssetError::Store(format!(
                "Failed to write temp file '{}': {}",
                tmp.display(),
                err
            ))
        })?;

        fs::rename(&tmp, path).await.map_err(|err| {
            AssetError::Store(format!(
                "Failed to rename temp file '{}' -> '{}': {}",
                tmp.display(),
                path.display(),
                err
            ))
        })
    }

    async fn read_record(&self, id: &str, ns: Namespace) -> Result<AssetRecord> {
        let path = self.record_path(id, ns);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(AssetError::NotFound),
            Err(err) => {
                return Err(AssetError::Store(format!(
                    "Failed to read record '{}': {}",
                    path.display(),
                    err
                )));
            }
        };
        decode_record(id, &bytes)
    }
}

#[async_trait]
impl AssetBackend for FileBackend {
    async fn get(&self, id: &str, ns: Namespace) -> Result<AssetRecord> {
        self.read_record(id, ns).await
    }

    async fn put(&self, record: &AssetRecord, ns: Namespace) -> Result<()> {
        let bytes = encode_record(record)?;
        self.atomic_write(&self.record_path(&record.id, ns), &bytes)
            .await
    }

    async fn delete(&self, id: &str, ns: Namespace) -> Result<()> {
        match fs::remove_file(self.record_path(id, ns)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AssetError::Store(format!(
                "Failed to delete record '{}': {}",
                id, err
            ))),
        }
    }

    async fn exists(&self, id: &str, ns: Namespace) -> Result<bool> {
        match fs::metadata(self.record_path(id, ns)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(AssetError::Store(format!(
                "Failed to stat record '{}': {}",
                id, err
            ))),
        }
    }

    async fn touch(&self, id: &str, ns: Namespace, accessed_at: i64) -> Result<()> {
        let mut record = self.read_record(id, ns).await?;
        record.accessed_at = accessed_at;
        let bytes = encode_record(&record)?;
        self.atomic_write(&self.record_path(id, ns), &bytes).await
    }

    async fn count(&self, ns: Namespace) -> Result<usize> {
        let dir = self.root.join(ns.partition());
        let read_err = |err: std::io::Error| {
            AssetError::Store(format!(
                "Failed to read store directory '{}': {}",
                dir.display(),
                err
            ))
        };

        let mut entries = fs::read_dir(&dir).await.map_err(read_err)?;
        let mut count = 0;
        // Skip leftover .tmp files from interrupted writes.
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            if entry.path().extension().is_some_and(|ext| ext == "bin") {
                count += 1;
            }
        }
        Ok(count)
    }
}
