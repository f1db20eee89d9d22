use crate::core::{AssetError, AssetRecord, Namespace, Result};
use crate::storage::backend::AssetBackend;
use crate::storage::{decode_record, encode_record};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Ephemeral backend holding encoded records in memory.
///
/// Keeps the same MessagePack bytes a `FileBackend` would write, so corrupt
/// records are representable (see [`InMemoryBackend::put_raw`]). Useful for
/// tests and for deployments that do not need durability.
pub struct InMemoryBackend {
    permanent: Mutex<HashMap<String, Vec<u8>>>,
    temporary: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            permanent: Mutex::new(HashMap::new()),
            temporary: Mutex::new(HashMap::new()),
        }
    }

    fn partition(&self, ns: Namespace) -> &Mutex<HashMap<String, Vec<u8>>> {
        match ns {
            Namespace::Permanent => &self.permanent,
            Namespace::Temporary => &self.temporary,
        }
    }

    /// Insert raw bytes, bypassing the record codec. Lets tests plant
    /// records that fail to decode.
    pub fn put_raw(&self, id: &str, ns: Namespace, bytes: Vec<u8>) -> Result<()> {
        self.partition(ns).lock()?.insert(id.to_string(), bytes);
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetBackend for InMemoryBackend {
    async fn get(&self, id: &str, ns: Namespace) -> Result<AssetRecord> {
        let bytes = self
            .partition(ns)
            .lock()?
            .get(id)
            .cloned()
            .ok_or(AssetError::NotFound)?;
        decode_record(id, &bytes)
    }

    async fn put(&self, record: &AssetRecord, ns: Namespace) -> Result<()> {
        let bytes = encode_record(record)?;
        self.partition(ns).lock()?.insert(record.id.clone(), bytes);
        Ok(())
    }

    async fn delete(&self, id: &str, ns: Namespace) -> Result<()> {
        self.partition(ns).lock()?.remove(id);
        Ok(())
    }

    async fn exists(&self, id: &str, ns: Namespace) -> Result<bool> {
        Ok(self.partition(ns).lock()?.contains_key(id))
    }

    async fn touch(&self, id: &str, ns: Namespace, accessed_at: i64) -> Result<()> {
        let mut partition = self.partition(ns).lock()?;
        let bytes = partition.get(id).cloned().ok_or(AssetError::NotFound)?;
        let mut record = decode_record(id, &bytes)?;
        record.accessed_at = accessed_at;
        partition.insert(id.to_string(), encode_record(&record)?);
        Ok(())
    }

    async fn count(&self, ns: Namespace) -> Result<usize> {
        Ok(self.partition(ns).lock()?.len())
    }
}
