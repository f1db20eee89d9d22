pub mod backend;
pub mod file;
pub mod memory;

pub use backend::AssetBackend;
pub use file::FileBackend;
pub use memory::InMemoryBackend;

use crate::core::{AssetError, AssetRecord, Result};

// Shared record codec: every backend stores the same MessagePack bytes, so
// records written through one backend decode through any other.

pub(crate) fn encode_record(record: &AssetRecord) -> Result<Vec<u8>> {
    rmp_serde::to_vec(record)
        .map_err(|err| AssetError::Store(format!("Failed to encode record '{}': {}", record.id, err)))
}

pub(crate) fn decode_record(id: &str, bytes: &[u8]) -> Result<AssetRecord> {
    rmp_serde::from_slice(bytes)
        .map_err(|err| AssetError::Deserialization(format!("Record '{}': {}", id, err)))
}
