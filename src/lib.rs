// ============================================================================
// AssetStore Library
// ============================================================================
//
// Write-coalescing persistence layer for content-addressed binary assets:
// immutable byte blobs identified by a stable ID, optionally flagged
// temporary. Concurrent producers may request the same asset; only one
// physical write per ID is ever in flight, reads are served from durable
// storage, and corrupt records self-heal by deletion.

pub mod config;
pub mod core;
pub mod facade;
pub mod gate;
pub mod stats;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{AssetError, AssetRecord, Namespace, Result, is_temporary_id};
pub use config::StoreConfig;
pub use facade::AssetStore;
pub use gate::{PendingGuard, WriteGate};
pub use stats::{StatsCollector, StatsCounters, StatsSnapshot};
pub use storage::{AssetBackend, FileBackend, InMemoryBackend};
