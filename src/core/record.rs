use serde::{Deserialize, Serialize};

/// One of the two fixed storage partitions an asset belongs to for its
/// whole lifetime. Records never migrate between namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Permanent,
    Temporary,
}

impl Namespace {
    pub fn for_temp(temporary: bool) -> Self {
        if temporary {
            Self::Temporary
        } else {
            Self::Permanent
        }
    }

    pub fn is_temporary(self) -> bool {
        matches!(self, Self::Temporary)
    }

    /// Physical partition name used by backends.
    pub fn partition(self) -> &'static str {
        match self {
            Self::Permanent => "assetcache",
            Self::Temporary => "tmpcache",
        }
    }
}

/// An immutable binary object identified by a stable ID.
///
/// The payload is opaque to the store; updates are whole-object replacement,
/// never a patch. `created_at` is stamped once on the first durable write,
/// `accessed_at` on every successful read (both epoch seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub data: Vec<u8>,
    pub temporary: bool,
    pub created_at: i64,
    pub accessed_at: i64,
}

impl AssetRecord {
    /// Create a record with an explicit ID. Pass an empty ID to have the
    /// store assign a random one.
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data,
            temporary: false,
            created_at: 0,
            accessed_at: 0,
        }
    }

    /// Flag the record for the temporary namespace.
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }
}

/// Whether an ID belongs to the temporary namespace by naming convention.
pub fn is_temporary_id(id: &str, marker: &str) -> bool {
    !marker.is_empty() && id.contains(marker)
}
