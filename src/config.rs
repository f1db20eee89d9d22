/// Store configuration
///
/// Controls namespace classification and the policy for stores that target
/// an already-persisted ID.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// IDs containing this substring are routed to the temporary namespace.
    pub temp_marker: String,

    /// Whether a store for an existing ID replaces the stored record.
    ///
    /// Assets are treated as immutable content-addressed objects by default,
    /// so a store for an ID that is already persisted is a silent no-op.
    /// Turning this on makes `cache` an upsert and makes `update_content`
    /// effective.
    pub overwrite_existing: bool,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self {
            temp_marker: "j2kCache".to_string(),
            overwrite_existing: false,
        }
    }

    /// Set the temporary-namespace ID marker. An empty marker disables
    /// classification by naming convention.
    pub fn temp_marker(mut self, marker: impl Into<String>) -> Self {
        self.temp_marker = marker.into();
        self
    }

    /// Allow stores to replace records that already exist.
    pub fn overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
