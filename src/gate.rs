use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Tracks asset IDs with a flush currently in flight and decides
/// admit/reject for new write requests.
///
/// For a given ID only the first admitted writer flushes; later concurrent
/// writers are rejected and their writes dropped. This is best-effort dedup,
/// not a write queue: nothing is merged and nothing waits.
pub struct WriteGate {
    pending: Mutex<HashSet<String>>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashSet::new()),
        }
    }

    // An ID stuck in the set can never be re-admitted until restart, so a
    // poisoned lock is recovered rather than propagated.
    fn pending(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically check membership and insert if absent. Returns true iff
    /// this caller won exclusive flush rights for the ID.
    pub fn try_admit(&self, id: &str) -> bool {
        self.pending().insert(id.to_string())
    }

    /// Remove the ID unconditionally. Must be called exactly once per
    /// successful `try_admit`, on every exit path of the flush.
    pub fn release(&self, id: &str) {
        self.pending().remove(id);
    }

    /// RAII admission: the returned guard releases the ID when dropped.
    pub fn admit(self: &Arc<Self>, id: &str) -> Option<PendingGuard> {
        if self.try_admit(id) {
            Some(PendingGuard {
                gate: Arc::clone(self),
                id: id.to_string(),
            })
        } else {
            None
        }
    }

    /// Number of IDs with a flush in flight.
    pub fn pending_len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending().contains(id)
    }
}

impl Default for WriteGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases an admitted ID on drop, so the release fires on every exit path
/// of the flush that holds it, success or failure.
pub struct PendingGuard {
    gate: Arc<WriteGate>,
    id: String,
}

impl PendingGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.gate.release(&self.id);
    }
}
