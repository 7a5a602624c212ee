use std::sync::{Arc, Mutex, MutexGuard};

use super::r#trait::StoreError;

/// Process-wide writer lock for one shop.
///
/// Every mutating service operation holds the gate across its whole
/// read-modify-commit sequence, so two writers never interleave. Clones share
/// the same lock. The lock is not reentrant.
#[derive(Debug, Clone, Default)]
pub struct WriteGate {
    inner: Arc<Mutex<()>>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("write gate poisoned".to_string()))
    }
}
