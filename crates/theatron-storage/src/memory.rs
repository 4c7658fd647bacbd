use std::{collections::HashMap, time::Duration};

use parking_lot::Mutex;
use theatron_core::{progress_key, ContentId};

use crate::{progress::ProgressStore, StorageResult};

/// In-memory twin of [`FileProgressStore`](crate::FileProgressStore) for
/// tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    inner: Mutex<HashMap<String, f64>>,
}

impl MemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored positions.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, content: &ContentId) -> StorageResult<Option<Duration>> {
        let map = self.inner.lock();
        Ok(map
            .get(&progress_key(content))
            .map(|secs| Duration::from_secs_f64(*secs)))
    }

    fn save(&self, content: &ContentId, position: Duration) -> StorageResult<()> {
        self.inner
            .lock()
            .insert(progress_key(content), position.as_secs_f64());
        Ok(())
    }

    fn remove(&self, content: &ContentId) -> StorageResult<()> {
        self.inner.lock().remove(&progress_key(content));
        Ok(())
    }
}
