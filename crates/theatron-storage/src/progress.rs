use std::time::Duration;

use theatron_core::ContentId;

use crate::StorageResult;

/// Per-content playback position store.
///
/// The clock's persistence loop is the only writer; continuity resolution
/// reads at attach time. Implementations are synchronous — payloads are a
/// handful of bytes.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = ProgressStoreMock)
)]
pub trait ProgressStore: Send + Sync {
    /// Last persisted position for `content`, if any.
    fn load(&self, content: &ContentId) -> StorageResult<Option<Duration>>;

    /// Persist `position` for `content`, replacing any previous value.
    fn save(&self, content: &ContentId, position: Duration) -> StorageResult<()>;

    /// Delete the persisted position, so the next attach starts from zero.
    fn remove(&self, content: &ContentId) -> StorageResult<()>;
}
