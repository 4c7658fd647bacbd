//! Crash-safe file-backed position store.
//!
//! Each content gets one file named after its storage key, holding the
//! position as a stringified float of seconds. Writes go through the
//! write-temp → rename pattern (via the `tempfile` crate) so a crash leaves
//! either the old position or the new one, never a torn file.

use std::{fs, path::PathBuf, time::Duration};

use theatron_core::{progress_key, ContentId};
use tracing::debug;

use crate::{progress::ProgressStore, StorageError, StorageResult};

pub struct FileProgressStore {
    dir: PathBuf,
}

impl FileProgressStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, content: &ContentId) -> PathBuf {
        self.dir.join(progress_key(content))
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&self, content: &ContentId) -> StorageResult<Option<Duration>> {
        let path = self.path_for(content);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let secs: f64 = text
            .trim()
            .parse()
            .map_err(|_| StorageError::Corrupt(text.trim().to_string()))?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(StorageError::Corrupt(text.trim().to_string()));
        }
        Ok(Some(Duration::from_secs_f64(secs)))
    }

    fn save(&self, content: &ContentId, position: Duration) -> StorageResult<()> {
        let path = self.path_for(content);
        let payload = format!("{}", position.as_secs_f64());

        // Temp file in the same directory, so the rename stays on one
        // filesystem and POSIX guarantees atomicity.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| StorageError::Io(format!("tempfile: {e}")))?;
        std::io::Write::write_all(&mut tmp, payload.as_bytes())
            .map_err(|e| StorageError::Io(format!("write: {e}")))?;
        tmp.persist(&path)
            .map_err(|e| StorageError::Io(format!("rename: {e}")))?;

        debug!(content = %content, secs = payload, "persisted playback position");
        Ok(())
    }

    fn remove(&self, content: &ContentId) -> StorageResult<()> {
        let path = self.path_for(content);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
