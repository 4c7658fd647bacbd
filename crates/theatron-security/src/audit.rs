use std::time::{SystemTime, UNIX_EPOCH};

use crate::{result::StepResult, step::StepKind};

/// One executed step, as recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditEntry {
    pub step: StepKind,
    pub result: StepResult,
    pub timestamp_ms: u64,
}

/// Append-only trail of one validation run.
///
/// Entry order is execution order, and timestamps are strictly monotonic
/// even when steps complete inside the same wall-clock millisecond. The
/// log is cleared when a new run starts, never edited in place.
#[derive(Clone, Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
    last_timestamp_ms: u64,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, step: StepKind, result: StepResult) -> &AuditEntry {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);

        let timestamp_ms = now_ms.max(self.last_timestamp_ms + 1);
        self.last_timestamp_ms = timestamp_ms;

        self.entries.push(AuditEntry {
            step,
            result,
            timestamp_ms,
        });
        // Just pushed.
        self.entries.last().expect("entry just appended")
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
