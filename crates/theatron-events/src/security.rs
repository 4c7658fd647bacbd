#![forbid(unsafe_code)]

use theatron_core::SessionId;

/// Events published by the security validation run.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum SecurityEvent {
    /// A validation run started; the audit log was cleared.
    RunStarted { session: SessionId },
    /// One step executed and was appended to the audit log.
    StepRecorded {
        step: String,
        valid: bool,
        message: String,
    },
    /// A blocked-class step failed; playback must not start.
    RunBlocked { step: String, message: String },
    /// A failed-class step failed; playback pauses with a warning.
    RunFailed { step: String, message: String },
    /// All steps passed (advisory warnings may exist in the log).
    RunPassed { risk_score: u8 },
}
