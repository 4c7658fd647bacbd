use serde::{Deserialize, Serialize};

/// Kind of one validation step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum StepKind {
    InitialScan,
    UserValidation,
    DeviceGeoValidation,
    GeoRestricted,
    KidContent,
    /// Server-defined step this client version does not know.
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepKind::InitialScan => "initial_scan",
            StepKind::UserValidation => "user_validation",
            StepKind::DeviceGeoValidation => "device_geo_validation",
            StepKind::GeoRestricted => "geo_restricted",
            StepKind::KidContent => "kid_content",
            StepKind::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// What a failing result on this step does to the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Terminates the run in `Blocked`; playback must not start.
    Blocking,
    /// Terminates the run in `Failed`; playback pauses with a warning.
    Failing,
    /// Recorded in the audit log; the run continues.
    Advisory,
}

/// One step of the validation sequence: what to check and how hard its
/// failure hits.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationStep {
    pub kind: StepKind,
    pub severity: Severity,
}

impl ValidationStep {
    pub fn new(kind: StepKind, severity: Severity) -> Self {
        Self { kind, severity }
    }

    /// The production sequence. Order matters: device context is
    /// established before the geo checks that depend on it.
    #[must_use]
    pub fn default_sequence() -> Vec<ValidationStep> {
        vec![
            ValidationStep::new(StepKind::InitialScan, Severity::Advisory),
            ValidationStep::new(StepKind::UserValidation, Severity::Failing),
            ValidationStep::new(StepKind::DeviceGeoValidation, Severity::Failing),
            ValidationStep::new(StepKind::GeoRestricted, Severity::Blocking),
            ValidationStep::new(StepKind::KidContent, Severity::Blocking),
        ]
    }
}
