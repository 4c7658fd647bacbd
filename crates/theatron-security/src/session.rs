use theatron_events::{EventBus, SecurityEvent};
use tracing::{debug, warn};

use crate::{
    audit::AuditLog,
    error::SecurityError,
    result::{StepDetails, StepResult},
    risk::RiskScore,
    runner::{CheckRunner, RunContext},
    step::{Severity, StepKind, ValidationStep},
    SecurityResult,
};

/// Lifecycle of one validation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Passed,
    Failed,
    Blocked,
}

impl RunState {
    /// Terminal once the run left `Running`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Passed | RunState::Failed | RunState::Blocked)
    }

    /// Whether playback may proceed under this outcome.
    #[must_use]
    pub fn allows_playback(&self) -> bool {
        matches!(self, RunState::Passed | RunState::Failed)
    }
}

#[derive(Clone, Debug)]
pub struct SecurityOptions {
    pub steps: Vec<ValidationStep>,
}

impl Default for SecurityOptions {
    fn default() -> Self {
        Self {
            steps: ValidationStep::default_sequence(),
        }
    }
}

/// Drives the validation sequence for one watch session.
///
/// Steps execute strictly in order, never concurrently — later checks may
/// depend on server-side context established by earlier ones. Every
/// executed step lands in the audit log; a run is terminal once the state
/// leaves `Running`, and re-running clears the log and starts over.
pub struct SecuritySession<R: CheckRunner> {
    runner: R,
    opts: SecurityOptions,
    bus: EventBus,
    state: RunState,
    audit: AuditLog,
    risk: RiskScore,
}

impl<R: CheckRunner> SecuritySession<R> {
    pub fn new(runner: R, opts: SecurityOptions, bus: EventBus) -> Self {
        Self {
            runner,
            opts,
            bus,
            state: RunState::Idle,
            audit: AuditLog::new(),
            risk: RiskScore::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Risk banding input gathered from the run, display-only.
    #[must_use]
    pub fn risk_score(&self) -> RiskScore {
        self.risk
    }

    /// Execute the full sequence and return the terminal state.
    ///
    /// A transport failure on a step is recorded as a failed-class
    /// outcome — never silently ignored and never a crash.
    pub async fn run(&mut self, ctx: &RunContext) -> SecurityResult<RunState> {
        if self.state == RunState::Running {
            return Err(SecurityError::AlreadyRunning);
        }

        self.audit.clear();
        self.risk = RiskScore::default();
        self.state = RunState::Running;
        self.bus.publish(SecurityEvent::RunStarted {
            session: ctx.session_id,
        });

        let steps = self.opts.steps.clone();
        for step in &steps {
            let (result, transport_failed) = match self.runner.execute(step.kind.clone(), ctx).await
            {
                Ok(result) => (result, false),
                Err(e) => {
                    warn!(step = %step.kind, error = %e, "validation transport failure");
                    let rejected = StepResult::rejected(
                        format!("validation unavailable: {e}"),
                        StepDetails::None,
                    );
                    (rejected, true)
                }
            };

            self.observe_risk(&result);
            self.record(&step.kind, &result);

            if result.valid {
                continue;
            }

            // An unreachable validator is a failed-class outcome for any
            // step, advisory ones included. It never escalates to Blocked.
            let severity = if transport_failed {
                Severity::Failing
            } else {
                step.severity
            };

            match severity {
                Severity::Advisory => {
                    debug!(step = %step.kind, "advisory step failed, continuing");
                }
                Severity::Failing => {
                    self.state = RunState::Failed;
                    self.bus.publish(SecurityEvent::RunFailed {
                        step: step.kind.to_string(),
                        message: result.message,
                    });
                    return Ok(self.state);
                }
                Severity::Blocking => {
                    self.state = RunState::Blocked;
                    self.bus.publish(SecurityEvent::RunBlocked {
                        step: step.kind.to_string(),
                        message: result.message,
                    });
                    return Ok(self.state);
                }
            }
        }

        self.state = RunState::Passed;
        self.bus.publish(SecurityEvent::RunPassed {
            risk_score: self.risk.overall(),
        });
        Ok(self.state)
    }

    fn record(&mut self, kind: &StepKind, result: &StepResult) {
        self.audit.append(kind.clone(), result.clone());
        self.bus.publish(SecurityEvent::StepRecorded {
            step: kind.to_string(),
            valid: result.valid,
            message: result.message.clone(),
        });
    }

    fn observe_risk(&mut self, result: &StepResult) {
        if let StepDetails::Fraud {
            ip_reputation,
            behavior,
            ..
        } = &result.details
        {
            self.risk = RiskScore::new(*ip_reputation, *behavior);
        }
    }

}
