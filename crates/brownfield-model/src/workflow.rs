//! Command-sequencing workflow tracked alongside the legacy [`Phase`](crate::Phase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stages of the command-driven workflow, in execution order.
///
/// Serialized snake_case (`"not_started"`, `"spec_kit_ready"`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkflowPhase {
    #[default]
    NotStarted,
    Assessment,
    Planning,
    Remediation,
    Validation,
    Graduation,
    SpecKitReady,
}

impl WorkflowPhase {
    /// Executable phases in order; `NotStarted` is only an initial marker.
    pub const ORDER: [WorkflowPhase; 6] = [
        Self::Assessment,
        Self::Planning,
        Self::Remediation,
        Self::Validation,
        Self::Graduation,
        Self::SpecKitReady,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Assessment => "assessment",
            Self::Planning => "planning",
            Self::Remediation => "remediation",
            Self::Validation => "validation",
            Self::Graduation => "graduation",
            Self::SpecKitReady => "spec_kit_ready",
        }
    }

    /// The command a user runs to execute this phase.
    #[must_use]
    pub const fn command_name(&self) -> Option<&'static str> {
        match self {
            Self::NotStarted => None,
            Self::Assessment => Some("brownfield assess"),
            Self::Planning => Some("brownfield plan"),
            Self::Remediation => Some("brownfield remediate"),
            Self::Validation => Some("brownfield validate"),
            Self::Graduation => Some("brownfield graduate"),
            Self::SpecKitReady => Some("brownfield speckit"),
        }
    }
}

impl std::fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl PhaseStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution record of one [`WorkflowPhase`].
///
/// Within one attempt the status only moves forward:
/// `NotStarted → InProgress → Completed | Failed`. Each call to
/// [`start`](Self::start) begins a new attempt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseExecution {
    pub status: PhaseStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: u32,
    pub error_message: Option<String>,
}

impl PhaseExecution {
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = PhaseStatus::InProgress;
        self.started_at = Some(now);
        self.completed_at = None;
        self.error_message = None;
        self.attempts += 1;
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = PhaseStatus::Completed;
        self.completed_at = Some(now);
        self.error_message = None;
    }

    pub fn fail(&mut self, now: DateTime<Utc>, message: impl Into<String>) {
        self.status = PhaseStatus::Failed;
        self.completed_at = Some(now);
        self.error_message = Some(message.into());
    }
}

/// Current workflow phase plus one execution record per phase that has run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    pub current_phase: WorkflowPhase,
    #[serde(default)]
    pub phase_executions: BTreeMap<WorkflowPhase, PhaseExecution>,
}

impl WorkflowState {
    #[must_use]
    pub fn execution(&self, phase: WorkflowPhase) -> Option<&PhaseExecution> {
        self.phase_executions.get(&phase)
    }

    /// Status of `phase`, `NotStarted` when it has never run.
    #[must_use]
    pub fn status_of(&self, phase: WorkflowPhase) -> PhaseStatus {
        self.execution(phase)
            .map_or(PhaseStatus::NotStarted, |execution| execution.status)
    }

    pub fn execution_mut(&mut self, phase: WorkflowPhase) -> &mut PhaseExecution {
        self.phase_executions.entry(phase).or_default()
    }
}
