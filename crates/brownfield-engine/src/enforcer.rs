//! Command sequencing: `assess → plan → remediate → validate → graduate → speckit`.
//!
//! Each [`WorkflowPhase`] may run only once all of its prerequisites have
//! completed. Every mark operation persists the whole state before returning.

use std::collections::BTreeMap;

use brownfield_model::{BrownfieldState, PhaseStatus, WorkflowPhase};
use brownfield_store::StateStore;
use brownfield_utils::error::{BrownfieldError, PhaseError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{info, warn};

static PREREQUISITES: Lazy<BTreeMap<WorkflowPhase, Vec<WorkflowPhase>>> = Lazy::new(|| {
    BTreeMap::from([
        (WorkflowPhase::Assessment, vec![]),
        (WorkflowPhase::Planning, vec![WorkflowPhase::Assessment]),
        (WorkflowPhase::Remediation, vec![WorkflowPhase::Planning]),
        (WorkflowPhase::Validation, vec![WorkflowPhase::Remediation]),
        (WorkflowPhase::Graduation, vec![WorkflowPhase::Validation]),
        (WorkflowPhase::SpecKitReady, vec![WorkflowPhase::Graduation]),
    ])
});

/// Phases that must be completed before `phase` may run.
#[must_use]
pub fn prerequisites(phase: WorkflowPhase) -> &'static [WorkflowPhase] {
    PREREQUISITES.get(&phase).map(Vec::as_slice).unwrap_or(&[])
}

/// Result of [`WorkflowEnforcer::can_execute_phase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionCheck {
    pub allowed: bool,
    pub reason: Option<String>,
    /// Command to run first, when a prerequisite was never started.
    pub required_command: Option<String>,
}

impl ExecutionCheck {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            required_command: None,
        }
    }

    fn blocked(reason: String, required_command: Option<&str>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            required_command: required_command.map(str::to_string),
        }
    }
}

/// Guards and records [`WorkflowPhase`] execution for one project.
#[derive(Debug)]
pub struct WorkflowEnforcer {
    store: StateStore,
    state: BrownfieldState,
}

impl WorkflowEnforcer {
    pub fn new(store: StateStore, state: BrownfieldState) -> Self {
        Self { store, state }
    }

    /// Load the persisted state from `store`.
    pub fn load(store: StateStore) -> Result<Self, BrownfieldError> {
        let state = store.load()?;
        Ok(Self::new(store, state))
    }

    #[must_use]
    pub fn state(&self) -> &BrownfieldState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> BrownfieldState {
        self.state
    }

    /// Whether `phase` may run now.
    ///
    /// Assessment is always allowed. Any other phase needs every prerequisite
    /// completed; a refusal names the first one that is not.
    #[must_use]
    pub fn can_execute_phase(&self, phase: WorkflowPhase) -> ExecutionCheck {
        if phase == WorkflowPhase::NotStarted {
            return ExecutionCheck::blocked("not_started is not an executable phase".into(), None);
        }

        let workflow = &self.state.workflow_state;
        for &required in prerequisites(phase) {
            let check = match workflow.execution(required) {
                None => ExecutionCheck::blocked(
                    format!("{required} phase has not been run"),
                    required.command_name(),
                ),
                Some(execution) => match execution.status {
                    PhaseStatus::Completed => continue,
                    PhaseStatus::NotStarted => ExecutionCheck::blocked(
                        format!("{required} phase has not been run"),
                        required.command_name(),
                    ),
                    PhaseStatus::InProgress => ExecutionCheck::blocked(
                        format!("{required} phase is still in_progress"),
                        None,
                    ),
                    PhaseStatus::Failed => ExecutionCheck::blocked(
                        format!(
                            "{required} phase failed: {}. Fix the problem and re-run '{}'",
                            execution.error_message.as_deref().unwrap_or("unknown error"),
                            required.command_name().unwrap_or("the previous step")
                        ),
                        None,
                    ),
                },
            };
            return check;
        }

        ExecutionCheck::allowed()
    }

    /// [`can_execute_phase`](Self::can_execute_phase) as an error.
    pub fn ensure_can_execute(&self, phase: WorkflowPhase) -> Result<(), BrownfieldError> {
        let check = self.can_execute_phase(phase);
        if check.allowed {
            return Ok(());
        }
        Err(PhaseError::PrerequisiteNotMet {
            phase: phase.to_string(),
            reason: check.reason.unwrap_or_default(),
            command: check.required_command,
        }
        .into())
    }

    /// Begin a new attempt of `phase` and persist.
    pub fn mark_phase_started(
        &mut self,
        phase: WorkflowPhase,
        now: DateTime<Utc>,
    ) -> Result<(), BrownfieldError> {
        let workflow = &mut self.state.workflow_state;
        workflow.execution_mut(phase).start(now);
        workflow.current_phase = phase;
        info!(phase = %phase, "Workflow phase started");
        self.persist()
    }

    /// Mark an in-progress `phase` completed and persist.
    ///
    /// Completing `spec_kit_ready` also flags the project as ready for
    /// spec-driven development.
    pub fn mark_phase_completed(
        &mut self,
        phase: WorkflowPhase,
        now: DateTime<Utc>,
    ) -> Result<(), BrownfieldError> {
        self.ensure_in_progress(phase)?;
        self.state.workflow_state.execution_mut(phase).complete(now);
        if phase == WorkflowPhase::SpecKitReady {
            self.state.speckit.ready = true;
            self.state.speckit.ready_at = Some(now);
        }
        info!(phase = %phase, "Workflow phase completed");
        self.persist()
    }

    /// Mark an in-progress `phase` failed with `message` and persist.
    pub fn mark_phase_failed(
        &mut self,
        phase: WorkflowPhase,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), BrownfieldError> {
        self.ensure_in_progress(phase)?;
        let message = message.into();
        warn!(phase = %phase, error = %message, "Workflow phase failed");
        self.state
            .workflow_state
            .execution_mut(phase)
            .fail(now, message);
        self.persist()
    }

    /// First phase in order that is not completed and may run now.
    ///
    /// `None` once `spec_kit_ready` has completed.
    #[must_use]
    pub fn next_phase(&self) -> Option<WorkflowPhase> {
        let workflow = &self.state.workflow_state;
        if workflow.status_of(WorkflowPhase::SpecKitReady) == PhaseStatus::Completed {
            return None;
        }
        WorkflowPhase::ORDER.into_iter().find(|&phase| {
            workflow.status_of(phase) != PhaseStatus::Completed
                && self.can_execute_phase(phase).allowed
        })
    }

    fn ensure_in_progress(&self, phase: WorkflowPhase) -> Result<(), PhaseError> {
        let status = self.state.workflow_state.status_of(phase);
        if status == PhaseStatus::InProgress {
            return Ok(());
        }
        Err(PhaseError::NotInProgress {
            phase: phase.to_string(),
            status: status.to_string(),
        })
    }

    fn persist(&self) -> Result<(), BrownfieldError> {
        self.store.save(&self.state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn enforcer_in(temp: &TempDir) -> WorkflowEnforcer {
        let dir = Utf8PathBuf::from_path_buf(temp.path().join(".brownfield")).unwrap();
        let store = StateStore::new(dir);
        let state = store.create("/repo", None, Utc::now()).unwrap();
        WorkflowEnforcer::new(store, state)
    }

    fn complete(enforcer: &mut WorkflowEnforcer, phase: WorkflowPhase) {
        enforcer.mark_phase_started(phase, Utc::now()).unwrap();
        enforcer.mark_phase_completed(phase, Utc::now()).unwrap();
    }

    #[test]
    fn test_assessment_always_allowed() {
        let temp = TempDir::new().unwrap();
        let enforcer = enforcer_in(&temp);

        assert!(enforcer.can_execute_phase(WorkflowPhase::Assessment).allowed);
        assert!(!enforcer.can_execute_phase(WorkflowPhase::NotStarted).allowed);
    }

    #[test]
    fn test_planning_blocked_until_assessment_completes() {
        let temp = TempDir::new().unwrap();
        let mut enforcer = enforcer_in(&temp);

        let check = enforcer.can_execute_phase(WorkflowPhase::Planning);
        assert!(!check.allowed);
        assert_eq!(check.required_command.as_deref(), Some("brownfield assess"));

        enforcer
            .mark_phase_started(WorkflowPhase::Assessment, Utc::now())
            .unwrap();
        let check = enforcer.can_execute_phase(WorkflowPhase::Planning);
        assert!(!check.allowed);
        assert!(check.reason.unwrap().contains("in_progress"));

        enforcer
            .mark_phase_completed(WorkflowPhase::Assessment, Utc::now())
            .unwrap();
        assert!(enforcer.can_execute_phase(WorkflowPhase::Planning).allowed);
    }

    #[test]
    fn test_failed_prerequisite_surfaces_message() {
        let temp = TempDir::new().unwrap();
        let mut enforcer = enforcer_in(&temp);
        enforcer
            .mark_phase_started(WorkflowPhase::Assessment, Utc::now())
            .unwrap();
        enforcer
            .mark_phase_failed(WorkflowPhase::Assessment, "scanner crashed", Utc::now())
            .unwrap();

        let err = enforcer
            .ensure_can_execute(WorkflowPhase::Planning)
            .unwrap_err();
        match err {
            BrownfieldError::Phase(PhaseError::PrerequisiteNotMet { reason, command, .. }) => {
                assert!(reason.contains("scanner crashed"));
                assert!(reason.contains("brownfield assess"));
                assert!(command.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_outcome_requires_started_phase() {
        let temp = TempDir::new().unwrap();
        let mut enforcer = enforcer_in(&temp);

        let err = enforcer
            .mark_phase_completed(WorkflowPhase::Assessment, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            BrownfieldError::Phase(PhaseError::NotInProgress { .. })
        ));
        assert!(
            enforcer
                .state()
                .workflow_state
                .execution(WorkflowPhase::Assessment)
                .is_none()
        );
        assert!(!enforcer.can_execute_phase(WorkflowPhase::Planning).allowed);

        complete(&mut enforcer, WorkflowPhase::Assessment);
        assert!(
            enforcer
                .mark_phase_failed(WorkflowPhase::Assessment, "late", Utc::now())
                .is_err()
        );
        assert_eq!(
            enforcer
                .state()
                .workflow_state
                .status_of(WorkflowPhase::Assessment),
            PhaseStatus::Completed
        );
    }

    #[test]
    fn test_marks_persist_immediately() {
        let temp = TempDir::new().unwrap();
        let mut enforcer = enforcer_in(&temp);
        enforcer
            .mark_phase_started(WorkflowPhase::Assessment, Utc::now())
            .unwrap();

        let dir = Utf8PathBuf::from_path_buf(temp.path().join(".brownfield")).unwrap();
        let reloaded = WorkflowEnforcer::load(StateStore::new(dir)).unwrap();
        let workflow = &reloaded.state().workflow_state;

        assert_eq!(workflow.current_phase, WorkflowPhase::Assessment);
        assert_eq!(
            workflow.status_of(WorkflowPhase::Assessment),
            PhaseStatus::InProgress
        );
        assert_eq!(reloaded.state(), enforcer.state());
    }

    #[test]
    fn test_retry_increments_attempts() {
        let temp = TempDir::new().unwrap();
        let mut enforcer = enforcer_in(&temp);
        enforcer
            .mark_phase_started(WorkflowPhase::Assessment, Utc::now())
            .unwrap();
        enforcer
            .mark_phase_failed(WorkflowPhase::Assessment, "boom", Utc::now())
            .unwrap();
        enforcer
            .mark_phase_started(WorkflowPhase::Assessment, Utc::now())
            .unwrap();

        let execution = enforcer
            .state()
            .workflow_state
            .execution(WorkflowPhase::Assessment)
            .unwrap();
        assert_eq!(execution.attempts, 2);
        assert_eq!(execution.status, PhaseStatus::InProgress);
        assert!(execution.error_message.is_none());
    }

    #[test]
    fn test_next_phase_walks_order() {
        let temp = TempDir::new().unwrap();
        let mut enforcer = enforcer_in(&temp);
        assert_eq!(enforcer.next_phase(), Some(WorkflowPhase::Assessment));

        for phase in WorkflowPhase::ORDER {
            assert_eq!(enforcer.next_phase(), Some(phase));
            complete(&mut enforcer, phase);
        }

        assert_eq!(enforcer.next_phase(), None);
        assert!(enforcer.state().speckit.ready);
        assert!(enforcer.state().speckit.ready_at.is_some());
    }
}
