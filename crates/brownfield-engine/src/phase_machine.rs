//! Remediation phase transitions.

use brownfield_model::{BrownfieldState, Phase, timestamps};
use brownfield_utils::error::{BrownfieldError, PhaseError};
use brownfield_utils::logging::log_transition;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Minimum current coverage for entering the quality phase.
pub const QUALITY_ENTRY_COVERAGE: f64 = 0.60;

const EPSILON: f64 = 1e-9;

/// Result of [`can_advance_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionCheck {
    pub allowed: bool,
    pub reason: Option<String>,
    /// Every precondition that does not hold, in declaration order.
    pub unmet: Vec<String>,
}

impl TransitionCheck {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            unmet: Vec::new(),
        }
    }
}

/// Phases reachable from `from` in one step.
///
/// A graduated project may re-enter structure, testing or quality, but never
/// assessment or validation.
#[must_use]
pub const fn allowed_transitions(from: Phase) -> &'static [Phase] {
    match from {
        Phase::Assessment => &[Phase::Structure],
        Phase::Structure => &[Phase::Testing],
        Phase::Testing => &[Phase::Quality],
        Phase::Quality => &[Phase::Validation],
        Phase::Validation => &[Phase::Graduated],
        Phase::Graduated => &[Phase::Structure, Phase::Testing, Phase::Quality],
    }
}

/// Preconditions for entering `target` that `state` does not satisfy.
fn unmet_preconditions(state: &BrownfieldState, target: Phase) -> Vec<String> {
    let mut unmet = Vec::new();
    let require_complete = |phase: Phase, unmet: &mut Vec<String>| {
        if !state.is_phase_complete(phase) {
            unmet.push(format!("{phase} phase complete"));
        }
    };

    match target {
        Phase::Assessment => {}
        Phase::Structure => {
            if state.baseline_metrics.is_none() {
                unmet.push("baseline metrics recorded".to_string());
            }
        }
        Phase::Testing => require_complete(Phase::Structure, &mut unmet),
        Phase::Quality => {
            require_complete(Phase::Testing, &mut unmet);
            let coverage = state
                .current_metrics
                .as_ref()
                .map_or(0.0, |m| m.test_coverage);
            if coverage + EPSILON < QUALITY_ENTRY_COVERAGE {
                unmet.push(format!(
                    "test coverage >= {:.0}% (currently {:.1}%)",
                    QUALITY_ENTRY_COVERAGE * 100.0,
                    coverage * 100.0
                ));
            }
        }
        Phase::Validation => require_complete(Phase::Quality, &mut unmet),
        Phase::Graduated => {
            if !state.has_timestamp(timestamps::ALL_GATES_PASSED) {
                unmet.push("all readiness gates passed".to_string());
            }
        }
    }
    unmet
}

/// Whether `state` may move to `target`.
///
/// Non-adjacent targets are refused outright. Re-entry from `Graduated` is
/// always allowed. Otherwise every precondition of `target` must hold, and a
/// refusal names all of the unmet ones.
#[must_use]
pub fn can_advance_to(state: &BrownfieldState, target: Phase) -> TransitionCheck {
    let from = state.current_phase;
    if !allowed_transitions(from).contains(&target) {
        return TransitionCheck {
            allowed: false,
            reason: Some(format!("Cannot transition from {from} to {target}")),
            unmet: Vec::new(),
        };
    }

    if from == Phase::Graduated {
        return TransitionCheck::allowed();
    }

    let unmet = unmet_preconditions(state, target);
    debug!(from = %from, to = %target, unmet = unmet.len(), "Evaluated transition preconditions");
    if unmet.is_empty() {
        return TransitionCheck::allowed();
    }

    TransitionCheck {
        allowed: false,
        reason: Some(format!(
            "Cannot enter {target}: unmet preconditions: {}",
            unmet.join("; ")
        )),
        unmet,
    }
}

/// Record that the current phase's work is done. Keeps an earlier stamp.
pub fn mark_phase_complete(state: &mut BrownfieldState, now: DateTime<Utc>) {
    let key = timestamps::complete(state.current_phase);
    if !state.has_timestamp(&key) {
        state.stamp(key, now);
    }
}

/// Move to `target` after checking [`can_advance_to`].
///
/// Stamps `<from>_complete` (unless already recorded) and `<target>_started`.
pub fn advance_with_validation(
    state: &mut BrownfieldState,
    target: Phase,
    now: DateTime<Utc>,
) -> Result<(), BrownfieldError> {
    let check = can_advance_to(state, target);
    if !check.allowed {
        let from = state.current_phase.to_string();
        let error = if check.unmet.is_empty() {
            PhaseError::InvalidTransition {
                from,
                to: target.to_string(),
            }
        } else {
            PhaseError::PreconditionsUnmet {
                phase: target.to_string(),
                unmet: check.unmet,
            }
        };
        return Err(error.into());
    }

    mark_phase_complete(state, now);
    advance(state, target, now);
    Ok(())
}

/// Move to `target` without any checks, stamping `<target>_started`.
///
/// For callers that validated externally, such as regression re-entry.
pub fn advance(state: &mut BrownfieldState, target: Phase, now: DateTime<Utc>) {
    let from = state.current_phase;
    state.current_phase = target;
    state.stamp(timestamps::started(target), now);
    log_transition(state.project_root.as_str(), from.as_str(), target.as_str());
}
