use brownfield_gate::GateValidationResult;
use brownfield_model::{BrownfieldState, Phase, timestamps};
use brownfield_utils::error::BrownfieldError;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::phase_machine::advance_with_validation;
use crate::reentry::resolve_reentry_events;

/// Stamp `all_gates_passed` when every gate passed; drop a stale stamp otherwise.
pub fn record_gate_outcome(
    state: &mut BrownfieldState,
    result: &GateValidationResult,
    now: DateTime<Utc>,
) {
    if result.all_passed {
        state.stamp(timestamps::ALL_GATES_PASSED, now);
    } else {
        state.phase_timestamps.remove(timestamps::ALL_GATES_PASSED);
    }
}

/// Move a validated project to `Graduated`.
///
/// Captures the current metrics as the regression baseline and resolves any
/// open re-entry events.
pub fn graduate(state: &mut BrownfieldState, now: DateTime<Utc>) -> Result<(), BrownfieldError> {
    advance_with_validation(state, Phase::Graduated, now)?;

    state.graduated = true;
    state.graduation_timestamp = Some(now);
    state.graduation_metrics = state.current_metrics.clone();
    state.stamp(timestamps::GRADUATED, now);
    let resolved = resolve_reentry_events(state, now);

    info!(
        project = %state.project_root,
        resolved_reentries = resolved,
        "Project graduated"
    );
    Ok(())
}
