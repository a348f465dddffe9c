use brownfield_config::Config;
use brownfield_model::{GateKind, Phase, ReadinessGate};
use brownfield_utils::error::{BrownfieldError, GateError};
use camino::Utf8Path;
use serde::Serialize;
use tracing::{debug, info};

use crate::guidance::remediation_guidance;
use crate::justification::ComplexityJustifications;

/// A failed gate with the advice for fixing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedGate {
    pub gate: ReadinessGate,
    pub guidance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateValidationResult {
    pub all_passed: bool,
    pub passed: Vec<ReadinessGate>,
    pub failed: Vec<FailedGate>,
    /// Names of gates that passed only because no evaluator exists.
    pub not_implemented: Vec<String>,
    pub recommended_phase: Option<Phase>,
}

impl GateValidationResult {
    /// Fail with the first failed gate, if any.
    pub fn ensure_passed(&self) -> Result<(), BrownfieldError> {
        match self.failed.first() {
            None => Ok(()),
            Some(failed) => Err(GateError::Failed {
                gate: failed.gate.name.clone(),
                current_value: failed.gate.current_value,
                threshold: failed.gate.threshold,
                guidance: failed.guidance.clone(),
            }
            .into()),
        }
    }
}

/// Aggregates pre-evaluated gates.
#[derive(Debug, Clone, Default)]
pub struct GateValidator {
    justifications: ComplexityJustifications,
}

impl GateValidator {
    #[must_use]
    pub fn new(justifications: ComplexityJustifications) -> Self {
        Self { justifications }
    }

    /// Validator using the justification artifact configured for `state_dir`.
    pub fn from_config(config: &Config, state_dir: &Utf8Path) -> Result<Self, BrownfieldError> {
        let path = state_dir.join(&config.gates.justification_file);
        ComplexityJustifications::load(&path).map(Self::new)
    }

    pub fn validate_all_gates(&self, gates: &[ReadinessGate]) -> GateValidationResult {
        let mut passed = Vec::new();
        let mut failed = Vec::new();
        let mut not_implemented = Vec::new();

        for gate in gates {
            let gate = self.apply_justification(gate);
            if !gate.is_implemented() {
                not_implemented.push(gate.name.clone());
            }
            if gate.passed {
                passed.push(gate);
            } else {
                debug!(gate = %gate.name, current = gate.current_value, threshold = gate.threshold, "Gate failed");
                let guidance = remediation_guidance(&gate);
                failed.push(FailedGate { gate, guidance });
            }
        }

        let mut result = GateValidationResult {
            all_passed: failed.is_empty(),
            passed,
            failed,
            not_implemented,
            recommended_phase: None,
        };
        result.recommended_phase = recommend_next_phase(&result);

        info!(
            passed = result.passed.len(),
            failed = result.failed.len(),
            recommended = ?result.recommended_phase,
            "Validated readiness gates"
        );
        result
    }

    /// A failed complexity gate whose every violation is justified passes,
    /// carrying the justifications as a note.
    fn apply_justification(&self, gate: &ReadinessGate) -> ReadinessGate {
        let mut gate = gate.clone();
        if gate.passed || gate.kind() != Some(GateKind::Complexity) || gate.exceptions.is_empty() {
            return gate;
        }

        let reasons: Option<Vec<String>> = gate
            .exceptions
            .iter()
            .map(|key| {
                self.justifications
                    .find_key(key)
                    .map(|j| format!("{key}: {}", j.reason))
            })
            .collect();

        if let Some(reasons) = reasons {
            gate.passed = true;
            gate.justification = Some(format!("Justified violations: {}", reasons.join("; ")));
        }
        gate
    }
}

/// Priority order for mapping failed gates to a phase; earlier entries win.
const PHASE_PRIORITY: [(GateKind, Phase); 7] = [
    (GateKind::TestCoverage, Phase::Testing),
    (GateKind::Complexity, Phase::Quality),
    (GateKind::Security, Phase::Quality),
    (GateKind::Structure, Phase::Structure),
    (GateKind::Build, Phase::Structure),
    (GateKind::Documentation, Phase::Validation),
    (GateKind::GitHygiene, Phase::Validation),
];

/// The phase to return to for the failed gates of `result`.
///
/// Failed gates outside the standard set map to `Validation`.
#[must_use]
pub fn recommend_next_phase(result: &GateValidationResult) -> Option<Phase> {
    if result.failed.is_empty() {
        return None;
    }

    let failed_kinds: Vec<Option<GateKind>> =
        result.failed.iter().map(|f| f.gate.kind()).collect();

    PHASE_PRIORITY
        .iter()
        .find(|(kind, _)| failed_kinds.contains(&Some(*kind)))
        .map(|(_, phase)| *phase)
        .or(Some(Phase::Validation))
}
