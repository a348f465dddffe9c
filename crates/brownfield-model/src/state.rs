//! The persisted aggregate: everything brownfield knows about one project.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::Metrics;
use crate::phase::Phase;
use crate::reentry::ReEntryEvent;
use crate::workflow::WorkflowState;

/// Schema version written by this release.
pub const SCHEMA_VERSION: &str = "2.0";

/// Keys of `phase_timestamps`.
pub mod timestamps {
    use crate::phase::Phase;

    pub const ALL_GATES_PASSED: &str = "all_gates_passed";
    pub const GRADUATED: &str = "graduated";

    #[must_use]
    pub fn started(phase: Phase) -> String {
        format!("{}_started", phase.as_str())
    }

    #[must_use]
    pub fn complete(phase: Phase) -> String {
        format!("{}_complete", phase.as_str())
    }

    #[must_use]
    pub fn reentry(phase: Phase) -> String {
        format!("reentry_{}", phase.as_str())
    }
}

/// Readiness for hand-off to spec-driven development.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecKitState {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub constitution_path: Option<String>,
}

/// Aggregate root persisted in `<state_dir>/state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrownfieldState {
    pub schema_version: String,
    pub project_root: Utf8PathBuf,
    pub current_phase: Phase,
    pub baseline_metrics: Option<Metrics>,
    pub current_metrics: Option<Metrics>,
    #[serde(default)]
    pub phase_timestamps: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub re_entry_events: Vec<ReEntryEvent>,
    pub graduation_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub graduated: bool,
    pub graduation_metrics: Option<Metrics>,
    pub workflow_state: WorkflowState,
    pub speckit: SpecKitState,
    pub migrated_from_version: Option<String>,
    pub migrated_at: Option<DateTime<Utc>>,
}

impl BrownfieldState {
    /// State for a freshly assessed project, stamped `assessment_started`.
    pub fn new(
        project_root: impl Into<Utf8PathBuf>,
        baseline_metrics: Option<Metrics>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut state = Self {
            schema_version: SCHEMA_VERSION.to_string(),
            project_root: project_root.into(),
            current_phase: Phase::Assessment,
            current_metrics: baseline_metrics.clone(),
            baseline_metrics,
            phase_timestamps: BTreeMap::new(),
            re_entry_events: Vec::new(),
            graduation_timestamp: None,
            graduated: false,
            graduation_metrics: None,
            workflow_state: WorkflowState::default(),
            speckit: SpecKitState::default(),
            migrated_from_version: None,
            migrated_at: None,
        };
        state.stamp(timestamps::started(Phase::Assessment), now);
        state
    }

    pub fn stamp(&mut self, key: impl Into<String>, at: DateTime<Utc>) {
        self.phase_timestamps.insert(key.into(), at);
    }

    #[must_use]
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.phase_timestamps.get(key).copied()
    }

    #[must_use]
    pub fn has_timestamp(&self, key: &str) -> bool {
        self.phase_timestamps.contains_key(key)
    }

    #[must_use]
    pub fn is_phase_complete(&self, phase: Phase) -> bool {
        self.has_timestamp(&timestamps::complete(phase))
    }

    /// Metrics regressions are measured against: the graduation snapshot,
    /// or the first-assessment baseline before graduation.
    #[must_use]
    pub fn regression_baseline(&self) -> Option<&Metrics> {
        self.graduation_metrics
            .as_ref()
            .or(self.baseline_metrics.as_ref())
    }

    pub fn open_reentry_events(&self) -> impl Iterator<Item = &ReEntryEvent> {
        self.re_entry_events.iter().filter(|event| !event.resolved)
    }

    /// Replace the current metrics snapshot.
    pub fn record_metrics(&mut self, metrics: Metrics) {
        self.current_metrics = Some(metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(coverage: f64) -> Metrics {
        Metrics {
            test_coverage: coverage,
            ..Metrics::default()
        }
    }

    #[test]
    fn test_new_state_starts_in_assessment() {
        let now = Utc::now();
        let state = BrownfieldState::new("/repo", Some(metrics(0.4)), now);

        assert_eq!(state.schema_version, SCHEMA_VERSION);
        assert_eq!(state.current_phase, Phase::Assessment);
        assert_eq!(state.timestamp("assessment_started"), Some(now));
        assert_eq!(state.current_metrics, state.baseline_metrics);
        assert!(!state.graduated);
    }

    #[test]
    fn test_timestamp_keys() {
        assert_eq!(timestamps::started(Phase::Testing), "testing_started");
        assert_eq!(timestamps::complete(Phase::Quality), "quality_complete");
        assert_eq!(timestamps::reentry(Phase::Structure), "reentry_structure");
    }

    #[test]
    fn test_regression_baseline_prefers_graduation_snapshot() {
        let mut state = BrownfieldState::new("/repo", Some(metrics(0.4)), Utc::now());
        assert_eq!(state.regression_baseline(), Some(&metrics(0.4)));

        state.graduation_metrics = Some(metrics(0.8));
        assert_eq!(state.regression_baseline(), Some(&metrics(0.8)));
    }

    #[test]
    fn test_json_shape() {
        let state = BrownfieldState::new("/repo", None, Utc::now());
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["schema_version"], "2.0");
        assert_eq!(json["current_phase"], "assessment");
        assert_eq!(json["workflow_state"]["current_phase"], "not_started");
        assert!(json["baseline_metrics"].is_null());
        assert!(json["phase_timestamps"]["assessment_started"].is_string());
    }
}
