//! One project's state directory, wired from a [`Config`].

use brownfield_checkpoint::{CheckpointManager, LegacyMigrationReport};
use brownfield_config::Config;
use brownfield_engine::{WorkflowEnforcer, graduate, record_gate_outcome, trigger_reentry};
use brownfield_gate::{GateValidationResult, GateValidator, evaluate_readiness_gates};
use brownfield_model::{BrownfieldState, Metrics, Phase};
use brownfield_regression::{RegressionDetection, RegressionDetector, RegressionThresholds};
use brownfield_store::StateStore;
use brownfield_utils::error::BrownfieldError;
use brownfield_utils::logging::phase_span;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Outcome of [`Project::check_regressions`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionReport {
    pub detections: Vec<RegressionDetection>,
    /// Phase the project was sent back to, if any detection was critical.
    pub reentered: Option<Phase>,
}

/// Store, checkpoints, gates and regression thresholds for one project root.
#[derive(Debug, Clone)]
pub struct Project {
    root: Utf8PathBuf,
    config: Config,
    store: StateStore,
    checkpoints: CheckpointManager,
}

impl Project {
    /// Resolve the state directory for `root` from `config`.
    pub fn new(root: impl Into<Utf8PathBuf>, config: Config) -> Self {
        let root = root.into();
        let store = StateStore::from_config(&config, &root);
        let checkpoints = CheckpointManager::for_state_dir(store.state_dir());
        Self {
            root,
            config,
            store,
            checkpoints,
        }
    }

    /// Like [`new`](Self::new), then moves checkpoints out of the legacy
    /// directory. Safe to call on every start.
    pub fn open(
        root: impl Into<Utf8PathBuf>,
        config: Config,
    ) -> Result<(Self, LegacyMigrationReport), BrownfieldError> {
        let project = Self::new(root, config);
        let legacy_dir = project.config.legacy_checkpoint_dir_for(&project.root);
        let report = project.checkpoints.migrate_legacy_checkpoints(&legacy_dir)?;
        if !report.migrated.is_empty() {
            info!(
                migrated = report.migrated.len(),
                skipped = report.skipped.len(),
                "Migrated legacy checkpoints"
            );
        }
        Ok((project, report))
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    #[must_use]
    pub fn checkpoints(&self) -> &CheckpointManager {
        &self.checkpoints
    }

    /// Start over from an assessment, replacing any existing state.
    pub fn assess(
        &self,
        baseline: Metrics,
        now: DateTime<Utc>,
    ) -> Result<BrownfieldState, BrownfieldError> {
        self.store.create(self.root.clone(), Some(baseline), now)
    }

    pub fn load_state(&self) -> Result<BrownfieldState, BrownfieldError> {
        self.store.load()
    }

    pub fn save_state(&self, state: &BrownfieldState) -> Result<Utf8PathBuf, BrownfieldError> {
        self.store.save(state)
    }

    /// Enforcer over the persisted state.
    pub fn enforcer(&self) -> Result<WorkflowEnforcer, BrownfieldError> {
        WorkflowEnforcer::load(self.store.clone())
    }

    /// Evaluate the standard gates against the state's current metrics,
    /// record the outcome and persist.
    pub fn validate_gates(
        &self,
        state: &mut BrownfieldState,
        now: DateTime<Utc>,
    ) -> Result<GateValidationResult, BrownfieldError> {
        let _span = phase_span(self.root.as_str(), state.current_phase.as_str()).entered();
        let metrics = state.current_metrics.clone().unwrap_or_default();
        let gates = evaluate_readiness_gates(&metrics, &self.config.gates);
        let validator = GateValidator::from_config(&self.config, self.store.state_dir())?;
        let result = validator.validate_all_gates(&gates);

        record_gate_outcome(state, &result, now);
        self.store.save(state)?;
        Ok(result)
    }

    /// Graduate, persist, and keep an archived copy of the graduated state.
    pub fn graduate(
        &self,
        state: &mut BrownfieldState,
        now: DateTime<Utc>,
    ) -> Result<Utf8PathBuf, BrownfieldError> {
        graduate(state, now)?;
        self.store.save(state)?;
        self.store.archive(state, now)
    }

    /// Record `current` and compare it with the regression baseline.
    ///
    /// A graduated project with a critical regression is sent back into
    /// remediation. In any other phase the detections are only reported.
    pub fn check_regressions(
        &self,
        state: &mut BrownfieldState,
        current: Metrics,
        now: DateTime<Utc>,
    ) -> Result<RegressionReport, BrownfieldError> {
        let _span = phase_span(self.root.as_str(), state.current_phase.as_str()).entered();
        let thresholds = RegressionThresholds::from_config(&self.config.regression);
        let detector = RegressionDetector::from_state(state, thresholds)?;
        let detections = detector.check(&current);
        state.record_metrics(current);

        let reentered = trigger_reentry(state, &detections, now);
        if let Some(phase) = reentered {
            warn!(project = %self.root, phase = %phase, "Regression forced re-entry");
        }
        self.store.save(state)?;

        Ok(RegressionReport {
            detections,
            reentered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brownfield_engine::{advance_with_validation, mark_phase_complete};
    use brownfield_model::BuildStatus;
    use tempfile::TempDir;

    fn project_in(temp: &TempDir) -> Project {
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let config = Config::builder()
            .state_dir(root.join(".brownfield"))
            .build()
            .unwrap();
        Project::new(root, config)
    }

    fn healthy() -> Metrics {
        Metrics {
            test_coverage: 0.85,
            complexity_avg: 4.0,
            complexity_max: 9.0,
            total_loc: 2_000,
            test_loc: 800,
            build_status: BuildStatus::Passing,
            ..Metrics::default()
        }
    }

    fn walk_to_validation(state: &mut BrownfieldState) {
        for phase in [Phase::Structure, Phase::Testing, Phase::Quality, Phase::Validation] {
            mark_phase_complete(state, Utc::now());
            advance_with_validation(state, phase, Utc::now()).unwrap();
        }
        mark_phase_complete(state, Utc::now());
    }

    #[test]
    fn test_healthy_project_graduates_and_archives() {
        let temp = TempDir::new().unwrap();
        let project = project_in(&temp);
        let mut state = project.assess(healthy(), Utc::now()).unwrap();
        walk_to_validation(&mut state);

        let result = project.validate_gates(&mut state, Utc::now()).unwrap();
        assert!(result.all_passed, "{result:?}");

        let archived = project.graduate(&mut state, Utc::now()).unwrap();
        assert!(archived.exists());
        assert!(project.load_state().unwrap().graduated);
    }

    #[test]
    fn test_critical_regression_reenters() {
        let temp = TempDir::new().unwrap();
        let project = project_in(&temp);
        let mut state = project.assess(healthy(), Utc::now()).unwrap();
        walk_to_validation(&mut state);
        project.validate_gates(&mut state, Utc::now()).unwrap();
        project.graduate(&mut state, Utc::now()).unwrap();

        let degraded = Metrics {
            test_coverage: 0.70,
            ..healthy()
        };
        let report = project
            .check_regressions(&mut state, degraded, Utc::now())
            .unwrap();

        assert_eq!(report.reentered, Some(Phase::Testing));
        let reloaded = project.load_state().unwrap();
        assert_eq!(reloaded.current_phase, Phase::Testing);
        assert_eq!(reloaded.open_reentry_events().count(), 1);
    }
}
