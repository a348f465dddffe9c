//! Property-based tests for the phase state machine and checkpoint progress.
//!
//! Property test case counts can be configured via environment variables:
//!
//! - `PROPTEST_CASES`: Number of test cases per property (default: 64)
//! - `PROPTEST_MAX_SHRINK_ITERS`: Max shrinking iterations on failure (default: 1000)
//!
//! ```bash
//! PROPTEST_CASES=256 cargo test --test property_based_tests
//! ```

use brownfield::model::timestamps;
use brownfield::{BrownfieldState, Metrics, Phase, PhaseCheckpoint, Task, can_advance_to};
use brownfield::engine::allowed_transitions;
use chrono::Utc;
use proptest::prelude::*;
use std::env;

const DEFAULT_PROPTEST_CASES: u32 = 64;
const DEFAULT_MAX_SHRINK_ITERS: u32 = 1000;

fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);
    let max_shrink_iters = env::var("PROPTEST_MAX_SHRINK_ITERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_SHRINK_ITERS);

    ProptestConfig {
        cases,
        max_shrink_iters,
        ..ProptestConfig::default()
    }
}

/// Which preconditions hold in a generated state.
#[derive(Debug, Clone)]
struct Preconditions {
    baseline: bool,
    structure_complete: bool,
    testing_complete: bool,
    quality_complete: bool,
    gates_passed: bool,
    coverage_pct: u32,
}

impl Preconditions {
    fn coverage_ok(&self) -> bool {
        self.coverage_pct >= 60
    }

    /// Preconditions of `target` that should be reported unmet.
    fn expected_unmet(&self, target: Phase) -> usize {
        match target {
            Phase::Assessment => 0,
            Phase::Structure => usize::from(!self.baseline),
            Phase::Testing => usize::from(!self.structure_complete),
            Phase::Quality => {
                usize::from(!self.testing_complete) + usize::from(!self.coverage_ok())
            }
            Phase::Validation => usize::from(!self.quality_complete),
            Phase::Graduated => usize::from(!self.gates_passed),
        }
    }

    fn build(&self, current: Phase) -> BrownfieldState {
        let now = Utc::now();
        let baseline = self.baseline.then(Metrics::default);
        let mut state = BrownfieldState::new("/repo", baseline, now);
        state.current_phase = current;
        state.current_metrics = Some(Metrics {
            test_coverage: f64::from(self.coverage_pct) / 100.0,
            ..Metrics::default()
        });
        for (holds, phase) in [
            (self.structure_complete, Phase::Structure),
            (self.testing_complete, Phase::Testing),
            (self.quality_complete, Phase::Quality),
        ] {
            if holds {
                state.stamp(timestamps::complete(phase), now);
            }
        }
        if self.gates_passed {
            state.stamp(timestamps::ALL_GATES_PASSED, now);
        }
        state
    }
}

fn phase_strategy() -> impl Strategy<Value = Phase> {
    prop::sample::select(Phase::ALL.to_vec())
}

fn preconditions_strategy() -> impl Strategy<Value = Preconditions> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        0u32..=100,
    )
        .prop_map(
            |(baseline, structure_complete, testing_complete, quality_complete, gates_passed, coverage_pct)| {
                Preconditions {
                    baseline,
                    structure_complete,
                    testing_complete,
                    quality_complete,
                    gates_passed,
                    coverage_pct,
                }
            },
        )
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn prop_transition_matrix(
        from in phase_strategy(),
        to in phase_strategy(),
        pre in preconditions_strategy(),
    ) {
        let state = pre.build(from);
        let check = can_advance_to(&state, to);

        if !allowed_transitions(from).contains(&to) {
            prop_assert!(!check.allowed);
            prop_assert!(check.reason.unwrap_or_default().contains("Cannot transition"));
        } else if from == Phase::Graduated {
            prop_assert!(check.allowed);
        } else {
            let expected = pre.expected_unmet(to);
            prop_assert_eq!(check.allowed, expected == 0);
            prop_assert_eq!(check.unmet.len(), expected);
        }
    }

    #[test]
    fn prop_graduated_reentry_targets(pre in preconditions_strategy()) {
        let state = pre.build(Phase::Graduated);

        for target in [Phase::Structure, Phase::Testing, Phase::Quality] {
            prop_assert!(can_advance_to(&state, target).allowed);
        }
        for target in [Phase::Assessment, Phase::Validation] {
            prop_assert!(!can_advance_to(&state, target).allowed);
        }
    }

    #[test]
    fn prop_checkpoint_progress(completed in 0usize..20, pending in 0usize..20) {
        let task = |i: usize| Task::new(format!("t{i}"), "task", Phase::Testing);
        let checkpoint = PhaseCheckpoint::new(
            Phase::Testing,
            (0..completed).map(task).collect(),
            (completed..completed + pending).map(task).collect(),
            Utc::now(),
        );

        let expected = if completed + pending == 0 {
            0.0
        } else {
            completed as f64 / (completed + pending) as f64 * 100.0
        };
        prop_assert!((checkpoint.progress_percent() - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_mark_complete_moves_one_task(pending in 1usize..10, pick in 0usize..10) {
        let pick = pick % pending;
        let now = Utc::now();
        let mut checkpoint = PhaseCheckpoint::new(
            Phase::Quality,
            Vec::new(),
            (0..pending).map(|i| Task::new(format!("t{i}"), "task", Phase::Quality)).collect(),
            now,
        );
        let before = checkpoint.timestamp;

        let moved = checkpoint.mark_task_complete(&format!("t{pick}"), None, now).is_some();

        prop_assert!(moved);
        prop_assert_eq!(checkpoint.completed_tasks.len(), 1);
        prop_assert_eq!(checkpoint.pending_tasks.len(), pending - 1);
        prop_assert!(checkpoint.timestamp > before);
    }
}
