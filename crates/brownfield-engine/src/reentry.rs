//! Regression-triggered re-entry into remediation.

use brownfield_model::{BrownfieldState, Phase, ReEntryEvent, ReEntryTrigger, timestamps};
use brownfield_regression::RegressionDetection;
use brownfield_utils::logging::log_reentry;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::phase_machine::advance;

/// Force `state` into the phase that `trigger` maps to.
///
/// Bypasses transition checks. Stamps `reentry_<phase>` and clears the
/// completion stamps of the target and every later phase, along with
/// `all_gates_passed`, so those phases must be completed again. The
/// `graduated` flag is left as it was.
pub fn force_reentry(
    state: &mut BrownfieldState,
    trigger: ReEntryTrigger,
    now: DateTime<Utc>,
) -> Phase {
    let target = trigger.target_phase();

    for phase in Phase::ALL.iter().filter(|p| **p >= target) {
        state.phase_timestamps.remove(&timestamps::complete(*phase));
    }
    state.phase_timestamps.remove(timestamps::ALL_GATES_PASSED);

    advance(state, target, now);
    state.stamp(timestamps::reentry(target), now);
    log_reentry(state.project_root.as_str(), trigger.as_str(), target.as_str());
    target
}

/// Record one event per critical detection and re-enter at the earliest
/// target phase among them.
///
/// Only a project sitting in `Graduated` is re-entered. Before graduation, or
/// while remediating after an earlier re-entry, detections are left to the
/// caller and nothing is recorded.
///
/// Returns the phase re-entered, or `None` when nothing was critical.
pub fn trigger_reentry(
    state: &mut BrownfieldState,
    detections: &[RegressionDetection],
    now: DateTime<Utc>,
) -> Option<Phase> {
    if state.current_phase != Phase::Graduated {
        debug!(
            phase = %state.current_phase,
            critical = detections.iter().filter(|d| d.is_critical()).count(),
            "Not graduated; skipping re-entry"
        );
        return None;
    }

    let mut chosen: Option<ReEntryTrigger> = None;

    for detection in detections.iter().filter(|d| d.is_critical()) {
        let trigger = detection.trigger();
        state.re_entry_events.push(ReEntryEvent {
            detected_at: now,
            trigger,
            baseline_value: detection.baseline_value,
            current_value: detection.current_value,
            threshold: detection.threshold,
            target_phase: trigger.target_phase(),
            resolved: false,
            resolved_at: None,
        });
        if chosen.is_none_or(|c| trigger.target_phase() < c.target_phase()) {
            chosen = Some(trigger);
        }
    }

    chosen.map(|trigger| force_reentry(state, trigger, now))
}

/// Mark every open re-entry event resolved. Returns how many were open.
pub fn resolve_reentry_events(state: &mut BrownfieldState, now: DateTime<Utc>) -> usize {
    let mut resolved = 0;
    for event in state.re_entry_events.iter_mut().filter(|e| !e.resolved) {
        event.resolve(now);
        resolved += 1;
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use brownfield_model::{BuildStatus, Metrics};
    use brownfield_regression::{RegressionThresholds, check_for_regressions};
    use proptest::prelude::*;

    fn graduated_state() -> BrownfieldState {
        let mut state = BrownfieldState::new("/repo", Some(Metrics::default()), Utc::now());
        state.current_phase = Phase::Graduated;
        state.graduated = true;
        for phase in [Phase::Assessment, Phase::Structure, Phase::Testing, Phase::Quality, Phase::Validation] {
            state.stamp(timestamps::complete(phase), Utc::now());
        }
        state.stamp(timestamps::ALL_GATES_PASSED, Utc::now());
        state
    }

    #[test]
    fn test_force_reentry_targets() {
        let cases = [
            ("coverage_drop", Phase::Testing),
            ("complexity_increase", Phase::Quality),
            ("security_breach", Phase::Quality),
            ("structure_degradation", Phase::Structure),
            ("unheard_of", Phase::Assessment),
        ];
        for (name, expected) in cases {
            let mut state = graduated_state();
            let target = force_reentry(&mut state, ReEntryTrigger::from_name(name), Utc::now());

            assert_eq!(target, expected);
            assert_eq!(state.current_phase, expected);
            assert!(state.has_timestamp(&timestamps::reentry(expected)));
            assert!(state.graduated, "graduated flag is unchanged");
        }
    }

    #[test]
    fn test_force_reentry_clears_later_completion_stamps() {
        let mut state = graduated_state();
        force_reentry(&mut state, ReEntryTrigger::CoverageDrop, Utc::now());

        assert!(state.is_phase_complete(Phase::Structure));
        assert!(!state.is_phase_complete(Phase::Testing));
        assert!(!state.is_phase_complete(Phase::Validation));
        assert!(!state.has_timestamp(timestamps::ALL_GATES_PASSED));
    }

    #[test]
    fn test_trigger_reentry_picks_earliest_phase() {
        let mut state = graduated_state();
        let baseline = Metrics {
            test_coverage: 0.8,
            complexity_avg: 5.0,
            build_status: BuildStatus::Passing,
            ..Metrics::default()
        };
        let current = Metrics {
            test_coverage: 0.6,
            complexity_avg: 9.0,
            build_status: BuildStatus::Failing,
            ..Metrics::default()
        };
        let detections =
            check_for_regressions(&baseline, &current, &RegressionThresholds::default());

        let target = trigger_reentry(&mut state, &detections, Utc::now());

        assert_eq!(target, Some(Phase::Structure));
        assert_eq!(state.re_entry_events.len(), 3);
        assert_eq!(state.open_reentry_events().count(), 3);
    }

    #[test]
    fn test_warnings_do_not_reenter() {
        let mut state = graduated_state();
        let baseline = Metrics {
            test_coverage: 0.80,
            build_status: BuildStatus::Passing,
            ..Metrics::default()
        };
        let current = Metrics {
            test_coverage: 0.765,
            ..baseline.clone()
        };
        let detections =
            check_for_regressions(&baseline, &current, &RegressionThresholds::default());

        assert_eq!(trigger_reentry(&mut state, &detections, Utc::now()), None);
        assert_eq!(state.current_phase, Phase::Graduated);
        assert!(state.re_entry_events.is_empty());
    }

    #[test]
    fn test_resolve_reentry_events() {
        let mut state = graduated_state();
        state.re_entry_events.push(ReEntryEvent {
            detected_at: Utc::now(),
            trigger: ReEntryTrigger::CoverageDrop,
            baseline_value: 80.0,
            current_value: 70.0,
            threshold: 5.0,
            target_phase: Phase::Testing,
            resolved: false,
            resolved_at: None,
        });

        let now = Utc::now();
        assert_eq!(resolve_reentry_events(&mut state, now), 1);
        assert_eq!(resolve_reentry_events(&mut state, now), 0);
        assert_eq!(state.re_entry_events[0].resolved_at, Some(now));
    }

    #[test]
    fn test_trigger_reentry_requires_graduated_phase() {
        let baseline = Metrics {
            test_coverage: 0.75,
            build_status: BuildStatus::Passing,
            ..Metrics::default()
        };
        let current = Metrics {
            test_coverage: 0.50,
            ..baseline.clone()
        };
        let detections =
            check_for_regressions(&baseline, &current, &RegressionThresholds::default());

        let mut state = BrownfieldState::new("/repo", Some(baseline), Utc::now());
        state.current_phase = Phase::Structure;

        assert_eq!(trigger_reentry(&mut state, &detections, Utc::now()), None);
        assert_eq!(state.current_phase, Phase::Structure);
        assert!(state.re_entry_events.is_empty());
    }

    #[test]
    fn test_remediation_after_reentry_is_not_reset() {
        let mut state = graduated_state();
        let baseline = Metrics {
            test_coverage: 0.80,
            build_status: BuildStatus::Passing,
            ..Metrics::default()
        };
        let current = Metrics {
            test_coverage: 0.70,
            ..baseline.clone()
        };
        let detections =
            check_for_regressions(&baseline, &current, &RegressionThresholds::default());

        assert_eq!(
            trigger_reentry(&mut state, &detections, Utc::now()),
            Some(Phase::Testing)
        );
        state.stamp(timestamps::complete(Phase::Testing), Utc::now());

        assert_eq!(trigger_reentry(&mut state, &detections, Utc::now()), None);
        assert_eq!(state.re_entry_events.len(), 1);
        assert!(state.is_phase_complete(Phase::Testing));
    }

    fn trigger_strategy() -> impl Strategy<Value = ReEntryTrigger> {
        prop::sample::select(vec![
            ReEntryTrigger::CoverageDrop,
            ReEntryTrigger::ComplexityIncrease,
            ReEntryTrigger::SecurityBreach,
            ReEntryTrigger::StructureDegradation,
            ReEntryTrigger::Unknown,
        ])
    }

    proptest! {
        #[test]
        fn prop_reentry_keeps_only_earlier_completions(trigger in trigger_strategy()) {
            let mut state = graduated_state();
            let target = force_reentry(&mut state, trigger, Utc::now());

            for phase in Phase::ALL {
                if phase == Phase::Graduated {
                    continue;
                }
                prop_assert_eq!(state.is_phase_complete(phase), phase < target);
            }
        }
    }
}
