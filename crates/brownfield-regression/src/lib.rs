//! Regression detection against the graduation baseline
//!
//! Compares a current [`Metrics`] snapshot with the baseline and classifies
//! each drift as warning or critical. Any critical drift forces re-entry.
//!
//! | Metric | Drift | Critical | Warning |
//! |--------|-------|----------|---------|
//! | `test_coverage` | drop in percentage points | `>= threshold` | `>= ratio * threshold` |
//! | `complexity` | relative increase of the average, % | `>= threshold` | `>= ratio * threshold` |
//! | `critical_vulnerabilities` | current count | `> 0` | never |
//! | `build_status` | current status | not passing | never |

use brownfield_config::RegressionConfig;
use brownfield_model::{BrownfieldState, Metrics, ReEntryTrigger};
use brownfield_utils::error::RegressionError;
use serde::Serialize;
use tracing::warn;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionSeverity {
    None,
    Warning,
    Critical,
}

impl RegressionSeverity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RegressionSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionThresholds {
    /// Percentage points.
    pub coverage_drop: f64,
    /// Percent.
    pub complexity_increase: f64,
    pub warning_ratio: f64,
}

impl Default for RegressionThresholds {
    fn default() -> Self {
        Self::from_config(&RegressionConfig::default())
    }
}

impl RegressionThresholds {
    #[must_use]
    pub fn from_config(config: &RegressionConfig) -> Self {
        Self {
            coverage_drop: config.coverage_drop_threshold,
            complexity_increase: config.complexity_increase_threshold,
            warning_ratio: config.warning_ratio,
        }
    }

    fn classify(&self, drift: f64, threshold: f64) -> RegressionSeverity {
        if drift + EPSILON >= threshold {
            RegressionSeverity::Critical
        } else if drift + EPSILON >= threshold * self.warning_ratio {
            RegressionSeverity::Warning
        } else {
            RegressionSeverity::None
        }
    }
}

/// One metric that drifted past a warning or critical threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionDetection {
    pub metric: String,
    pub baseline_value: f64,
    pub current_value: f64,
    pub threshold: f64,
    pub severity: RegressionSeverity,
    pub message: String,
}

impl RegressionDetection {
    /// The re-entry trigger this regression raises.
    #[must_use]
    pub fn trigger(&self) -> ReEntryTrigger {
        ReEntryTrigger::for_metric(&self.metric)
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.severity == RegressionSeverity::Critical
    }
}

/// Compare `current` against `baseline`. Never fails; no drift yields an empty list.
#[must_use]
pub fn check_for_regressions(
    baseline: &Metrics,
    current: &Metrics,
    thresholds: &RegressionThresholds,
) -> Vec<RegressionDetection> {
    let mut detections = Vec::new();

    let (base_cov, cur_cov) = (baseline.coverage_percent(), current.coverage_percent());
    let drop = base_cov - cur_cov;
    let severity = thresholds.classify(drop, thresholds.coverage_drop);
    if severity != RegressionSeverity::None {
        detections.push(RegressionDetection {
            metric: "test_coverage".to_string(),
            baseline_value: base_cov,
            current_value: cur_cov,
            threshold: thresholds.coverage_drop,
            severity,
            message: format!("Coverage dropped {drop:.1} points ({base_cov:.1}% → {cur_cov:.1}%)"),
        });
    }

    if baseline.complexity_avg > 0.0 {
        let increase =
            (current.complexity_avg - baseline.complexity_avg) / baseline.complexity_avg * 100.0;
        let severity = thresholds.classify(increase, thresholds.complexity_increase);
        if severity != RegressionSeverity::None {
            detections.push(RegressionDetection {
                metric: "complexity".to_string(),
                baseline_value: baseline.complexity_avg,
                current_value: current.complexity_avg,
                threshold: thresholds.complexity_increase,
                severity,
                message: format!(
                    "Average complexity rose {increase:.1}% ({:.1} → {:.1})",
                    baseline.complexity_avg, current.complexity_avg
                ),
            });
        }
    }

    if current.critical_vulnerabilities > 0 {
        detections.push(RegressionDetection {
            metric: "critical_vulnerabilities".to_string(),
            baseline_value: f64::from(baseline.critical_vulnerabilities),
            current_value: f64::from(current.critical_vulnerabilities),
            threshold: 0.0,
            severity: RegressionSeverity::Critical,
            message: format!(
                "{} critical vulnerabilit{} present",
                current.critical_vulnerabilities,
                if current.critical_vulnerabilities == 1 { "y" } else { "ies" }
            ),
        });
    }

    if !current.build_status.is_passing() {
        detections.push(RegressionDetection {
            metric: "build_status".to_string(),
            baseline_value: if baseline.build_status.is_passing() { 1.0 } else { 0.0 },
            current_value: 0.0,
            threshold: 1.0,
            severity: RegressionSeverity::Critical,
            message: format!("Build is {}", current.build_status),
        });
    }

    for detection in &detections {
        warn!(
            metric = %detection.metric,
            severity = %detection.severity,
            baseline = detection.baseline_value,
            current = detection.current_value,
            "{}",
            detection.message
        );
    }

    detections
}

/// True iff at least one detection is critical.
#[must_use]
pub fn should_trigger_reentry(detections: &[RegressionDetection]) -> bool {
    detections.iter().any(RegressionDetection::is_critical)
}

/// Detector bound to a baseline snapshot.
#[derive(Debug, Clone)]
pub struct RegressionDetector {
    baseline: Metrics,
    thresholds: RegressionThresholds,
}

impl RegressionDetector {
    #[must_use]
    pub fn new(baseline: Metrics, thresholds: RegressionThresholds) -> Self {
        Self {
            baseline,
            thresholds,
        }
    }

    /// Detector using the state's graduation snapshot, or its first-assessment
    /// baseline. Fails when neither is recorded.
    pub fn from_state(
        state: &BrownfieldState,
        thresholds: RegressionThresholds,
    ) -> Result<Self, RegressionError> {
        let baseline = state
            .regression_baseline()
            .cloned()
            .ok_or(RegressionError::MissingBaseline)?;
        Ok(Self::new(baseline, thresholds))
    }

    #[must_use]
    pub fn baseline(&self) -> &Metrics {
        &self.baseline
    }

    #[must_use]
    pub fn check(&self, current: &Metrics) -> Vec<RegressionDetection> {
        check_for_regressions(&self.baseline, current, &self.thresholds)
    }
}
