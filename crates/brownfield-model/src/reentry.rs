use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Why a graduated project is sent back into remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReEntryTrigger {
    CoverageDrop,
    ComplexityIncrease,
    SecurityBreach,
    StructureDegradation,
    Unknown,
}

impl ReEntryTrigger {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CoverageDrop => "coverage_drop",
            Self::ComplexityIncrease => "complexity_increase",
            Self::SecurityBreach => "security_breach",
            Self::StructureDegradation => "structure_degradation",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a trigger name; unrecognised names map to `Unknown`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "coverage_drop" => Self::CoverageDrop,
            "complexity_increase" => Self::ComplexityIncrease,
            "security_breach" => Self::SecurityBreach,
            "structure_degradation" => Self::StructureDegradation,
            _ => Self::Unknown,
        }
    }

    /// Trigger raised by a regression in the named metric.
    #[must_use]
    pub fn for_metric(metric: &str) -> Self {
        match metric {
            "test_coverage" => Self::CoverageDrop,
            "complexity" => Self::ComplexityIncrease,
            "critical_vulnerabilities" => Self::SecurityBreach,
            "build_status" => Self::StructureDegradation,
            _ => Self::Unknown,
        }
    }

    /// Phase the project re-enters. Unknown triggers restart from assessment.
    #[must_use]
    pub const fn target_phase(&self) -> Phase {
        match self {
            Self::CoverageDrop => Phase::Testing,
            Self::ComplexityIncrease | Self::SecurityBreach => Phase::Quality,
            Self::StructureDegradation => Phase::Structure,
            Self::Unknown => Phase::Assessment,
        }
    }
}

impl std::fmt::Display for ReEntryTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded regression that forced (or will force) re-entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReEntryEvent {
    pub detected_at: DateTime<Utc>,
    pub trigger: ReEntryTrigger,
    pub baseline_value: f64,
    pub current_value: f64,
    pub threshold: f64,
    pub target_phase: Phase,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ReEntryEvent {
    pub fn resolve(&mut self, now: DateTime<Utc>) {
        self.resolved = true;
        self.resolved_at = Some(now);
    }
}
