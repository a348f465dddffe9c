use serde::{Deserialize, Serialize};

/// Outcome of the project's build at the time metrics were captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Passing,
    Failing,
    #[default]
    Unknown,
}

impl BuildStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passing => "passing",
            Self::Failing => "failing",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub const fn is_passing(&self) -> bool {
        matches!(self, Self::Passing)
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single function whose cyclomatic complexity exceeds the configured limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityViolation {
    pub file: String,
    pub function: String,
    pub complexity: f64,
    pub line: u32,
}

/// Snapshot of project quality metrics.
///
/// Produced by external collectors (coverage tools, complexity analyzers,
/// security scanners). A snapshot is never edited after capture; a newer
/// snapshot replaces it wholesale.
///
/// `test_coverage` and `documentation_coverage` are ratios in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub test_coverage: f64,
    pub complexity_avg: f64,
    pub complexity_max: f64,
    pub critical_vulnerabilities: u32,
    pub high_vulnerabilities: u32,
    pub medium_vulnerabilities: u32,
    pub low_vulnerabilities: u32,
    pub build_status: BuildStatus,
    pub documentation_coverage: f64,
    pub total_loc: u64,
    pub test_loc: u64,
    pub commit_count: u64,
    pub secrets_found: u32,
    pub complexity_violations: Vec<ComplexityViolation>,
}

impl Metrics {
    /// Coverage in percentage points (0.75 → 75.0).
    #[must_use]
    pub fn coverage_percent(&self) -> f64 {
        self.test_coverage * 100.0
    }

    /// Test lines per line of code; zero for an empty project.
    #[must_use]
    pub fn test_to_code_ratio(&self) -> f64 {
        if self.total_loc == 0 {
            0.0
        } else {
            self.test_loc as f64 / self.total_loc as f64
        }
    }

    #[must_use]
    pub fn total_vulnerabilities(&self) -> u32 {
        self.critical_vulnerabilities
            + self.high_vulnerabilities
            + self.medium_vulnerabilities
            + self.low_vulnerabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_helpers() {
        let metrics = Metrics {
            test_coverage: 0.625,
            total_loc: 2000,
            test_loc: 500,
            critical_vulnerabilities: 1,
            high_vulnerabilities: 2,
            medium_vulnerabilities: 3,
            low_vulnerabilities: 4,
            ..Metrics::default()
        };

        assert!((metrics.coverage_percent() - 62.5).abs() < 1e-9);
        assert!((metrics.test_to_code_ratio() - 0.25).abs() < 1e-9);
        assert_eq!(metrics.total_vulnerabilities(), 10);
    }

    #[test]
    fn test_ratio_of_empty_project_is_zero() {
        assert_eq!(Metrics::default().test_to_code_ratio(), 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let metrics: Metrics =
            serde_json::from_str(r#"{"test_coverage":0.5,"build_status":"passing"}"#).unwrap();

        assert_eq!(metrics.build_status, BuildStatus::Passing);
        assert_eq!(metrics.critical_vulnerabilities, 0);
        assert!(metrics.complexity_violations.is_empty());
    }
}
