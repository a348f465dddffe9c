use serde::{Deserialize, Serialize};

/// How a gate's `passed` flag was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateEvaluation {
    /// Compared a measured value against the threshold.
    #[default]
    Measured,
    /// No evaluator exists yet; the gate passes and is reported separately.
    NotImplemented,
}

/// The standard readiness gates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum GateKind {
    TestCoverage,
    Complexity,
    Structure,
    Build,
    Documentation,
    Security,
    GitHygiene,
}

impl GateKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TestCoverage => "test_coverage",
            Self::Complexity => "complexity",
            Self::Structure => "structure",
            Self::Build => "build",
            Self::Documentation => "documentation",
            Self::Security => "security",
            Self::GitHygiene => "git_hygiene",
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named quantitative check that must pass before graduation.
///
/// `passed` is decided by whoever builds the gate; the validator only
/// aggregates. A `justification` lets a human accept a numeric failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessGate {
    pub name: String,
    pub description: String,
    pub threshold: f64,
    pub current_value: f64,
    pub passed: bool,
    #[serde(default)]
    pub verification: String,
    #[serde(default)]
    pub remediation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default)]
    pub evaluation: GateEvaluation,
}

impl ReadinessGate {
    /// A gate decided by comparing `current_value` with `threshold`.
    pub fn measured(
        name: impl Into<String>,
        description: impl Into<String>,
        threshold: f64,
        current_value: f64,
        passed: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            threshold,
            current_value,
            passed,
            verification: String::new(),
            remediation: String::new(),
            exceptions: Vec::new(),
            justification: None,
            evaluation: GateEvaluation::Measured,
        }
    }

    /// A gate without an evaluator. It passes by default.
    pub fn not_implemented(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            evaluation: GateEvaluation::NotImplemented,
            ..Self::measured(name, description, 0.0, 0.0, true)
        }
    }

    #[must_use]
    pub fn with_verification(mut self, verification: impl Into<String>) -> Self {
        self.verification = verification.into();
        self
    }

    #[must_use]
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    #[must_use]
    pub fn with_exceptions(mut self, exceptions: Vec<String>) -> Self {
        self.exceptions = exceptions;
        self
    }

    /// The standard gate this one corresponds to, if any.
    #[must_use]
    pub fn kind(&self) -> Option<GateKind> {
        self.name.parse().ok()
    }

    #[must_use]
    pub fn is_implemented(&self) -> bool {
        self.evaluation == GateEvaluation::Measured
    }
}
