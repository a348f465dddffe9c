use serde::{Deserialize, Serialize};

/// Stages of the remediation workflow.
///
/// ```text
/// Assessment → Structure → Testing → Quality → Validation → Graduated
/// ```
///
/// A graduated project may be sent back to `Structure`, `Testing` or `Quality`
/// when quality regresses. Variants are ordered by position in the workflow,
/// so `Phase::Testing < Phase::Quality`.
///
/// Serialized lowercase (`"assessment"`, `"graduated"`).
///
/// ```rust
/// use brownfield_model::Phase;
/// use std::str::FromStr;
///
/// assert_eq!(Phase::Testing.as_str(), "testing");
/// assert_eq!(Phase::from_str("quality").unwrap(), Phase::Quality);
/// assert_eq!(Phase::Validation.next(), Some(Phase::Graduated));
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Assessment,
    Structure,
    Testing,
    Quality,
    Validation,
    Graduated,
}

impl Phase {
    /// All phases in workflow order.
    pub const ALL: [Phase; 6] = [
        Self::Assessment,
        Self::Structure,
        Self::Testing,
        Self::Quality,
        Self::Validation,
        Self::Graduated,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assessment => "assessment",
            Self::Structure => "structure",
            Self::Testing => "testing",
            Self::Quality => "quality",
            Self::Validation => "validation",
            Self::Graduated => "graduated",
        }
    }

    /// The phase that normally follows this one.
    #[must_use]
    pub const fn next(&self) -> Option<Phase> {
        match self {
            Self::Assessment => Some(Self::Structure),
            Self::Structure => Some(Self::Testing),
            Self::Testing => Some(Self::Quality),
            Self::Quality => Some(Self::Validation),
            Self::Validation => Some(Self::Graduated),
            Self::Graduated => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
