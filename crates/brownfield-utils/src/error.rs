use std::fmt;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `BrownfieldError` is the error type returned by brownfield library operations
/// that a caller may need to branch on. It provides:
/// - Distinct kinds for missing/corrupted state and checkpoint files
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// Expected "not ready yet" outcomes (a refused phase transition, a blocked
/// workflow command) are returned as plain check values by the engine; they
/// only become a `BrownfieldError` through the `*_with_validation` helpers.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration errors |
/// | 3 | State file not found |
/// | 4 | State file invalid or unsupported |
/// | 5 | Phase transition or prerequisite refused |
/// | 6 | Checkpoint missing or corrupted |
/// | 7 | Readiness gate failed |
/// | 8 | Regression baseline missing |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use brownfield_utils::error::{BrownfieldError, StateError};
/// use brownfield_utils::exit_codes::ExitCode;
///
/// let err = BrownfieldError::State(StateError::NotFound {
///     path: ".brownfield/state.json".to_string(),
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::STATE_NOT_FOUND);
/// assert!(err.display_for_user().contains("brownfield assess"));
/// ```
#[derive(Error, Debug)]
pub enum BrownfieldError {
    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Phase error: {0}")]
    Phase(#[from] PhaseError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Gate validation error: {0}")]
    Gate(#[from] GateError),

    #[error("Regression detection error: {0}")]
    Regression(#[from] RegressionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    State,
    PhaseTransition,
    Checkpoint,
    QualityGate,
    Regression,
    FileSystem,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::State => write!(f, "State"),
            Self::PhaseTransition => write!(f, "Phase Transition"),
            Self::Checkpoint => write!(f, "Checkpoint"),
            Self::QualityGate => write!(f, "Quality Gate"),
            Self::Regression => write!(f, "Regression"),
            Self::FileSystem => write!(f, "File System"),
            Self::Internal => write!(f, "Internal"),
        }
    }
}

/// Errors loading or persisting the aggregate state file
#[derive(Error, Debug)]
pub enum StateError {
    #[error("No state file at {path}")]
    NotFound { path: String },

    #[error("State file {path} is invalid: {reason}")]
    Invalid { path: String, reason: String },

    #[error("State file {path} has unsupported schema version {version}")]
    UnsupportedSchema { path: String, version: String },

    #[error("Failed to persist state to {path}: {reason}")]
    PersistFailed { path: String, reason: String },
}

impl UserFriendlyError for StateError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { path } => {
                format!("No brownfield state was found at {path}")
            }
            Self::Invalid { path, reason } => {
                format!("The brownfield state file {path} could not be read: {reason}")
            }
            Self::UnsupportedSchema { path, version } => {
                format!(
                    "The state file {path} uses schema version {version}, which this version of brownfield cannot read"
                )
            }
            Self::PersistFailed { path, reason } => {
                format!("Could not save brownfield state to {path}: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => Some(
                "The state file is created by the first assessment of a project.".to_string(),
            ),
            Self::Invalid { .. } => Some(
                "The state file exists but is not valid JSON or is missing required fields."
                    .to_string(),
            ),
            Self::UnsupportedSchema { .. } => Some(
                "Older schema versions are migrated automatically; newer ones are refused."
                    .to_string(),
            ),
            Self::PersistFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec![
                "Run 'brownfield assess' to create the initial state".to_string(),
                "Check that you are running from the project root".to_string(),
            ],
            Self::Invalid { path, .. } => vec![
                format!("Inspect {path} for manual edits or truncation"),
                format!("Delete {path} and re-run 'brownfield assess' to start over"),
            ],
            Self::UnsupportedSchema { .. } => vec![
                "Upgrade brownfield to the version that wrote this state file".to_string(),
            ],
            Self::PersistFailed { .. } => vec![
                "Check free disk space and write permissions on the state directory".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::PersistFailed { .. } => ErrorCategory::FileSystem,
            _ => ErrorCategory::State,
        }
    }
}

/// Phase transition and prerequisite errors
#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Cannot enter {phase}: unmet preconditions: {}", unmet.join("; "))]
    PreconditionsUnmet { phase: String, unmet: Vec<String> },

    #[error("Cannot run {phase}: {reason}")]
    PrerequisiteNotMet {
        phase: String,
        reason: String,
        command: Option<String>,
    },

    #[error("Cannot finish {phase}: it is {status}, not in_progress")]
    NotInProgress { phase: String, status: String },
}

impl UserFriendlyError for PhaseError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidTransition { from, to } => {
                format!("Cannot transition from the {from} phase to the {to} phase")
            }
            Self::PreconditionsUnmet { phase, unmet } => {
                format!(
                    "The {phase} phase is not ready yet ({} unmet requirement(s)): {}",
                    unmet.len(),
                    unmet.join("; ")
                )
            }
            Self::PrerequisiteNotMet { phase, reason, .. } => {
                format!("The {phase} step is blocked: {reason}")
            }
            Self::NotInProgress { phase, status } => {
                format!("The {phase} step cannot be finished because it is {status}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidTransition { .. } => Some(
                "Phases advance in order: assessment → structure → testing → quality → validation → graduated."
                    .to_string(),
            ),
            Self::PreconditionsUnmet { .. } => Some(
                "Each phase has quantitative entry requirements recorded in the state file."
                    .to_string(),
            ),
            Self::PrerequisiteNotMet { .. } => Some(
                "Workflow steps must complete in order: assess → plan → remediate → validate → graduate."
                    .to_string(),
            ),
            Self::NotInProgress { .. } => Some(
                "A step is marked completed or failed only after it has been started.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidTransition { .. } => vec![
                "Check 'brownfield status' to see the current phase".to_string(),
                "Complete the current phase before moving on".to_string(),
            ],
            Self::PreconditionsUnmet { unmet, .. } => unmet
                .iter()
                .map(|requirement| format!("Satisfy: {requirement}"))
                .collect(),
            Self::PrerequisiteNotMet { command, .. } => match command {
                Some(command) => vec![format!("Run '{command}' first")],
                None => vec!["Fix the reported problem and retry the previous step".to_string()],
            },
            Self::NotInProgress { phase, .. } => {
                vec![format!("Start the {phase} step before recording its outcome")]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::PhaseTransition
    }
}

/// Checkpoint persistence errors
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("No checkpoint for phase {phase}")]
    NotFound { phase: String },

    #[error("Checkpoint for phase {phase} at {path} is corrupted: {reason}")]
    Corrupted {
        phase: String,
        path: String,
        reason: String,
    },

    #[error("Task {task_id} is not pending in the {phase} checkpoint")]
    TaskNotFound { phase: String, task_id: String },
}

impl UserFriendlyError for CheckpointError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { phase } => {
                format!("There is no saved progress for the {phase} phase")
            }
            Self::Corrupted { phase, path, reason } => {
                format!("Saved progress for the {phase} phase ({path}) is unreadable: {reason}")
            }
            Self::TaskNotFound { phase, task_id } => {
                format!("Task '{task_id}' is not a pending task of the {phase} phase")
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Checkpoints record completed and pending tasks so an interrupted phase can resume."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { phase } => vec![format!(
                "Start the {phase} phase from the beginning instead of resuming"
            )],
            Self::Corrupted { path, .. } => vec![
                format!("Delete {path} to restart the phase"),
                "Completed work is still recorded in git history".to_string(),
            ],
            Self::TaskNotFound { .. } => vec![
                "List pending tasks with 'brownfield resume --list'".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Checkpoint
    }
}

/// Readiness gate failures
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Gate {gate} failed: {current_value} vs threshold {threshold}")]
    Failed {
        gate: String,
        current_value: f64,
        threshold: f64,
        guidance: String,
    },
}

impl UserFriendlyError for GateError {
    fn user_message(&self) -> String {
        match self {
            Self::Failed {
                gate,
                current_value,
                threshold,
                ..
            } => format!("Readiness gate '{gate}' failed ({current_value} against {threshold})"),
        }
    }

    fn context(&self) -> Option<String> {
        Some("All readiness gates must pass before a project can graduate.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Failed { guidance, .. } => vec![guidance.clone()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::QualityGate
    }
}

/// Regression detector construction errors
#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("No baseline metrics recorded; regression detection needs a baseline")]
    MissingBaseline,
}

impl UserFriendlyError for RegressionError {
    fn user_message(&self) -> String {
        "Regression detection needs baseline metrics, but none are recorded".to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "Baselines are captured at first assessment and refreshed at graduation.".to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        vec!["Run 'brownfield assess' to capture baseline metrics".to_string()]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Regression
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with [state], [gates], [regression] and [checkpoints] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific range requirements."
            )),
            Self::NotFound { .. } => Some(
                "brownfield searches for .brownfield/config.toml starting from the current directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Compare with the example configuration in the documentation".to_string(),
            ],
            Self::InvalidValue { .. } => vec![
                "Remove the option to use the default value".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Create .brownfield/config.toml in your project root".to_string(),
                "Omit the explicit config path to use built-in defaults".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for BrownfieldError {
    fn user_message(&self) -> String {
        match self {
            Self::State(e) => e.user_message(),
            Self::Phase(e) => e.user_message(),
            Self::Checkpoint(e) => e.user_message(),
            Self::Gate(e) => e.user_message(),
            Self::Regression(e) => e.user_message(),
            Self::Config(e) => e.user_message(),
            Self::Io(e) => format!("File system operation failed: {e}"),
            Self::Internal(e) => format!("Internal error: {e:#}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::State(e) => e.context(),
            Self::Phase(e) => e.context(),
            Self::Checkpoint(e) => e.context(),
            Self::Gate(e) => e.context(),
            Self::Regression(e) => e.context(),
            Self::Config(e) => e.context(),
            Self::Io(_) | Self::Internal(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::State(e) => e.suggestions(),
            Self::Phase(e) => e.suggestions(),
            Self::Checkpoint(e) => e.suggestions(),
            Self::Gate(e) => e.suggestions(),
            Self::Regression(e) => e.suggestions(),
            Self::Config(e) => e.suggestions(),
            Self::Io(_) => vec![
                "Check file permissions in the project directory".to_string(),
                "Ensure sufficient disk space is available".to_string(),
            ],
            Self::Internal(_) => vec!["Re-run with RUST_LOG=brownfield=debug for details".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::State(e) => e.category(),
            Self::Phase(e) => e.category(),
            Self::Checkpoint(e) => e.category(),
            Self::Gate(e) => e.category(),
            Self::Regression(e) => e.category(),
            Self::Config(e) => e.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

impl BrownfieldError {
    /// Format the error for terminal display: message, context, suggestions.
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map the error onto the documented exit code table.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::State(StateError::NotFound { .. }) => ExitCode::STATE_NOT_FOUND,
            Self::State(StateError::Invalid { .. } | StateError::UnsupportedSchema { .. }) => {
                ExitCode::INVALID_STATE
            }
            Self::Phase(_) => ExitCode::PHASE_BLOCKED,
            Self::Checkpoint(_) => ExitCode::CHECKPOINT_UNAVAILABLE,
            Self::Gate(_) => ExitCode::GATE_FAILED,
            Self::Regression(_) => ExitCode::REGRESSION_BASELINE_MISSING,
            _ => ExitCode::INTERNAL,
        }
    }
}
