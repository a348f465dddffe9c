//! brownfield - phase-gated remediation workflow for legacy codebases
//!
//! brownfield keeps one persisted state per project and decides, from metric
//! snapshots supplied by external analyzers, where the project stands:
//!
//! - **Remediation phases**: `assessment → structure → testing → quality →
//!   validation → graduated`, each entered only when its preconditions hold.
//! - **Command workflow**: `assess → plan → remediate → validate → graduate →
//!   speckit`, each step blocked until its prerequisite completed.
//! - **Checkpoints**: per-phase task progress that survives interruption.
//! - **Readiness gates**: quantitative checks that must all pass before
//!   graduation, with remediation guidance for failures.
//! - **Regression detection**: drift from the graduation baseline that, when
//!   critical, sends the project back into remediation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use brownfield::{Config, Metrics, Project};
//! use chrono::Utc;
//!
//! # fn main() -> Result<(), brownfield::BrownfieldError> {
//! let config = Config::discover(None)?;
//! let (project, _migrated) = Project::open("/path/to/repo", config)?;
//!
//! let baseline = Metrics { test_coverage: 0.42, ..Metrics::default() };
//! let mut state = project.assess(baseline, Utc::now())?;
//!
//! let gates = project.validate_gates(&mut state, Utc::now())?;
//! for failure in &gates.failed {
//!     println!("{}: {}", failure.gate.name, failure.guidance);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Persistence
//!
//! State and checkpoint files are JCS (RFC 8785) canonical JSON written
//! atomically, so an unchanged state saves byte-for-byte identically and a
//! crash never leaves a half-written file.

mod project;

pub use project::{Project, RegressionReport};

/// Configuration with discovery and precedence:
/// programmatic > config file > built-in defaults.
pub use brownfield_config::{Config, ConfigBuilder, ConfigSource};

/// Library error type. Use [`display_for_user()`](BrownfieldError::display_for_user)
/// for messages and [`to_exit_code()`](BrownfieldError::to_exit_code) for
/// process exit codes. Library code never exits the process.
pub use brownfield_utils::error::BrownfieldError;

pub use brownfield_utils::exit_codes::ExitCode;

pub use brownfield_utils::canonicalization::emit_jcs;
pub use brownfield_utils::logging::init_tracing;

pub use brownfield_model::{
    BrownfieldState, BuildStatus, GateEvaluation, GateKind, Metrics, Phase, PhaseCheckpoint,
    PhaseExecution, PhaseStatus, ReEntryEvent, ReEntryTrigger, ReadinessGate, Task,
    WorkflowPhase,
};

pub use brownfield_checkpoint::{CheckpointManager, CheckpointSummary, ResumptionOptions};
pub use brownfield_engine::{
    ExecutionCheck, TransitionCheck, WorkflowEnforcer, advance_with_validation, can_advance_to,
    force_reentry, graduate, mark_phase_complete, trigger_reentry,
};
pub use brownfield_gate::{GateValidationResult, GateValidator, evaluate_readiness_gates};
pub use brownfield_regression::{
    RegressionDetection, RegressionDetector, RegressionSeverity, RegressionThresholds,
    check_for_regressions, should_trigger_reentry,
};
pub use brownfield_store::StateStore;

// Crate-level access for callers that need the full surface.
pub use brownfield_checkpoint as checkpoint;
pub use brownfield_config as config;
pub use brownfield_engine as engine;
pub use brownfield_gate as gate;
pub use brownfield_model as model;
pub use brownfield_regression as regression;
pub use brownfield_store as store;
pub use brownfield_utils as utils;
