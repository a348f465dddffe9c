//! State model for the brownfield remediation workflow
//!
//! Plain records with small derived-value helpers. Everything here is
//! serializable and is persisted either in the aggregate state file or in a
//! per-phase checkpoint file. Decisions (transitions, gates, regressions) live
//! in the engine crates.

pub mod checkpoint;
pub mod gate;
pub mod metrics;
pub mod phase;
pub mod reentry;
pub mod state;
pub mod workflow;

pub use checkpoint::{PhaseCheckpoint, Task, TaskStatus};
pub use gate::{GateEvaluation, GateKind, ReadinessGate};
pub use metrics::{BuildStatus, ComplexityViolation, Metrics};
pub use phase::Phase;
pub use reentry::{ReEntryEvent, ReEntryTrigger};
pub use state::{BrownfieldState, SCHEMA_VERSION, SpecKitState, timestamps};
pub use workflow::{PhaseExecution, PhaseStatus, WorkflowPhase, WorkflowState};
