//! Workflow control for brownfield
//!
//! Two state machines share one persisted [`BrownfieldState`](brownfield_model::BrownfieldState):
//!
//! - [`phase_machine`]: the remediation phases
//!   (`assessment → structure → testing → quality → validation → graduated`),
//!   guarded by an adjacency table and per-phase preconditions.
//! - [`enforcer`]: the command sequence
//!   (`assess → plan → remediate → validate → graduate → speckit`), guarded by
//!   prerequisite completion.
//!
//! [`reentry`] sends a graduated project back into remediation when the
//! regression detector reports a critical drift.

pub mod enforcer;
pub mod graduation;
pub mod phase_machine;
pub mod reentry;

pub use enforcer::{ExecutionCheck, WorkflowEnforcer, prerequisites};
pub use graduation::{graduate, record_gate_outcome};
pub use phase_machine::{
    TransitionCheck, advance, advance_with_validation, allowed_transitions, can_advance_to,
    mark_phase_complete,
};
pub use reentry::{force_reentry, resolve_reentry_events, trigger_reentry};
