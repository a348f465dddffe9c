//! Readiness gates
//!
//! [`evaluate_readiness_gates`] turns a metrics snapshot into the standard
//! gates; [`GateValidator`] aggregates any gate list, writes remediation
//! guidance for failures, and recommends the phase to return to.

mod evaluate;
mod guidance;
mod justification;
mod validator;

pub use evaluate::evaluate_readiness_gates;
pub use guidance::remediation_guidance;
pub use justification::{ComplexityJustification, ComplexityJustifications};
pub use validator::{FailedGate, GateValidationResult, GateValidator, recommend_next_phase};
