use brownfield_model::{GateKind, ReadinessGate};

/// Remediation advice for a failed gate, tiered by distance from threshold.
#[must_use]
pub fn remediation_guidance(gate: &ReadinessGate) -> String {
    let advice = match gate.kind() {
        Some(GateKind::TestCoverage) => coverage_guidance(gate),
        Some(GateKind::Complexity) => complexity_guidance(gate),
        Some(GateKind::Security) => format!(
            "Resolve {} critical vulnerabilit{} and remove any committed secrets; rotate exposed credentials.",
            gate.current_value,
            if (gate.current_value - 1.0).abs() < f64::EPSILON { "y" } else { "ies" }
        ),
        Some(GateKind::Build) => {
            "Fix the build first: every later gate depends on a working build.".to_string()
        }
        Some(GateKind::Structure) => {
            "Separate source and test code into conventional directories and add a test tree."
                .to_string()
        }
        Some(GateKind::Documentation) => format!(
            "Document public APIs: coverage is {:.0}%, target is {:.0}%.",
            gate.current_value * 100.0,
            gate.threshold * 100.0
        ),
        Some(GateKind::GitHygiene) => {
            "Remove build artifacts from history and add a .gitignore.".to_string()
        }
        None => format!("Bring {} from {} to {}.", gate.name, gate.current_value, gate.threshold),
    };

    if gate.remediation.is_empty() {
        advice
    } else {
        format!("{advice} {}", gate.remediation)
    }
}

fn coverage_guidance(gate: &ReadinessGate) -> String {
    let current = gate.current_value * 100.0;
    let target = gate.threshold * 100.0;
    if gate.current_value < 0.30 {
        format!(
            "Coverage is {current:.1}% (target {target:.0}%). Start with smoke tests for the main entry points, then cover the most-changed modules."
        )
    } else if gate.current_value < 0.50 {
        format!(
            "Coverage is {current:.1}% (target {target:.0}%). You're close: add unit tests for untested branches in core modules."
        )
    } else {
        format!(
            "Coverage is {current:.1}% (target {target:.0}%). Just a bit more: cover the remaining error paths."
        )
    }
}

fn complexity_guidance(gate: &ReadinessGate) -> String {
    let ratio = if gate.threshold > 0.0 {
        gate.current_value / gate.threshold
    } else {
        f64::INFINITY
    };
    let hotspots = if gate.exceptions.is_empty() {
        String::new()
    } else {
        format!(" Hotspots: {}.", gate.exceptions.join(", "))
    };

    if ratio > 2.0 {
        format!(
            "Average complexity {:.1} is more than double the limit {:.1}. Split large functions and extract modules before adding features.{hotspots}",
            gate.current_value, gate.threshold
        )
    } else if ratio > 1.0 {
        format!(
            "Average complexity {:.1} exceeds {:.1}. Refactor the most complex functions with guard clauses and helper extraction.{hotspots}",
            gate.current_value, gate.threshold
        )
    } else {
        format!(
            "Average complexity is within limits but individual functions exceed the maximum. Refactor or justify them.{hotspots}"
        )
    }
}
