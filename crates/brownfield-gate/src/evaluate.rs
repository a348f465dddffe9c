use brownfield_config::GatesConfig;
use brownfield_model::{GateKind, Metrics, ReadinessGate};

const EPSILON: f64 = 1e-9;

/// Build the standard readiness gates from a metrics snapshot.
///
/// The git hygiene gate has no evaluator and always passes. The
/// documentation gate is only measured when `min_documentation_coverage`
/// is above zero.
#[must_use]
pub fn evaluate_readiness_gates(metrics: &Metrics, thresholds: &GatesConfig) -> Vec<ReadinessGate> {
    vec![
        coverage_gate(metrics, thresholds),
        complexity_gate(metrics, thresholds),
        structure_gate(metrics),
        build_gate(metrics),
        documentation_gate(metrics, thresholds),
        security_gate(metrics, thresholds),
        ReadinessGate::not_implemented(
            GateKind::GitHygiene.as_str(),
            "Repository history is clean and free of committed artifacts",
        ),
    ]
}

fn coverage_gate(metrics: &Metrics, thresholds: &GatesConfig) -> ReadinessGate {
    ReadinessGate::measured(
        GateKind::TestCoverage.as_str(),
        format!("Test coverage is at least {:.0}%", thresholds.min_coverage * 100.0),
        thresholds.min_coverage,
        metrics.test_coverage,
        metrics.test_coverage + EPSILON >= thresholds.min_coverage,
    )
    .with_verification("Run the coverage tool and read the total line coverage")
}

fn complexity_gate(metrics: &Metrics, thresholds: &GatesConfig) -> ReadinessGate {
    let passed = metrics.complexity_avg <= thresholds.max_complexity_avg + EPSILON
        && metrics.complexity_max <= thresholds.max_complexity + EPSILON;
    let exceptions = metrics
        .complexity_violations
        .iter()
        .map(|v| format!("{}::{}", v.file, v.function))
        .collect();

    ReadinessGate::measured(
        GateKind::Complexity.as_str(),
        format!(
            "Average complexity at most {} and no function above {}",
            thresholds.max_complexity_avg, thresholds.max_complexity
        ),
        thresholds.max_complexity_avg,
        metrics.complexity_avg,
        passed,
    )
    .with_verification("Run the complexity analyzer over the source tree")
    .with_exceptions(exceptions)
}

fn structure_gate(metrics: &Metrics) -> ReadinessGate {
    ReadinessGate::measured(
        GateKind::Structure.as_str(),
        "Source and test trees are present",
        1.0,
        metrics.test_loc as f64,
        metrics.total_loc > 0 && metrics.test_loc > 0,
    )
    .with_verification("Check that tests live in a dedicated test directory")
}

fn build_gate(metrics: &Metrics) -> ReadinessGate {
    let passing = metrics.build_status.is_passing();
    ReadinessGate::measured(
        GateKind::Build.as_str(),
        "The project builds cleanly",
        1.0,
        if passing { 1.0 } else { 0.0 },
        passing,
    )
    .with_verification("Run the project's build command")
}

fn documentation_gate(metrics: &Metrics, thresholds: &GatesConfig) -> ReadinessGate {
    let description = "Public APIs are documented";
    if thresholds.min_documentation_coverage <= 0.0 {
        return ReadinessGate::not_implemented(GateKind::Documentation.as_str(), description);
    }
    ReadinessGate::measured(
        GateKind::Documentation.as_str(),
        description,
        thresholds.min_documentation_coverage,
        metrics.documentation_coverage,
        metrics.documentation_coverage + EPSILON >= thresholds.min_documentation_coverage,
    )
}

fn security_gate(metrics: &Metrics, thresholds: &GatesConfig) -> ReadinessGate {
    let passed = metrics.critical_vulnerabilities <= thresholds.max_critical_vulnerabilities
        && metrics.secrets_found == 0;
    ReadinessGate::measured(
        GateKind::Security.as_str(),
        "No critical vulnerabilities or committed secrets",
        f64::from(thresholds.max_critical_vulnerabilities),
        f64::from(metrics.critical_vulnerabilities),
        passed,
    )
    .with_verification("Run the dependency and secret scanners")
}
