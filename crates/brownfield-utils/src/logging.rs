//! Structured logging for brownfield
//!
//! Library crates emit `tracing` events at decision points; binaries and tests
//! that want to see them call [`init_tracing`] once.

use tracing::{Level, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `brownfield=info,warn`,
/// or `brownfield=debug,info` when `verbose` is true. Verbose output also
/// reports span close events with timings.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("brownfield=debug,info")
            } else {
                EnvFilter::try_new("brownfield=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_span_events(if verbose {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

/// Span covering one phase of work for a project.
pub fn phase_span(project: &str, phase: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "phase",
        project = %project,
        phase = %phase,
    )
}

/// Log a legacy phase transition.
pub fn log_transition(project: &str, from: &str, to: &str) {
    info!(project = %project, from = %from, to = %to, "Phase transition");
}

/// Log a forced re-entry caused by a regression.
pub fn log_reentry(project: &str, trigger: &str, target: &str) {
    warn!(
        project = %project,
        trigger = %trigger,
        target = %target,
        "Regression forced re-entry"
    );
}
