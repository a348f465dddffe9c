use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Where an effective configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Programmatic,
    ConfigFile(PathBuf),
    Env,
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Programmatic => write!(f, "programmatic"),
            Self::ConfigFile(path) => write!(f, "config file ({})", path.display()),
            Self::Env => write!(f, "environment"),
            Self::Defaults => write!(f, "defaults"),
        }
    }
}

/// `[state]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    /// State directory; relative paths are resolved against the project root.
    pub state_dir: Utf8PathBuf,
    /// Checkpoint location used by older releases.
    pub legacy_checkpoint_dir: Utf8PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            state_dir: brownfield_utils::paths::brownfield_home(),
            legacy_checkpoint_dir: Utf8PathBuf::from(".specify/memory/checkpoints"),
        }
    }
}

/// `[regression]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// Coverage drop, in percentage points, that is critical.
    pub coverage_drop_threshold: f64,
    /// Relative average-complexity increase, in percent, that is critical.
    pub complexity_increase_threshold: f64,
    /// Fraction of a threshold at which a drift becomes a warning.
    pub warning_ratio: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            coverage_drop_threshold: 5.0,
            complexity_increase_threshold: 20.0,
            warning_ratio: 0.7,
        }
    }
}

/// `[gates]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatesConfig {
    pub min_coverage: f64,
    pub max_complexity_avg: f64,
    pub max_complexity: f64,
    pub max_critical_vulnerabilities: u32,
    pub min_documentation_coverage: f64,
    /// Complexity justification artifact, relative to the state directory.
    pub justification_file: String,
}

impl Default for GatesConfig {
    fn default() -> Self {
        Self {
            min_coverage: 0.60,
            max_complexity_avg: 10.0,
            max_complexity: 15.0,
            max_critical_vulnerabilities: 0,
            min_documentation_coverage: 0.0,
            justification_file: "complexity-justifications.json".to_string(),
        }
    }
}

/// `[checkpoints]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointsConfig {
    pub stale_after_minutes: u64,
}

impl Default for CheckpointsConfig {
    fn default() -> Self {
        Self {
            stale_after_minutes: 60,
        }
    }
}

/// Effective configuration with per-key source attribution.
#[derive(Debug, Clone)]
pub struct Config {
    pub state: StateConfig,
    pub regression: RegressionConfig,
    pub gates: GatesConfig,
    pub checkpoints: CheckpointsConfig,
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        let mut source_attribution = HashMap::new();
        for key in Self::KEYS {
            source_attribution.insert((*key).to_string(), ConfigSource::Defaults);
        }
        Self {
            state: StateConfig::default(),
            regression: RegressionConfig::default(),
            gates: GatesConfig::default(),
            checkpoints: CheckpointsConfig::default(),
            source_attribution,
        }
    }
}

impl Config {
    /// Every attributable key, as `section.field`.
    pub const KEYS: &'static [&'static str] = &[
        "state.state_dir",
        "state.legacy_checkpoint_dir",
        "regression.coverage_drop_threshold",
        "regression.complexity_increase_threshold",
        "regression.warning_ratio",
        "gates.min_coverage",
        "gates.max_complexity_avg",
        "gates.max_complexity",
        "gates.max_critical_vulnerabilities",
        "gates.min_documentation_coverage",
        "gates.justification_file",
        "checkpoints.stale_after_minutes",
    ];

    /// State directory for a project, resolving relative paths against `project_root`.
    #[must_use]
    pub fn state_dir_for(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        if self.state.state_dir.is_absolute() {
            self.state.state_dir.clone()
        } else {
            project_root.join(&self.state.state_dir)
        }
    }

    /// Legacy checkpoint directory for a project.
    #[must_use]
    pub fn legacy_checkpoint_dir_for(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        if self.state.legacy_checkpoint_dir.is_absolute() {
            self.state.legacy_checkpoint_dir.clone()
        } else {
            project_root.join(&self.state.legacy_checkpoint_dir)
        }
    }

    /// Age after which an un-updated checkpoint counts as abandoned.
    #[must_use]
    pub fn stale_after(&self) -> chrono::Duration {
        i64::try_from(self.checkpoints.stale_after_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }

    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .cloned()
            .unwrap_or(ConfigSource::Defaults)
    }
}
