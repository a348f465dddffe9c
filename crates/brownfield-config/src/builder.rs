use brownfield_utils::error::ConfigError;
use camino::Utf8PathBuf;

use crate::model::{Config, ConfigSource};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// ```rust
    /// use brownfield_config::Config;
    ///
    /// let config = Config::builder()
    ///     .state_dir("/tmp/project/.brownfield")
    ///     .coverage_drop_threshold(3.0)
    ///     .min_coverage(0.8)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.gates.min_coverage, 0.8);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for [`Config`] that never reads configuration files.
///
/// Values set here are attributed to `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    state_dir: Option<Utf8PathBuf>,
    legacy_checkpoint_dir: Option<Utf8PathBuf>,
    coverage_drop_threshold: Option<f64>,
    complexity_increase_threshold: Option<f64>,
    warning_ratio: Option<f64>,
    min_coverage: Option<f64>,
    max_complexity_avg: Option<f64>,
    max_complexity: Option<f64>,
    max_critical_vulnerabilities: Option<u32>,
    justification_file: Option<String>,
    stale_after_minutes: Option<u64>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn state_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn legacy_checkpoint_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.legacy_checkpoint_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn coverage_drop_threshold(mut self, points: f64) -> Self {
        self.coverage_drop_threshold = Some(points);
        self
    }

    #[must_use]
    pub fn complexity_increase_threshold(mut self, percent: f64) -> Self {
        self.complexity_increase_threshold = Some(percent);
        self
    }

    #[must_use]
    pub fn warning_ratio(mut self, ratio: f64) -> Self {
        self.warning_ratio = Some(ratio);
        self
    }

    #[must_use]
    pub fn min_coverage(mut self, ratio: f64) -> Self {
        self.min_coverage = Some(ratio);
        self
    }

    #[must_use]
    pub fn max_complexity_avg(mut self, value: f64) -> Self {
        self.max_complexity_avg = Some(value);
        self
    }

    #[must_use]
    pub fn max_complexity(mut self, value: f64) -> Self {
        self.max_complexity = Some(value);
        self
    }

    #[must_use]
    pub fn max_critical_vulnerabilities(mut self, count: u32) -> Self {
        self.max_critical_vulnerabilities = Some(count);
        self
    }

    #[must_use]
    pub fn justification_file(mut self, name: impl Into<String>) -> Self {
        self.justification_file = Some(name.into());
        self
    }

    #[must_use]
    pub fn stale_after_minutes(mut self, minutes: u64) -> Self {
        self.stale_after_minutes = Some(minutes);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut config = Config::default();
        let mut set = |key: &str| {
            config
                .source_attribution
                .insert(key.to_string(), ConfigSource::Programmatic);
        };

        if self.state_dir.is_some() {
            set("state.state_dir");
        }
        if self.legacy_checkpoint_dir.is_some() {
            set("state.legacy_checkpoint_dir");
        }
        if self.coverage_drop_threshold.is_some() {
            set("regression.coverage_drop_threshold");
        }
        if self.complexity_increase_threshold.is_some() {
            set("regression.complexity_increase_threshold");
        }
        if self.warning_ratio.is_some() {
            set("regression.warning_ratio");
        }
        if self.min_coverage.is_some() {
            set("gates.min_coverage");
        }
        if self.max_complexity_avg.is_some() {
            set("gates.max_complexity_avg");
        }
        if self.max_complexity.is_some() {
            set("gates.max_complexity");
        }
        if self.max_critical_vulnerabilities.is_some() {
            set("gates.max_critical_vulnerabilities");
        }
        if self.justification_file.is_some() {
            set("gates.justification_file");
        }
        if self.stale_after_minutes.is_some() {
            set("checkpoints.stale_after_minutes");
        }

        if let Some(v) = self.state_dir {
            config.state.state_dir = v;
        }
        if let Some(v) = self.legacy_checkpoint_dir {
            config.state.legacy_checkpoint_dir = v;
        }
        if let Some(v) = self.coverage_drop_threshold {
            config.regression.coverage_drop_threshold = v;
        }
        if let Some(v) = self.complexity_increase_threshold {
            config.regression.complexity_increase_threshold = v;
        }
        if let Some(v) = self.warning_ratio {
            config.regression.warning_ratio = v;
        }
        if let Some(v) = self.min_coverage {
            config.gates.min_coverage = v;
        }
        if let Some(v) = self.max_complexity_avg {
            config.gates.max_complexity_avg = v;
        }
        if let Some(v) = self.max_complexity {
            config.gates.max_complexity = v;
        }
        if let Some(v) = self.max_critical_vulnerabilities {
            config.gates.max_critical_vulnerabilities = v;
        }
        if let Some(v) = self.justification_file {
            config.gates.justification_file = v;
        }
        if let Some(v) = self.stale_after_minutes {
            config.checkpoints.stale_after_minutes = v;
        }

        config.validate()?;
        Ok(config)
    }
}
