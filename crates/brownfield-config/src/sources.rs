use std::collections::BTreeMap;

use crate::model::{Config, ConfigSource};

fn source_label(source: &ConfigSource) -> &'static str {
    match source {
        ConfigSource::Programmatic => "programmatic",
        ConfigSource::ConfigFile(_) => "config",
        ConfigSource::Env => "env",
        ConfigSource::Defaults => "default",
    }
}

impl Config {
    /// Effective configuration as `key → (value, source)`, ordered by key.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let values: [(&str, String); 12] = [
            ("state.state_dir", self.state.state_dir.to_string()),
            (
                "state.legacy_checkpoint_dir",
                self.state.legacy_checkpoint_dir.to_string(),
            ),
            (
                "regression.coverage_drop_threshold",
                self.regression.coverage_drop_threshold.to_string(),
            ),
            (
                "regression.complexity_increase_threshold",
                self.regression.complexity_increase_threshold.to_string(),
            ),
            (
                "regression.warning_ratio",
                self.regression.warning_ratio.to_string(),
            ),
            ("gates.min_coverage", self.gates.min_coverage.to_string()),
            (
                "gates.max_complexity_avg",
                self.gates.max_complexity_avg.to_string(),
            ),
            ("gates.max_complexity", self.gates.max_complexity.to_string()),
            (
                "gates.max_critical_vulnerabilities",
                self.gates.max_critical_vulnerabilities.to_string(),
            ),
            (
                "gates.min_documentation_coverage",
                self.gates.min_documentation_coverage.to_string(),
            ),
            (
                "gates.justification_file",
                self.gates.justification_file.clone(),
            ),
            (
                "checkpoints.stale_after_minutes",
                self.checkpoints.stale_after_minutes.to_string(),
            ),
        ];

        values
            .into_iter()
            .map(|(key, value)| {
                let source = source_label(&self.source_of(key)).to_string();
                (key.to_string(), (value, source))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_config_covers_every_key() {
        let config = Config::builder().min_coverage(0.7).build().unwrap();
        let effective = config.effective_config();

        assert_eq!(effective.len(), Config::KEYS.len());
        for key in Config::KEYS {
            assert!(effective.contains_key(*key), "missing {key}");
        }
        assert_eq!(
            effective["gates.min_coverage"],
            ("0.7".to_string(), "programmatic".to_string())
        );
        assert_eq!(effective["gates.max_complexity"].1, "default");
    }
}
