use brownfield_utils::error::{BrownfieldError, ConfigError};
use camino::Utf8PathBuf;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::{Config, ConfigSource};

/// TOML configuration file structure; every key is optional.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    state: Option<TomlState>,
    regression: Option<TomlRegression>,
    gates: Option<TomlGates>,
    checkpoints: Option<TomlCheckpoints>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlState {
    state_dir: Option<Utf8PathBuf>,
    legacy_checkpoint_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlRegression {
    coverage_drop_threshold: Option<f64>,
    complexity_increase_threshold: Option<f64>,
    warning_ratio: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlGates {
    min_coverage: Option<f64>,
    max_complexity_avg: Option<f64>,
    max_complexity: Option<f64>,
    max_critical_vulnerabilities: Option<u32>,
    min_documentation_coverage: Option<f64>,
    justification_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlCheckpoints {
    stale_after_minutes: Option<u64>,
}

fn apply<T>(
    target: &mut T,
    value: Option<T>,
    key: &str,
    source: &ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if let Some(value) = value {
        *target = value;
        attribution.insert(key.to_string(), source.clone());
    }
}

impl Config {
    /// Discover and load configuration starting from the current directory.
    ///
    /// `explicit_path` skips discovery; it must exist.
    pub fn discover(explicit_path: Option<&Path>) -> Result<Self, BrownfieldError> {
        let start_dir = std::env::current_dir()?;
        Self::discover_from(&start_dir, explicit_path)
    }

    /// Discover and load configuration starting from `start_dir`.
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(
        start_dir: &Path,
        explicit_path: Option<&Path>,
    ) -> Result<Self, BrownfieldError> {
        let mut config = Config::default();

        let config_path = match explicit_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover_config_file_from(start_dir).or_else(Self::user_config_file),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            config.apply_file(file_config, &ConfigSource::ConfigFile(path.clone()));
            tracing::debug!(path = %path.display(), "Loaded configuration file");
        }

        if let Ok(home) = std::env::var("BROWNFIELD_HOME") {
            config.state.state_dir = Utf8PathBuf::from(home);
            config
                .source_attribution
                .insert("state.state_dir".to_string(), ConfigSource::Env);
        }

        config.validate()?;
        Ok(config)
    }

    /// Walk up from `start_dir` looking for `.brownfield/config.toml`.
    ///
    /// The search stops at the first directory containing `.git`, `.hg` or
    /// `.svn`, or at the filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(".brownfield").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                return None;
            }

            current_dir = current_dir.parent()?;
        }
    }

    /// `<config_dir>/brownfield/config.toml`, if present.
    fn user_config_file() -> Option<PathBuf> {
        let path = dirs::config_dir()?.join("brownfield").join("config.toml");
        path.exists().then_some(path)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig, BrownfieldError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                BrownfieldError::from(ConfigError::InvalidFile(format!(
                    "{}: {}",
                    path.display(),
                    e.message()
                )))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn apply_file(&mut self, file: TomlConfig, source: &ConfigSource) {
        let attribution = &mut self.source_attribution;

        if let Some(state) = file.state {
            apply(&mut self.state.state_dir, state.state_dir, "state.state_dir", source, attribution);
            apply(
                &mut self.state.legacy_checkpoint_dir,
                state.legacy_checkpoint_dir,
                "state.legacy_checkpoint_dir",
                source,
                attribution,
            );
        }

        if let Some(regression) = file.regression {
            apply(
                &mut self.regression.coverage_drop_threshold,
                regression.coverage_drop_threshold,
                "regression.coverage_drop_threshold",
                source,
                attribution,
            );
            apply(
                &mut self.regression.complexity_increase_threshold,
                regression.complexity_increase_threshold,
                "regression.complexity_increase_threshold",
                source,
                attribution,
            );
            apply(
                &mut self.regression.warning_ratio,
                regression.warning_ratio,
                "regression.warning_ratio",
                source,
                attribution,
            );
        }

        if let Some(gates) = file.gates {
            apply(&mut self.gates.min_coverage, gates.min_coverage, "gates.min_coverage", source, attribution);
            apply(
                &mut self.gates.max_complexity_avg,
                gates.max_complexity_avg,
                "gates.max_complexity_avg",
                source,
                attribution,
            );
            apply(
                &mut self.gates.max_complexity,
                gates.max_complexity,
                "gates.max_complexity",
                source,
                attribution,
            );
            apply(
                &mut self.gates.max_critical_vulnerabilities,
                gates.max_critical_vulnerabilities,
                "gates.max_critical_vulnerabilities",
                source,
                attribution,
            );
            apply(
                &mut self.gates.min_documentation_coverage,
                gates.min_documentation_coverage,
                "gates.min_documentation_coverage",
                source,
                attribution,
            );
            apply(
                &mut self.gates.justification_file,
                gates.justification_file,
                "gates.justification_file",
                source,
                attribution,
            );
        }

        if let Some(checkpoints) = file.checkpoints {
            apply(
                &mut self.checkpoints.stale_after_minutes,
                checkpoints.stale_after_minutes,
                "checkpoints.stale_after_minutes",
                source,
                attribution,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brownfield_utils::paths::with_isolated_home;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let config_dir = dir.join(".brownfield");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_discovery_walks_up_to_config() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let expected = write_config(temp.path(), "");
        let nested = temp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_config_file_from(&nested), Some(expected));
    }

    #[test]
    fn test_discovery_stops_at_repository_root() {
        let outer = TempDir::new().unwrap();
        write_config(outer.path(), "");
        let repo = outer.path().join("repo");
        std::fs::create_dir_all(repo.join(".git")).unwrap();

        assert_eq!(Config::discover_config_file_from(&repo), None);
    }

    #[test]
    #[serial]
    fn test_file_values_override_defaults_with_attribution() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let path = write_config(
            temp.path(),
            "[regression]\ncoverage_drop_threshold = 3.0\n\n[gates]\nmin_coverage = 0.8\n",
        );

        let config = Config::discover_from(temp.path(), None).unwrap();

        assert_eq!(config.regression.coverage_drop_threshold, 3.0);
        assert_eq!(config.regression.complexity_increase_threshold, 20.0);
        assert_eq!(config.gates.min_coverage, 0.8);
        assert_eq!(
            config.source_of("gates.min_coverage"),
            ConfigSource::ConfigFile(path)
        );
        assert_eq!(config.source_of("gates.max_complexity"), ConfigSource::Defaults);
    }

    #[test]
    #[serial]
    fn test_invalid_toml_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[gates\nmin_coverage = ");

        let err = Config::discover_from(temp.path(), Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            BrownfieldError::Config(ConfigError::InvalidFile(_))
        ));
    }

    #[test]
    #[serial]
    fn test_out_of_range_value_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[regression]\nwarning_ratio = 1.5\n");

        let err = Config::discover_from(temp.path(), Some(&path)).unwrap_err();
        match err {
            BrownfieldError::Config(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "regression.warning_ratio");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_explicit_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");

        let err = Config::discover_from(temp.path(), Some(&missing)).unwrap_err();
        assert!(matches!(err, BrownfieldError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    #[serial]
    fn test_default_state_dir_follows_home() {
        let home = with_isolated_home();
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[gates]\nmin_coverage = 0.7\n");

        let config = Config::discover_from(temp.path(), Some(&path)).unwrap();

        assert_eq!(config.state.state_dir, home.home());
        assert_eq!(config.source_of("state.state_dir"), ConfigSource::Defaults);
    }

    #[test]
    #[serial]
    fn test_env_home_overrides_state_dir() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "[state]\nstate_dir = \"from-file\"\n");

        // SAFETY: serialized with other env-mutating tests.
        unsafe { std::env::set_var("BROWNFIELD_HOME", "/tmp/bf-env") };
        let config = Config::discover_from(temp.path(), Some(&path));
        unsafe { std::env::remove_var("BROWNFIELD_HOME") };

        let config = config.unwrap();
        assert_eq!(config.state.state_dir, "/tmp/bf-env");
        assert_eq!(config.source_of("state.state_dir"), ConfigSource::Env);
    }
}
