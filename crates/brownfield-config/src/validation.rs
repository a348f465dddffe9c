use brownfield_utils::error::ConfigError;

use crate::model::Config;

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

fn require_ratio(key: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(key, format!("{value} is outside the range 0.0..=1.0")));
    }
    Ok(())
}

fn require_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(key, format!("{value} must be a positive number")));
    }
    Ok(())
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state.state_dir.as_str().is_empty() {
            return Err(invalid("state.state_dir", "must not be empty"));
        }

        require_positive(
            "regression.coverage_drop_threshold",
            self.regression.coverage_drop_threshold,
        )?;
        require_positive(
            "regression.complexity_increase_threshold",
            self.regression.complexity_increase_threshold,
        )?;
        if self.regression.warning_ratio <= 0.0 || self.regression.warning_ratio > 1.0 {
            return Err(invalid(
                "regression.warning_ratio",
                format!("{} must be in the range (0.0, 1.0]", self.regression.warning_ratio),
            ));
        }

        require_ratio("gates.min_coverage", self.gates.min_coverage)?;
        require_ratio(
            "gates.min_documentation_coverage",
            self.gates.min_documentation_coverage,
        )?;
        require_positive("gates.max_complexity_avg", self.gates.max_complexity_avg)?;
        require_positive("gates.max_complexity", self.gates.max_complexity)?;
        if self.gates.max_complexity < self.gates.max_complexity_avg {
            return Err(invalid(
                "gates.max_complexity",
                format!(
                    "{} is below gates.max_complexity_avg ({})",
                    self.gates.max_complexity, self.gates.max_complexity_avg
                ),
            ));
        }
        if self.gates.justification_file.trim().is_empty() {
            return Err(invalid("gates.justification_file", "must not be empty"));
        }

        if self.checkpoints.stale_after_minutes == 0 {
            return Err(invalid(
                "checkpoints.stale_after_minutes",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(err: ConfigError) -> String {
        match err {
            ConfigError::InvalidValue { key, .. } => key,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_rejections_name_the_key() {
        let mut config = Config::default();
        config.gates.min_coverage = 1.2;
        assert_eq!(key_of(config.validate().unwrap_err()), "gates.min_coverage");

        let mut config = Config::default();
        config.regression.coverage_drop_threshold = 0.0;
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "regression.coverage_drop_threshold"
        );

        let mut config = Config::default();
        config.gates.max_complexity = 5.0;
        assert_eq!(key_of(config.validate().unwrap_err()), "gates.max_complexity");

        let mut config = Config::default();
        config.checkpoints.stale_after_minutes = 0;
        assert_eq!(
            key_of(config.validate().unwrap_err()),
            "checkpoints.stale_after_minutes"
        );
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let mut config = Config::default();
        config.gates.max_complexity_avg = f64::NAN;
        assert!(config.validate().is_err());
    }
}
