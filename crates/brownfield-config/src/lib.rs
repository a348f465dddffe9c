//! Configuration for brownfield
//!
//! Precedence: programmatic/explicit path > discovered file > built-in defaults.
//! Discovery walks up from the working directory looking for
//! `.brownfield/config.toml`, stopping at a repository root, and falls back to
//! the user config directory.

mod builder;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use model::{
    CheckpointsConfig, Config, ConfigSource, GatesConfig, RegressionConfig, StateConfig,
};
