use brownfield_config::Config;
use brownfield_model::{BrownfieldState, Metrics};
use brownfield_utils::atomic_write::read_if_exists;
use brownfield_utils::canonicalization::write_json_atomic;
use brownfield_utils::error::{BrownfieldError, StateError};
use brownfield_utils::paths;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::migration::{Migration, migrate_value};

/// File-backed store for one project's [`BrownfieldState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    state_dir: Utf8PathBuf,
}

impl StateStore {
    pub fn new(state_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Store rooted at the configured state directory of `project_root`.
    #[must_use]
    pub fn from_config(config: &Config, project_root: &Utf8Path) -> Self {
        Self::new(config.state_dir_for(project_root))
    }

    #[must_use]
    pub fn state_dir(&self) -> &Utf8Path {
        &self.state_dir
    }

    #[must_use]
    pub fn state_path(&self) -> Utf8PathBuf {
        paths::state_file(&self.state_dir)
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.state_path().is_file()
    }

    /// Load the state, migrating older schemas.
    ///
    /// A migrated state is written back immediately so migration runs once.
    pub fn load(&self) -> Result<BrownfieldState, BrownfieldError> {
        let path = self.state_path();
        let content = read_if_exists(&path)?.ok_or_else(|| StateError::NotFound {
            path: path.to_string(),
        })?;

        let mut value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StateError::Invalid {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let migration = migrate_value(&mut value, Utc::now());
        if let Migration::Unsupported { version } = &migration {
            return Err(StateError::UnsupportedSchema {
                path: path.to_string(),
                version: version.clone(),
            }
            .into());
        }

        let state: BrownfieldState =
            serde_json::from_value(value).map_err(|e| StateError::Invalid {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        if let Migration::Migrated { from } = migration {
            warn!(
                path = %path,
                from = %from,
                to = %state.schema_version,
                "Migrated state file to current schema"
            );
            self.save(&state)?;
        }

        Ok(state)
    }

    /// Load the state if one exists.
    pub fn load_optional(&self) -> Result<Option<BrownfieldState>, BrownfieldError> {
        if self.exists() {
            self.load().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Atomically replace the state file.
    pub fn save(&self, state: &BrownfieldState) -> Result<Utf8PathBuf, BrownfieldError> {
        let path = self.state_path();
        write_json_atomic(&path, state).map_err(|e| StateError::PersistFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;
        info!(
            path = %path,
            phase = %state.current_phase,
            workflow_phase = %state.workflow_state.current_phase,
            "Saved state"
        );
        Ok(path)
    }

    /// Create and persist a fresh state, replacing any previous one.
    pub fn create(
        &self,
        project_root: impl Into<Utf8PathBuf>,
        baseline_metrics: Option<Metrics>,
        now: DateTime<Utc>,
    ) -> Result<BrownfieldState, BrownfieldError> {
        let state = BrownfieldState::new(project_root, baseline_metrics, now);
        self.save(&state)?;
        Ok(state)
    }

    /// Write a timestamped copy to `<state_dir>/archive/`. The live file is untouched.
    ///
    /// Names carry microseconds; an existing archive with the same name gets a
    /// numeric suffix rather than being overwritten.
    pub fn archive(
        &self,
        state: &BrownfieldState,
        now: DateTime<Utc>,
    ) -> Result<Utf8PathBuf, BrownfieldError> {
        let dir = paths::archive_dir(&self.state_dir);
        let stamp = now.format("%Y%m%d_%H%M%S_%6f").to_string();
        let mut path = dir.join(format!("state-{stamp}.json"));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("state-{stamp}-{n}.json"));
            n += 1;
        }
        write_json_atomic(&path, state).map_err(|e| StateError::PersistFailed {
            path: path.to_string(),
            reason: format!("{e:#}"),
        })?;
        info!(path = %path, "Archived state");
        Ok(path)
    }
}
