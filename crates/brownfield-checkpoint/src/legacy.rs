use brownfield_utils::atomic_write::write_file_atomic;
use brownfield_utils::error::BrownfieldError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fs;
use tracing::{info, warn};

use crate::manager::CheckpointManager;

/// Outcome of [`CheckpointManager::migrate_legacy_checkpoints`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LegacyMigrationReport {
    /// Files copied into the current checkpoint directory.
    pub migrated: Vec<Utf8PathBuf>,
    /// Files left in place because the destination already existed.
    pub skipped: Vec<Utf8PathBuf>,
    pub legacy_dir_removed: bool,
}

impl CheckpointManager {
    /// Move checkpoint files from an older location into this manager's directory.
    ///
    /// Existing destination files are never overwritten; their legacy copies
    /// are left where they are. Each migrated source file is removed once its
    /// copy is durable, and the legacy directory is removed when it ends up
    /// empty. Running this again is a no-op.
    pub fn migrate_legacy_checkpoints(
        &self,
        legacy_dir: &Utf8Path,
    ) -> Result<LegacyMigrationReport, BrownfieldError> {
        let mut report = LegacyMigrationReport::default();
        if !legacy_dir.is_dir() || legacy_dir == self.dir() {
            return Ok(report);
        }

        let mut entries: Vec<Utf8PathBuf> = Vec::new();
        for entry in fs::read_dir(legacy_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(path) => entries.push(path),
                Err(path) => warn!(path = %path.display(), "Skipping non-UTF-8 legacy checkpoint"),
            }
        }
        entries.sort();

        for source in entries {
            let Some(name) = source.file_name() else {
                continue;
            };
            let destination = self.dir().join(name);
            if destination.exists() {
                report.skipped.push(source);
                continue;
            }

            let content = fs::read(&source)?;
            write_file_atomic(&destination, &content)?;
            fs::remove_file(&source)?;
            report.migrated.push(destination);
        }

        if fs::read_dir(legacy_dir)?.next().is_none() {
            fs::remove_dir(legacy_dir)?;
            report.legacy_dir_removed = true;
        }

        if !report.migrated.is_empty() || report.legacy_dir_removed {
            info!(
                from = %legacy_dir,
                to = %self.dir(),
                migrated = report.migrated.len(),
                skipped = report.skipped.len(),
                "Migrated legacy checkpoints"
            );
        }
        Ok(report)
    }
}
