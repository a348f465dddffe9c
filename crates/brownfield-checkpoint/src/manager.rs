use brownfield_model::{Phase, PhaseCheckpoint, Task};
use brownfield_utils::atomic_write::{read_if_exists, remove_if_exists};
use brownfield_utils::canonicalization::write_json_atomic;
use brownfield_utils::error::{BrownfieldError, CheckpointError};
use brownfield_utils::paths;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Whether and where a phase can be resumed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumptionOptions {
    pub phase: Phase,
    pub can_resume: bool,
    pub completed_count: usize,
    pub pending_count: usize,
    pub progress_percent: f64,
    pub next_task: Option<Task>,
    /// Why resumption is not possible.
    pub reason: Option<String>,
}

/// One line of [`CheckpointManager::list_all_checkpoints`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckpointSummary {
    pub phase: Phase,
    pub path: Utf8PathBuf,
    pub timestamp: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub interrupted: bool,
    pub completed_count: usize,
    pub pending_count: usize,
    pub progress_percent: f64,
}

impl CheckpointSummary {
    fn of(checkpoint: &PhaseCheckpoint, path: Utf8PathBuf) -> Self {
        Self {
            phase: checkpoint.phase,
            path,
            timestamp: checkpoint.timestamp,
            started_at: checkpoint.started_at,
            interrupted: checkpoint.interrupted,
            completed_count: checkpoint.completed_tasks.len(),
            pending_count: checkpoint.pending_tasks.len(),
            progress_percent: checkpoint.progress_percent(),
        }
    }
}

/// Reads and writes the checkpoint files of one project.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: Utf8PathBuf,
}

impl CheckpointManager {
    pub fn new(checkpoint_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: checkpoint_dir.into(),
        }
    }

    /// Manager for `<state_dir>/checkpoints`.
    #[must_use]
    pub fn for_state_dir(state_dir: &Utf8Path) -> Self {
        Self::new(paths::checkpoint_dir(state_dir))
    }

    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    #[must_use]
    pub fn checkpoint_path(&self, phase: Phase) -> Utf8PathBuf {
        self.dir.join(format!("{}_checkpoint.json", phase.as_str()))
    }

    /// Save task progress for `phase`, replacing any previous checkpoint.
    ///
    /// `started_at` is carried over from the previous checkpoint of the same
    /// phase, and the timestamp never moves backwards. Every task in
    /// `completed_tasks` is stored as completed.
    pub fn save_checkpoint(
        &self,
        phase: Phase,
        mut completed_tasks: Vec<Task>,
        pending_tasks: Vec<Task>,
        context: Option<BTreeMap<String, serde_json::Value>>,
        interrupted: bool,
    ) -> Result<Utf8PathBuf, BrownfieldError> {
        let now = Utc::now();
        let previous = self.load_checkpoint(phase).unwrap_or_else(|e| {
            warn!(phase = %phase, error = %e, "Replacing unreadable checkpoint");
            None
        });

        for task in &mut completed_tasks {
            task.completed = true;
            task.completed_at.get_or_insert(now);
        }

        let mut checkpoint = PhaseCheckpoint::new(phase, completed_tasks, pending_tasks, now);
        checkpoint.interrupted = interrupted;
        checkpoint.context = context.unwrap_or_default();
        if let Some(previous) = previous {
            checkpoint.started_at = previous.started_at;
            checkpoint.timestamp = previous.timestamp;
            checkpoint.touch(now);
        }

        self.save(&checkpoint)
    }

    /// Persist `checkpoint` as-is.
    pub fn save(&self, checkpoint: &PhaseCheckpoint) -> Result<Utf8PathBuf, BrownfieldError> {
        let path = self.checkpoint_path(checkpoint.phase);
        write_json_atomic(&path, checkpoint)?;
        debug!(
            phase = %checkpoint.phase,
            completed = checkpoint.completed_tasks.len(),
            pending = checkpoint.pending_tasks.len(),
            interrupted = checkpoint.interrupted,
            "Saved checkpoint"
        );
        Ok(path)
    }

    /// Load the checkpoint for `phase`, `None` when there is none.
    ///
    /// A file that records a different phase is reported as corrupted.
    pub fn load_checkpoint(&self, phase: Phase) -> Result<Option<PhaseCheckpoint>, BrownfieldError> {
        let path = self.checkpoint_path(phase);
        let Some(content) = read_if_exists(&path)? else {
            return Ok(None);
        };
        parse_checkpoint(&content, &path, phase).map(Some)
    }

    /// Load the checkpoint for `phase`, failing when there is none.
    pub fn require_checkpoint(&self, phase: Phase) -> Result<PhaseCheckpoint, BrownfieldError> {
        self.load_checkpoint(phase)?.ok_or_else(|| {
            CheckpointError::NotFound {
                phase: phase.to_string(),
            }
            .into()
        })
    }

    pub fn mark_interrupted(&self, phase: Phase) -> Result<(), BrownfieldError> {
        let mut checkpoint = self.require_checkpoint(phase)?;
        checkpoint.interrupted = true;
        checkpoint.touch(Utc::now());
        self.save(&checkpoint)?;
        info!(phase = %phase, "Marked checkpoint interrupted");
        Ok(())
    }

    /// Whether the checkpoint for `phase` carries the interrupted flag.
    pub fn detect_interruption(&self, phase: Phase) -> Result<bool, BrownfieldError> {
        Ok(self
            .load_checkpoint(phase)?
            .is_some_and(|checkpoint| checkpoint.interrupted))
    }

    /// Whether the checkpoint for `phase` has gone un-updated for over `max_age`.
    pub fn detect_stale(
        &self,
        phase: Phase,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, BrownfieldError> {
        Ok(self
            .load_checkpoint(phase)?
            .is_some_and(|checkpoint| checkpoint.is_stale(max_age, now)))
    }

    pub fn get_resumption_options(&self, phase: Phase) -> Result<ResumptionOptions, BrownfieldError> {
        let Some(checkpoint) = self.load_checkpoint(phase)? else {
            return Ok(ResumptionOptions {
                phase,
                can_resume: false,
                completed_count: 0,
                pending_count: 0,
                progress_percent: 0.0,
                next_task: None,
                reason: Some(format!("No checkpoint found for the {phase} phase")),
            });
        };

        let reason = (!checkpoint.interrupted)
            .then(|| format!("The {phase} phase was not interrupted"));

        Ok(ResumptionOptions {
            phase,
            can_resume: checkpoint.interrupted,
            completed_count: checkpoint.completed_tasks.len(),
            pending_count: checkpoint.pending_tasks.len(),
            progress_percent: checkpoint.progress_percent(),
            next_task: checkpoint.next_pending_task().cloned(),
            reason,
        })
    }

    /// Move `task_id` from pending to completed and persist.
    pub fn mark_task_complete(
        &self,
        phase: Phase,
        task_id: &str,
        commit_id: Option<String>,
    ) -> Result<PhaseCheckpoint, BrownfieldError> {
        let mut checkpoint = self.require_checkpoint(phase)?;
        if checkpoint
            .mark_task_complete(task_id, commit_id, Utc::now())
            .is_none()
        {
            return Err(CheckpointError::TaskNotFound {
                phase: phase.to_string(),
                task_id: task_id.to_string(),
            }
            .into());
        }
        self.save(&checkpoint)?;
        Ok(checkpoint)
    }

    /// Delete the checkpoint for `phase`; returns whether one existed.
    pub fn clear_checkpoint(&self, phase: Phase) -> Result<bool, BrownfieldError> {
        let removed = remove_if_exists(&self.checkpoint_path(phase))?;
        if removed {
            info!(phase = %phase, "Cleared checkpoint");
        }
        Ok(removed)
    }

    /// Summaries of every readable checkpoint, most recently updated first.
    ///
    /// Corrupted checkpoints are skipped with a warning.
    pub fn list_all_checkpoints(&self) -> Result<Vec<CheckpointSummary>, BrownfieldError> {
        let mut summaries = Vec::new();
        for phase in Phase::ALL {
            match self.load_checkpoint(phase) {
                Ok(Some(checkpoint)) => {
                    summaries.push(CheckpointSummary::of(&checkpoint, self.checkpoint_path(phase)));
                }
                Ok(None) => {}
                Err(BrownfieldError::Checkpoint(e @ CheckpointError::Corrupted { .. })) => {
                    warn!(phase = %phase, error = %e, "Skipping corrupted checkpoint");
                }
                Err(e) => return Err(e),
            }
        }
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(summaries)
    }

    /// The most recently updated interrupted checkpoint, if any.
    pub fn most_recent_interrupted(&self) -> Result<Option<CheckpointSummary>, BrownfieldError> {
        Ok(self
            .list_all_checkpoints()?
            .into_iter()
            .find(|summary| summary.interrupted))
    }
}

pub(crate) fn parse_checkpoint(
    content: &str,
    path: &Utf8Path,
    phase: Phase,
) -> Result<PhaseCheckpoint, BrownfieldError> {
    let corrupted = |reason: String| CheckpointError::Corrupted {
        phase: phase.to_string(),
        path: path.to_string(),
        reason,
    };
    let checkpoint: PhaseCheckpoint =
        serde_json::from_str(content).map_err(|e| corrupted(e.to_string()))?;
    if checkpoint.phase != phase {
        return Err(corrupted(format!("file records phase {}", checkpoint.phase)).into());
    }
    Ok(checkpoint)
}
