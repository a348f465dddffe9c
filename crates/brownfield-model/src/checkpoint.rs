use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// One unit of remediation work inside a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub phase: Phase,
    #[serde(default)]
    pub estimate_hours: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, description: impl Into<String>, phase: Phase) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            phase,
            estimate_hours: 0.0,
            completed: false,
            error_message: None,
            commit_id: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimate_hours = hours;
        self
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else if self.error_message.is_some() {
            TaskStatus::Failed
        } else {
            TaskStatus::Pending
        }
    }
}

/// Task progress for one phase, persisted separately from the state file.
///
/// `timestamp` is the last-updated time; every mutation through
/// [`touch`](Self::touch) moves it strictly forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseCheckpoint {
    pub phase: Phase,
    #[serde(default)]
    pub completed_tasks: Vec<Task>,
    #[serde(default)]
    pub pending_tasks: Vec<Task>,
    pub timestamp: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub interrupted: bool,
    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl PhaseCheckpoint {
    pub fn new(
        phase: Phase,
        completed_tasks: Vec<Task>,
        pending_tasks: Vec<Task>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            phase,
            completed_tasks,
            pending_tasks,
            timestamp: now,
            started_at: now,
            interrupted: false,
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn total_tasks(&self) -> usize {
        self.completed_tasks.len() + self.pending_tasks.len()
    }

    /// `completed / total * 100`; zero when the phase has no tasks.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        let total = self.total_tasks();
        if total == 0 {
            return 0.0;
        }
        self.completed_tasks.len() as f64 / total as f64 * 100.0
    }

    #[must_use]
    pub fn next_pending_task(&self) -> Option<&Task> {
        self.pending_tasks.first()
    }

    /// True when the checkpoint has not been updated for longer than `max_age`.
    #[must_use]
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) > max_age
    }

    /// Advance `timestamp` to `now`, or one microsecond past its previous
    /// value when the clock has not moved.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.timestamp + Duration::microseconds(1);
        self.timestamp = now.max(floor);
    }

    /// Move the pending task `task_id` to the completed list.
    ///
    /// Returns `None` (and changes nothing) when no pending task has that id.
    pub fn mark_task_complete(
        &mut self,
        task_id: &str,
        commit_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Option<&Task> {
        let index = self.pending_tasks.iter().position(|t| t.id == task_id)?;
        let mut task = self.pending_tasks.remove(index);
        task.completed = true;
        task.completed_at = Some(now);
        task.error_message = None;
        if commit_id.is_some() {
            task.commit_id = commit_id;
        }
        self.completed_tasks.push(task);
        self.touch(now);
        self.completed_tasks.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tasks(prefix: &str, n: usize, completed: bool) -> Vec<Task> {
        (0..n)
            .map(|i| {
                let mut task = Task::new(format!("{prefix}-{i}"), "work", Phase::Testing);
                task.completed = completed;
                task
            })
            .collect()
    }

    #[test]
    fn test_task_status_is_derived() {
        let mut task = Task::new("t1", "Add smoke tests", Phase::Testing);
        assert_eq!(task.status(), TaskStatus::Pending);

        task.error_message = Some("flaky".into());
        assert_eq!(task.status(), TaskStatus::Failed);

        task.completed = true;
        assert_eq!(task.status().as_str(), "completed");
    }

    #[test]
    fn test_mark_task_complete_moves_exactly_one() {
        let t0 = Utc::now();
        let mut checkpoint =
            PhaseCheckpoint::new(Phase::Testing, tasks("done", 1, true), tasks("todo", 3, false), t0);

        let moved = checkpoint
            .mark_task_complete("todo-1", Some("abc123".into()), t0)
            .cloned()
            .unwrap();

        assert_eq!(moved.id, "todo-1");
        assert_eq!(moved.commit_id.as_deref(), Some("abc123"));
        assert_eq!(moved.completed_at, Some(t0));
        assert_eq!(checkpoint.completed_tasks.len(), 2);
        assert_eq!(checkpoint.pending_tasks.len(), 2);
        assert!(checkpoint.timestamp > t0, "timestamp must move even if clock did not");
    }

    #[test]
    fn test_mark_unknown_task_changes_nothing() {
        let t0 = Utc::now();
        let mut checkpoint = PhaseCheckpoint::new(Phase::Quality, vec![], tasks("todo", 2, false), t0);
        let before = checkpoint.clone();

        assert!(checkpoint.mark_task_complete("missing", None, t0).is_none());
        assert_eq!(checkpoint, before);
    }

    #[test]
    fn test_staleness() {
        let t0 = Utc::now();
        let checkpoint = PhaseCheckpoint::new(Phase::Structure, vec![], vec![], t0);

        assert!(!checkpoint.is_stale(Duration::minutes(60), t0 + Duration::minutes(59)));
        assert!(checkpoint.is_stale(Duration::minutes(60), t0 + Duration::minutes(61)));
    }

    #[test]
    fn test_empty_checkpoint_progress_is_zero() {
        let checkpoint = PhaseCheckpoint::new(Phase::Structure, vec![], vec![], Utc::now());
        assert_eq!(checkpoint.progress_percent(), 0.0);
        assert!(checkpoint.next_pending_task().is_none());
    }

    proptest! {
        #[test]
        fn prop_progress_is_completed_share(done in 0usize..40, todo in 0usize..40) {
            prop_assume!(done + todo > 0);
            let checkpoint = PhaseCheckpoint::new(
                Phase::Testing,
                tasks("done", done, true),
                tasks("todo", todo, false),
                Utc::now(),
            );

            let expected = done as f64 / (done + todo) as f64 * 100.0;
            prop_assert!((checkpoint.progress_percent() - expected).abs() < 1e-9);
            prop_assert!((0.0..=100.0).contains(&checkpoint.progress_percent()));
        }
    }
}
