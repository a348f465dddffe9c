//! Interrupted-phase resumption through checkpoints.

use anyhow::Result;
use camino::Utf8PathBuf;
use tempfile::TempDir;

use brownfield::utils::error::CheckpointError;
use brownfield::{BrownfieldError, CheckpointManager, Config, Phase, Project, Task};

fn setup_project() -> Result<(Project, TempDir)> {
    let temp = TempDir::new()?;
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir: {}", p.display()))?;
    let config = Config::builder().state_dir(root.join(".brownfield")).build()?;
    Ok((Project::new(root, config), temp))
}

fn testing_tasks() -> Vec<Task> {
    ["unit-auth", "unit-billing", "integration-api"]
        .into_iter()
        .map(|id| Task::new(id, format!("Write {id} tests"), Phase::Testing).with_estimate(2.0))
        .collect()
}

#[test]
fn test_resume_after_interruption() -> Result<()> {
    let (project, _temp) = setup_project()?;
    let checkpoints = project.checkpoints();
    checkpoints.save_checkpoint(Phase::Testing, Vec::new(), testing_tasks(), None, false)?;

    checkpoints.mark_task_complete(Phase::Testing, "unit-auth", Some("a1b2c3d".to_string()))?;
    checkpoints.mark_interrupted(Phase::Testing)?;

    // A new process sees the same files.
    let resumed = CheckpointManager::for_state_dir(project.store().state_dir());
    assert!(resumed.detect_interruption(Phase::Testing)?);

    let options = resumed.get_resumption_options(Phase::Testing)?;
    assert!(options.can_resume);
    assert_eq!(options.completed_count, 1);
    assert_eq!(options.pending_count, 2);
    assert_eq!(options.next_task.map(|t| t.id).as_deref(), Some("unit-billing"));

    let latest = resumed.most_recent_interrupted()?.expect("interrupted checkpoint");
    assert_eq!(latest.phase, Phase::Testing);
    Ok(())
}

#[test]
fn test_unknown_task_is_reported() -> Result<()> {
    let (project, _temp) = setup_project()?;
    let checkpoints = project.checkpoints();
    checkpoints.save_checkpoint(Phase::Testing, Vec::new(), testing_tasks(), None, false)?;

    let err = checkpoints
        .mark_task_complete(Phase::Testing, "does-not-exist", None)
        .unwrap_err();
    assert!(matches!(
        err,
        BrownfieldError::Checkpoint(CheckpointError::TaskNotFound { .. })
    ));

    let checkpoint = checkpoints.require_checkpoint(Phase::Testing)?;
    assert_eq!(checkpoint.pending_tasks.len(), 3);
    Ok(())
}

#[test]
fn test_open_migrates_legacy_checkpoints() -> Result<()> {
    let temp = TempDir::new()?;
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir: {}", p.display()))?;
    let legacy = root.join("legacy-checkpoints");
    let config = Config::builder()
        .state_dir(root.join(".brownfield"))
        .legacy_checkpoint_dir(legacy.clone())
        .build()?;

    let old = CheckpointManager::new(legacy.clone());
    old.save_checkpoint(Phase::Quality, Vec::new(), testing_tasks(), None, true)?;

    let (project, report) = Project::open(root.clone(), config.clone())?;
    assert_eq!(report.migrated.len(), 1);
    assert!(report.legacy_dir_removed);
    assert!(project.checkpoints().detect_interruption(Phase::Quality)?);

    let (_, again) = Project::open(root, config)?;
    assert!(again.migrated.is_empty());
    Ok(())
}
