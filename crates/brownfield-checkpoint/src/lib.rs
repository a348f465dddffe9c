//! Per-phase task checkpoints
//!
//! Each legacy phase has at most one checkpoint file,
//! `<checkpoint_dir>/<phase>_checkpoint.json`, holding completed and pending
//! tasks. Saving overwrites; the last write wins. A run that is interrupted
//! resumes from the first pending task of the last saved checkpoint.

mod legacy;
mod manager;

pub use legacy::LegacyMigrationReport;
pub use manager::{CheckpointManager, CheckpointSummary, ResumptionOptions};
