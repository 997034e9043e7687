//! Events emitted while a run progresses.

use std::path::PathBuf;

use crate::plan::{RenamePlan, RunSummary, SkipEntry};
use crate::resolver::CollisionStep;

/// One step of a run, in the order it happened.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A directory batch is about to be processed.
    DirectoryStarted { dir: PathBuf },
    /// A candidate name was taken and the next one is tried.
    Collision(CollisionStep),
    /// A file was renamed (or planned, in a dry run).
    Renamed(RenamePlan),
    /// A file or input path was skipped.
    Skipped(SkipEntry),
    /// The directory batch is done.
    DirectoryFinished { dir: PathBuf },
    /// The run completed.
    Finished(RunSummary),
    /// The run was aborted.
    Failed(String),
}
