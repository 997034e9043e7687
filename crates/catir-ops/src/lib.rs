//! Rename engine for catir.
//!
//! Resolves EXIF-derived filenames per directory and commits the renames,
//! reporting progress as [`RunEvent`]s. [`start_run`] streams those events
//! through a channel, following the same pattern as other long-running
//! operations.

mod context;
mod driver;
mod event;
mod fs;
mod paths;
mod plan;
mod resolver;

pub use context::DirectoryContext;
pub use driver::{ChannelSink, Driver, EventSink, RUN_CHANNEL_SIZE, RunError, start_run};
pub use event::RunEvent;
pub use fs::{Filesystem, LocalFs, PlannedMoves, PlannedView};
pub use paths::absolute_input;
pub use plan::{RenamePlan, RunSummary, SkipEntry};
pub use resolver::{
    CandidateName, CollisionStep, DEPLOYMENT_SEGMENT_FROM_END, NameResolver, Resolution,
    ResolveError, SECONDS_OFFSET, bump_seconds, derive_deployment_name,
};
