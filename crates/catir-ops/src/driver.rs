//! The rename run: walk inputs, resolve names, commit renames.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use catir_core::{ConfigError, ExtractError, MetadataExtractor, RenameConfig, SkipReason};
use catir_scan::{DirectoryBatch, DirectoryWalker, WalkError};

use crate::context::DirectoryContext;
use crate::event::RunEvent;
use crate::fs::{Filesystem, LocalFs, PlannedMoves};
use crate::paths::absolute_input;
use crate::plan::{RenamePlan, RunSummary, SkipEntry};
use crate::resolver::{NameResolver, Resolution};

/// Buffer size of the event channel returned by [`start_run`].
pub const RUN_CHANNEL_SIZE: usize = 100;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The event receiver was dropped.
    #[error("Run cancelled")]
    Cancelled,
}

/// Receives run events as they happen.
pub trait EventSink {
    fn emit(&mut self, event: RunEvent) -> Result<(), RunError>;
}

impl EventSink for Vec<RunEvent> {
    fn emit(&mut self, event: RunEvent) -> Result<(), RunError> {
        self.push(event);
        Ok(())
    }
}

/// Forwards events into a tokio channel from a blocking thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<RunEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<RunEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: RunEvent) -> Result<(), RunError> {
        self.tx.blocking_send(event).map_err(|_| RunError::Cancelled)
    }
}

/// What happened to one file.
#[derive(Debug)]
enum FileOutcome {
    Renamed(RenamePlan),
    Skipped(SkipReason),
    Ignored,
}

/// Runs renames over input paths, one directory and one file at a time.
#[derive(Debug)]
pub struct Driver<E, F = LocalFs> {
    config: RenameConfig,
    extractor: E,
    fs: F,
    resolver: NameResolver,
    walker: DirectoryWalker,
    planned: PlannedMoves,
}

impl<E: MetadataExtractor> Driver<E> {
    /// Create a driver over the local filesystem.
    pub fn new(config: RenameConfig, extractor: E) -> Result<Self, ConfigError> {
        let resolver = NameResolver::from_config(&config)?;
        let walker = DirectoryWalker::new().recursive(config.recursive);
        Ok(Self {
            config,
            extractor,
            fs: LocalFs,
            resolver,
            walker,
            planned: PlannedMoves::default(),
        })
    }
}

impl<E: MetadataExtractor, F: Filesystem> Driver<E, F> {
    /// Replace the filesystem.
    pub fn with_filesystem<G: Filesystem>(self, fs: G) -> Driver<E, G> {
        Driver {
            config: self.config,
            extractor: self.extractor,
            fs,
            resolver: self.resolver,
            walker: self.walker,
            planned: self.planned,
        }
    }

    /// Deployment name, once configured or derived.
    pub fn deployment_name(&self) -> Option<&str> {
        self.resolver.deployment_name()
    }

    /// Process every input path in order.
    ///
    /// Per-file failures are recorded in the summary. Only configuration
    /// errors and a dropped event receiver end the run early.
    pub fn run(
        &mut self,
        inputs: &[PathBuf],
        sink: &mut impl EventSink,
    ) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();

        for input in inputs {
            let outcome = absolute_input(input)
                .map_err(|e| WalkError::io(input, e))
                .and_then(|path| self.walker.walk(&path));

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    let reason = match err {
                        WalkError::NotFound { .. } => SkipReason::InputNotFound,
                        _ => SkipReason::InputUnreadable,
                    };
                    warn!(input = %input.display(), error = %err, "skipping input");
                    self.skip(&mut summary, sink, input, reason)?;
                    continue;
                }
            };

            for batch in &outcome.batches {
                self.process_batch(batch, &mut summary, sink)?;
            }
            summary.walk_warnings.extend(outcome.warnings);
        }

        info!(
            renamed = summary.renamed,
            skipped = summary.skipped.len(),
            ignored = summary.ignored,
            walk_warnings = summary.walk_warnings.len(),
            "run complete"
        );
        Ok(summary)
    }

    fn process_batch(
        &mut self,
        batch: &DirectoryBatch,
        summary: &mut RunSummary,
        sink: &mut impl EventSink,
    ) -> Result<(), RunError> {
        if batch.is_hidden() && !self.config.include_hidden {
            debug!(dir = %batch.dir.display(), "skipping hidden directory");
            return Ok(());
        }

        info!(dir = %batch.dir.display(), files = batch.files.len(), "processing directory");
        summary.directories += 1;
        sink.emit(RunEvent::DirectoryStarted {
            dir: batch.dir.clone(),
        })?;

        let mut context = DirectoryContext::from_batch(batch, self.config.sequence_start);

        for path in &batch.files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            if self.config.should_skip_hidden(&name) {
                continue;
            }

            match self.process_file(&mut context, path, sink)? {
                FileOutcome::Renamed(plan) => {
                    summary.renamed += 1;
                    sink.emit(RunEvent::Renamed(plan))?;
                }
                FileOutcome::Skipped(reason) => {
                    self.skip(summary, sink, path, reason)?;
                }
                FileOutcome::Ignored => {
                    debug!(path = %path.display(), "not an image");
                    summary.ignored += 1;
                }
            }
        }

        sink.emit(RunEvent::DirectoryFinished {
            dir: batch.dir.clone(),
        })
    }

    fn process_file(
        &mut self,
        context: &mut DirectoryContext,
        path: &Path,
        sink: &mut impl EventSink,
    ) -> Result<FileOutcome, RunError> {
        let record = match self.extractor.extract(path) {
            Ok(record) => record,
            Err(ExtractError::NotAnImage) => return Ok(FileOutcome::Ignored),
            Err(ExtractError::NoMetadata) => {
                return Ok(FileOutcome::Skipped(SkipReason::NoExifData));
            }
        };

        let timestamp = match self.resolver.derive_timestamp(&record) {
            Ok(ts) => ts,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no usable timestamp");
                return Ok(FileOutcome::Skipped(SkipReason::from(&err)));
            }
        };

        let sequence = context.current_seq();
        let (candidate, subs) =
            self.resolver
                .build_candidate(&record, &timestamp, context, sequence)?;

        let resolved = if self.config.dry_run {
            let view = self.planned.over(&self.fs);
            self.resolver
                .resolve_collision(&candidate, context.dir(), &subs, &view)
        } else {
            self.resolver
                .resolve_collision(&candidate, context.dir(), &subs, &self.fs)
        };
        let Resolution { name, steps } = match resolved {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "collision unresolved");
                return Ok(FileOutcome::Skipped(SkipReason::CollisionUnresolved));
            }
        };

        for step in steps {
            sink.emit(RunEvent::Collision(step))?;
        }

        let new_path = context.dir().join(&name.file_name);
        if self.config.dry_run {
            self.planned.record(path, &new_path);
        } else if let Err(err) = self.fs.commit(path, &new_path) {
            warn!(
                from = %path.display(),
                to = %new_path.display(),
                error = %err,
                "rename failed"
            );
            return Ok(FileOutcome::Skipped(SkipReason::RenameFailed));
        }
        debug!(
            from = %path.display(),
            to = %new_path.display(),
            dry_run = self.config.dry_run,
            "renamed"
        );

        context.advance();
        Ok(FileOutcome::Renamed(RenamePlan {
            old_path: path.to_path_buf(),
            new_path,
            new_base: name.base,
            sequence,
            dry_run: self.config.dry_run,
        }))
    }

    fn skip(
        &self,
        summary: &mut RunSummary,
        sink: &mut impl EventSink,
        path: &Path,
        reason: SkipReason,
    ) -> Result<(), RunError> {
        let entry = SkipEntry::new(path, reason);
        summary.skipped.push(entry.clone());
        sink.emit(RunEvent::Skipped(entry))
    }
}

/// Start a run on a blocking task and stream its events.
///
/// The last event is [`RunEvent::Finished`] or [`RunEvent::Failed`].
/// Dropping the receiver stops the run at its next event.
pub fn start_run<E, F>(mut driver: Driver<E, F>, inputs: Vec<PathBuf>) -> mpsc::Receiver<RunEvent>
where
    E: MetadataExtractor + Send + 'static,
    F: Filesystem + Send + 'static,
{
    let (tx, rx) = mpsc::channel(RUN_CHANNEL_SIZE);

    tokio::task::spawn_blocking(move || {
        let mut sink = ChannelSink::new(tx);
        let last = match driver.run(&inputs, &mut sink) {
            Ok(summary) => RunEvent::Finished(summary),
            Err(RunError::Cancelled) => return,
            Err(err) => RunEvent::Failed(err.to_string()),
        };
        let _ = sink.emit(last);
    });

    rx
}
