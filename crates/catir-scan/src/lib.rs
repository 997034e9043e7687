//! Directory traversal for catir.
//!
//! Input paths are walked serially with jwalk and grouped into
//! [`DirectoryBatch`]es: one per directory, top-down, files sorted by name.
//!
//! ```rust,no_run
//! use catir_scan::DirectoryWalker;
//!
//! let outcome = DirectoryWalker::new()
//!     .recursive(true)
//!     .walk("/data/deployments".as_ref())
//!     .unwrap();
//!
//! for batch in &outcome.batches {
//!     println!("{}: {} files", batch.dir.display(), batch.files.len());
//! }
//! ```

mod batch;
mod error;
mod walker;

pub use batch::{DirectoryBatch, WalkOutcome, WalkWarning};
pub use error::WalkError;
pub use walker::DirectoryWalker;
