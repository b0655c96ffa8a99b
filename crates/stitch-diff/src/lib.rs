//! Diff, patch, and merge engine for LLM-authored code edits.
//!
//! Parses and applies the search/replace patch format LLMs emit, computes
//! unified diffs between two versions of a file, expands a diff into
//! per-line character ranges over both versions, rebases a suggestion onto
//! a file that changed underneath it, and rebuilds content from a
//! user-chosen subset of changes.
//!
//! # Architecture
//!
//! Every operation is a pure function of its arguments: nothing is cached,
//! no file I/O happens here, and any call is safe to repeat or run
//! concurrently. Errors fail the whole operation; no partial results are
//! ever returned. Callers that recompute on fast-changing input coalesce
//! the calls themselves (see the companion task-queue crate).
//!
//! # Usage
//!
//! ```rust,ignore
//! use stitch_diff::{FileChange, PatchApplier};
//!
//! // Apply an LLM-authored search/replace patch.
//! let new_content = PatchApplier::apply_patch(&patch_text, &old_content)?;
//!
//! // Map the edit onto classified per-line ranges for rendering.
//! let file_change = FileChange::between(&old_content, &new_content)?;
//! for change in &file_change.changes {
//!     // change.kind, change.character_range, change.content
//! }
//! ```

mod error;
mod format;
mod lines;
mod patch;
mod ranges;
mod rebase;
mod section;
mod select;
mod types;
mod udiff;

pub use error::{DiffError, Result};
pub use format::{format_changes, FormattedFileChange, FormattedLineChange, Highlighter};
pub use patch::{PatchApplier, PatchParser, SearchReplace};
pub use ranges::changed_ranges;
pub use rebase::{rebase, RebaseResult};
pub use section::{changed_sections, continuous_changes};
pub use select::{suggested_file_change, target_content};
pub use types::{ChangeType, FileChange, LineChange};
pub use udiff::unified_diff;
