//! Error types for diff and patch operations.

use thiserror::Error;

/// Errors that can occur while parsing patches, applying them, or mapping
/// diffs back onto file content.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Patch text violates the search/replace block grammar
    #[error("malformed patch: {0}")]
    MalformedPatch(String),

    /// A search block has no whole-line match in the original content
    #[error("could not find search pattern in original content:\n{pattern}")]
    SearchPatternNotFound {
        /// The search text that failed to match
        pattern: String,
    },

    /// Diff text is inconsistent with the contents it claims to describe
    #[error("structural diff failure: {0}")]
    StructuralFailure(String),
}

/// Result type for diff and patch operations.
pub type Result<T> = std::result::Result<T, DiffError>;
