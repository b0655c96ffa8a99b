//! Core value types for the diff pipeline.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ranges::changed_ranges;
use crate::udiff::unified_diff;

/// Classification of a single line in a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Removed,
    Unchanged,
}

/// One line of a computed diff.
///
/// `line_offset` and `character_range` index into the new content for
/// `Added` and `Unchanged` lines and into the old content for `Removed`
/// lines; `character_range` is a UTF-8 byte span. `content` is the literal
/// line text, trailing newline included when the line has one.
///
/// A sequence produced by [`changed_ranges`] tiles both inputs without
/// gaps: concatenating the `Removed` and `Unchanged` contents rebuilds the
/// old content exactly, and concatenating the `Added` and `Unchanged`
/// contents rebuilds the new content exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChange {
    /// What happened to this line
    #[serde(rename = "type")]
    pub kind: ChangeType,
    /// 0-based line index within the content the line belongs to
    pub line_offset: usize,
    /// Byte span of `content` within the content the line belongs to
    pub character_range: Range<usize>,
    /// Literal line text
    pub content: String,
}

/// A complete diff of one file: both versions plus the classified lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub old_content: String,
    pub new_content: String,
    pub changes: Vec<LineChange>,
}

impl FileChange {
    /// Diff two versions of a file and map the result onto line changes.
    pub fn between(old_content: &str, new_content: &str) -> Result<FileChange> {
        let diff = unified_diff(old_content, new_content);
        let changes = changed_ranges(old_content, new_content, &diff)?;
        Ok(FileChange {
            old_content: old_content.to_string(),
            new_content: new_content.to_string(),
            changes,
        })
    }
}
