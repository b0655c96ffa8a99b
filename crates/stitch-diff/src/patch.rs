//! Parse and apply the LLM-facing search/replace patch format.
//!
//! A patch is one or more blocks of the form
//!
//! ```text
//! <<<<<<< SEARCH
//! <lines expected in the original>
//! =======
//! <lines to put in their place>
//! >>>>>>> REPLACE
//! ```
//!
//! Search text matches a contiguous run of whole lines in the original.
//! Blocks match in document order, each scanning forward from the end of
//! the previous match, so identical snippets resolve to successive
//! occurrences and a later block can never land before an earlier one.

use crate::error::{DiffError, Result};
use crate::lines::{line_text, split_lines};

const SEARCH_MARKER: &str = "<<<<<<< SEARCH";
const SEPARATOR_MARKER: &str = "=======";
const REPLACE_MARKER: &str = ">>>>>>> REPLACE";

/// One search/replace block of a parsed patch.
///
/// Both bodies store every line newline-terminated, so a zero-line body
/// (empty string) stays distinct from a body holding one blank line
/// (`"\n"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReplace {
    /// Lines expected verbatim in the original; empty means the block
    /// inserts at the position implied by the surrounding blocks
    pub search: String,
    /// Lines to emit in place of the matched run
    pub replace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Outside,
    InSearch,
    InReplace,
}

/// Parser for search/replace patch text.
pub struct PatchParser;

impl PatchParser {
    /// Parse patch text into an ordered list of search/replace blocks.
    ///
    /// Markers are recognized only when they make up a whole line. Blank
    /// lines are tolerated between blocks; any other content outside a
    /// block, or a patch that ends mid-block, is a
    /// [`DiffError::MalformedPatch`].
    pub fn parse(patch_text: &str) -> Result<Vec<SearchReplace>> {
        let mut blocks = Vec::new();
        let mut state = ParseState::Outside;
        let mut search = String::new();
        let mut replace = String::new();

        for (index, raw) in patch_text.split_inclusive('\n').enumerate() {
            let line = line_text(raw);
            match state {
                ParseState::Outside => {
                    if line == SEARCH_MARKER {
                        search.clear();
                        replace.clear();
                        state = ParseState::InSearch;
                    } else if !line.trim().is_empty() {
                        return Err(DiffError::MalformedPatch(format!(
                            "unexpected content outside a search/replace block at line {}",
                            index + 1
                        )));
                    }
                }
                ParseState::InSearch => {
                    if line == SEPARATOR_MARKER {
                        state = ParseState::InReplace;
                    } else {
                        search.push_str(line);
                        search.push('\n');
                    }
                }
                ParseState::InReplace => {
                    if line == REPLACE_MARKER {
                        blocks.push(SearchReplace {
                            search: search.clone(),
                            replace: replace.clone(),
                        });
                        state = ParseState::Outside;
                    } else {
                        replace.push_str(line);
                        replace.push('\n');
                    }
                }
            }
        }

        if state != ParseState::Outside {
            return Err(DiffError::MalformedPatch(
                "patch ends inside an unterminated search/replace block".to_string(),
            ));
        }
        Ok(blocks)
    }
}

/// Applies parsed search/replace blocks to file content.
pub struct PatchApplier;

impl PatchApplier {
    /// Parse `patch_text` and apply every block to `original`.
    pub fn apply_patch(patch_text: &str, original: &str) -> Result<String> {
        let blocks = PatchParser::parse(patch_text)?;
        Self::apply(&blocks, original)
    }

    /// Apply blocks to `original` in document order.
    ///
    /// Each block's search lines must match a contiguous run of whole lines
    /// at or after the previous block's match; the first block with no such
    /// run fails the whole application with
    /// [`DiffError::SearchPatternNotFound`] and the original is left
    /// untouched. A block with an empty search inserts its replacement at
    /// the current match position. The result keeps the original's
    /// trailing-newline presence whenever the original is non-empty.
    pub fn apply(blocks: &[SearchReplace], original: &str) -> Result<String> {
        let original_lines = split_lines(original);
        let mut splices: Vec<(usize, usize, &SearchReplace)> = Vec::new();
        let mut cursor = 0usize;

        for block in blocks {
            let search_lines: Vec<&str> = block.search.lines().collect();
            if search_lines.is_empty() {
                splices.push((cursor, cursor, block));
                continue;
            }
            let start = Self::find_lines(&original_lines, &search_lines, cursor).ok_or_else(
                || DiffError::SearchPatternNotFound {
                    pattern: block.search.clone(),
                },
            )?;
            let end = start + search_lines.len();
            tracing::debug!(start, end, "matched search block");
            splices.push((start, end, block));
            cursor = end;
        }

        let mut result = String::with_capacity(original.len());
        let mut next_line = 0usize;
        for (start, end, block) in splices {
            for line in &original_lines[next_line..start] {
                result.push_str(line);
            }
            result.push_str(&block.replace);
            next_line = end;
        }
        for line in &original_lines[next_line..] {
            result.push_str(line);
        }

        if !original.is_empty() && !original.ends_with('\n') && result.ends_with('\n') {
            result.pop();
        }
        Ok(result)
    }

    /// Find `search_lines` as a contiguous run of whole lines in `lines`,
    /// scanning forward from `from`. Comparison ignores line terminators,
    /// never partial line text.
    fn find_lines(lines: &[&str], search_lines: &[&str], from: usize) -> Option<usize> {
        if search_lines.is_empty() {
            return Some(from);
        }
        if lines.len() < search_lines.len() {
            return None;
        }
        (from..=lines.len() - search_lines.len()).find(|&start| {
            search_lines
                .iter()
                .zip(&lines[start..start + search_lines.len()])
                .all(|(search, line)| *search == line_text(line))
        })
    }
}
