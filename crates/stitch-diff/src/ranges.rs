//! Expand a unified diff into a gap-free sequence of classified ranges.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DiffError, Result};
use crate::lines::split_lines;
use crate::types::{ChangeType, LineChange};

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header pattern")
});

/// Lines of one version plus the byte offset where each line starts.
struct LineTable<'a> {
    lines: Vec<&'a str>,
    starts: Vec<usize>,
}

impl<'a> LineTable<'a> {
    fn new(text: &'a str) -> Self {
        let lines = split_lines(text);
        let mut starts = Vec::with_capacity(lines.len() + 1);
        let mut offset = 0;
        for line in &lines {
            starts.push(offset);
            offset += line.len();
        }
        starts.push(offset);
        LineTable { lines, starts }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn change(&self, kind: ChangeType, index: usize) -> LineChange {
        LineChange {
            kind,
            line_offset: index,
            character_range: self.starts[index]..self.starts[index + 1],
            content: self.lines[index].to_string(),
        }
    }
}

/// Expand `diff_text`, a unified diff of `old` against `new`, into the
/// complete [`LineChange`] sequence covering both texts.
///
/// `Unchanged` entries are synthesized for every span the hunks skip over,
/// before the first hunk, between hunks, and after the last, so the output
/// tiles both inputs without gaps (see [`LineChange`] for the exact
/// guarantee). A replaced region keeps the diff's shape: all its `Removed`
/// lines, then all its `Added` lines.
///
/// `old` and `new` supply all content and offsets; the diff contributes
/// only structure. Any disagreement between the two, overlapping or
/// misordered hunks, lines past either end, or skipped spans whose old and
/// new text differ, is a [`DiffError::StructuralFailure`]. Nothing is
/// returned in that case.
pub fn changed_ranges(old: &str, new: &str, diff_text: &str) -> Result<Vec<LineChange>> {
    let old_table = LineTable::new(old);
    let new_table = LineTable::new(new);

    let mut changes: Vec<LineChange> = Vec::new();
    let mut old_index = 0usize;
    let mut new_index = 0usize;
    let mut in_hunk = false;

    for line in diff_text.lines() {
        if let Some(caps) = HUNK_HEADER.captures(line) {
            let old_len = header_number(&caps, 2, 1)?;
            let new_len = header_number(&caps, 4, 1)?;
            let old_start = start_index(header_number(&caps, 1, 0)?, old_len);
            let new_start = start_index(header_number(&caps, 3, 0)?, new_len);

            if old_start < old_index
                || new_start < new_index
                || old_start - old_index != new_start - new_index
            {
                return Err(DiffError::StructuralFailure(format!(
                    "hunk header {line:?} does not align with the content before it"
                )));
            }
            fill_unchanged(
                &mut changes,
                &old_table,
                &new_table,
                &mut old_index,
                &mut new_index,
                new_start,
            )?;
            in_hunk = true;
            continue;
        }
        if !in_hunk {
            // Preamble such as ---/+++ file headers.
            continue;
        }
        match line.as_bytes().first() {
            Some(b' ') => {
                if old_index >= old_table.len() || new_index >= new_table.len() {
                    return Err(past_the_end("context line"));
                }
                if old_table.lines[old_index] != new_table.lines[new_index] {
                    return Err(mismatched_line(new_index));
                }
                changes.push(new_table.change(ChangeType::Unchanged, new_index));
                old_index += 1;
                new_index += 1;
            }
            Some(b'-') => {
                if old_index >= old_table.len() {
                    return Err(past_the_end("removed line"));
                }
                changes.push(old_table.change(ChangeType::Removed, old_index));
                old_index += 1;
            }
            Some(b'+') => {
                if new_index >= new_table.len() {
                    return Err(past_the_end("added line"));
                }
                changes.push(new_table.change(ChangeType::Added, new_index));
                new_index += 1;
            }
            // `\ No newline at end of file` and blank separators carry no
            // content of their own.
            _ => {}
        }
    }

    if old_table.len() - old_index != new_table.len() - new_index {
        return Err(DiffError::StructuralFailure(
            "diff leaves old and new tails of different lengths".to_string(),
        ));
    }
    let end = new_table.len();
    fill_unchanged(
        &mut changes,
        &old_table,
        &new_table,
        &mut old_index,
        &mut new_index,
        end,
    )?;
    Ok(changes)
}

/// Emit `Unchanged` entries until the new-side cursor reaches `new_target`,
/// verifying the skipped span really is identical in both versions.
fn fill_unchanged(
    changes: &mut Vec<LineChange>,
    old_table: &LineTable<'_>,
    new_table: &LineTable<'_>,
    old_index: &mut usize,
    new_index: &mut usize,
    new_target: usize,
) -> Result<()> {
    while *new_index < new_target {
        if *old_index >= old_table.len() || *new_index >= new_table.len() {
            return Err(past_the_end("skipped span"));
        }
        if old_table.lines[*old_index] != new_table.lines[*new_index] {
            return Err(mismatched_line(*new_index));
        }
        changes.push(new_table.change(ChangeType::Unchanged, *new_index));
        *old_index += 1;
        *new_index += 1;
    }
    Ok(())
}

fn header_number(caps: &regex::Captures<'_>, group: usize, default: usize) -> Result<usize> {
    match caps.get(group) {
        Some(m) => m.as_str().parse::<usize>().map_err(|_| {
            DiffError::StructuralFailure(format!(
                "hunk header number {:?} out of range",
                m.as_str()
            ))
        }),
        None => Ok(default),
    }
}

/// Convert a printed hunk start to a 0-based line index. Printed starts are
/// 1-based, except that a zero-length side prints the 0-based index of the
/// line it sits after, which already is the splice position.
fn start_index(printed: usize, len: usize) -> usize {
    if len == 0 {
        printed
    } else {
        printed.saturating_sub(1)
    }
}

fn past_the_end(what: &str) -> DiffError {
    DiffError::StructuralFailure(format!("{what} walks past the end of the content"))
}

fn mismatched_line(new_index: usize) -> DiffError {
    DiffError::StructuralFailure(format!(
        "line {new_index} is claimed unchanged but differs between old and new content"
    ))
}
