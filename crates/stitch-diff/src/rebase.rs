//! Three-way rebase with inline conflict markers.

use crate::error::Result;
use crate::lines::split_lines;
use crate::ranges::changed_ranges;
use crate::types::{ChangeType, LineChange};
use crate::udiff::unified_diff;

const CONFLICT_START: &str = "<<<<<<< HEAD";
const CONFLICT_SEPARATOR: &str = "=======";
const CONFLICT_END: &str = ">>>>>>> suggestion";

/// Outcome of [`rebase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseResult {
    /// Every edited region merged without overlap.
    Clean(String),
    /// Overlapping edits were found; the content embeds
    /// `<<<<<<< HEAD` / `=======` / `>>>>>>> suggestion` blocks around each
    /// of them.
    Conflicted(String),
}

impl RebaseResult {
    /// True when the merge completed without conflict markers.
    pub fn is_clean(&self) -> bool {
        matches!(self, RebaseResult::Clean(_))
    }

    /// The merged content, clean or not.
    pub fn content(&self) -> &str {
        match self {
            RebaseResult::Clean(content) | RebaseResult::Conflicted(content) => content,
        }
    }

    /// Consume the result, returning the merged content.
    pub fn into_content(self) -> String {
        match self {
            RebaseResult::Clean(content) | RebaseResult::Conflicted(content) => content,
        }
    }
}

/// One atomic edit of the baseline: the `len` lines at `start` become
/// `lines`. Zero `len` is an insertion before line `start`; empty `lines`
/// is a deletion. Lines keep their original terminators.
#[derive(Debug)]
struct Edit {
    start: usize,
    len: usize,
    lines: Vec<String>,
}

impl Edit {
    fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Walk order of edits: baseline position, insertions before spans that
/// start at the same position.
fn edit_key(edit: &Edit) -> (usize, usize) {
    (edit.start, usize::from(edit.len > 0))
}

/// Fold one side's change sequence into atomic edits over baseline line
/// indices. A run of `Removed` lines together with the `Added` lines
/// immediately following it is one replacement; `Added` lines on their
/// own are an insertion at the baseline position the cursor stands on.
fn collect_edits(changes: &[LineChange]) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut baseline_index = 0usize;
    let mut i = 0usize;
    while i < changes.len() {
        match changes[i].kind {
            ChangeType::Unchanged => {
                baseline_index += 1;
                i += 1;
            }
            ChangeType::Removed => {
                let start = baseline_index;
                while i < changes.len() && changes[i].kind == ChangeType::Removed {
                    baseline_index += 1;
                    i += 1;
                }
                let mut lines = Vec::new();
                while i < changes.len() && changes[i].kind == ChangeType::Added {
                    lines.push(changes[i].content.clone());
                    i += 1;
                }
                edits.push(Edit {
                    start,
                    len: baseline_index - start,
                    lines,
                });
            }
            ChangeType::Added => {
                let mut lines = Vec::new();
                while i < changes.len() && changes[i].kind == ChangeType::Added {
                    lines.push(changes[i].content.clone());
                    i += 1;
                }
                edits.push(Edit {
                    start: baseline_index,
                    len: 0,
                    lines,
                });
            }
        }
    }
    edits
}

/// Whether `edit` belongs to the conflict region covering `start..end` of
/// the baseline. A span joins when it overlaps the region; an insertion
/// joins strictly inside it, or at a region that is itself a bare
/// insertion point. Insertions at a region's edge stay independent.
fn joins_region(edit: &Edit, start: usize, end: usize) -> bool {
    if edit.len == 0 {
        (start < edit.start && edit.start < end) || (start == end && edit.start == start)
    } else {
        edit.start < end && edit.end() > start
    }
}

/// One side's text for the baseline span `start..end`: kept lines pass
/// through verbatim, edited spans contribute their replacement lines, and
/// insertions land before the line they precede.
fn region_text(edits: &[&Edit], start: usize, end: usize, baseline_lines: &[&str]) -> Vec<String> {
    let mut text = Vec::new();
    let mut position = start;
    for edit in edits {
        for index in position..edit.start {
            text.push(baseline_lines[index].to_string());
        }
        text.extend(edit.lines.iter().cloned());
        position = position.max(edit.end());
    }
    for index in position..end {
        text.push(baseline_lines[index].to_string());
    }
    text
}

fn push_conflict(output: &mut Vec<String>, current_side: &[String], suggested_side: &[String]) {
    output.push(format!("{CONFLICT_START}\n"));
    output.extend(current_side.iter().cloned());
    output.push(format!("{CONFLICT_SEPARATOR}\n"));
    output.extend(suggested_side.iter().cloned());
    output.push(format!("{CONFLICT_END}\n"));
}

/// Rebase `suggested`, an edit of `baseline`, onto `current`, an
/// independent edit of the same baseline.
///
/// Both sides are diffed against the baseline and folded back over it as
/// atomic edits. A baseline region only one side touched takes that side's
/// text, identical edits apply once, and overlapping edits that disagree
/// become an inline conflict block
///
/// ```text
/// <<<<<<< HEAD
/// current side's region
/// =======
/// suggested side's region
/// >>>>>>> suggestion
/// ```
///
/// with the marker lines exactly as shown. Edits whose baseline spans
/// overlap share a single block, so both sides' full alternatives face
/// each other across the separator. A conflict in one region never keeps
/// other regions from merging, and neither input is ever modified in
/// place. Lines travel with their own terminators: CRLF endings and a
/// missing final newline survive wherever the merge keeps the line that
/// carried them.
pub fn rebase(baseline: &str, current: &str, suggested: &str) -> Result<RebaseResult> {
    let current_changes = changed_ranges(baseline, current, &unified_diff(baseline, current))?;
    let suggested_changes =
        changed_ranges(baseline, suggested, &unified_diff(baseline, suggested))?;

    let baseline_lines = split_lines(baseline);
    let current_edits = collect_edits(&current_changes);
    let suggested_edits = collect_edits(&suggested_changes);

    let mut output: Vec<String> = Vec::new();
    let mut conflicted = false;
    let mut line = 0usize;
    let mut next_current = 0usize;
    let mut next_suggested = 0usize;

    while next_current < current_edits.len() || next_suggested < suggested_edits.len() {
        let take_current = match (
            current_edits.get(next_current),
            suggested_edits.get(next_suggested),
        ) {
            (Some(ours), Some(theirs)) => edit_key(ours) <= edit_key(theirs),
            (Some(_), None) => true,
            _ => false,
        };
        let seed = if take_current {
            next_current += 1;
            &current_edits[next_current - 1]
        } else {
            next_suggested += 1;
            &suggested_edits[next_suggested - 1]
        };

        for index in line..seed.start {
            output.push(baseline_lines[index].to_string());
        }

        // Grow the region until no upcoming edit from either side belongs
        // to it. Edits are sorted, so only the next one per side can join.
        let start = seed.start;
        let mut end = seed.end();
        let mut ours: Vec<&Edit> = Vec::new();
        let mut theirs: Vec<&Edit> = Vec::new();
        if take_current {
            ours.push(seed);
        } else {
            theirs.push(seed);
        }
        loop {
            let mut absorbed = false;
            if let Some(edit) = current_edits.get(next_current) {
                if joins_region(edit, start, end) {
                    end = end.max(edit.end());
                    ours.push(edit);
                    next_current += 1;
                    absorbed = true;
                }
            }
            if let Some(edit) = suggested_edits.get(next_suggested) {
                if joins_region(edit, start, end) {
                    end = end.max(edit.end());
                    theirs.push(edit);
                    next_suggested += 1;
                    absorbed = true;
                }
            }
            if !absorbed {
                break;
            }
        }

        let ours_text = region_text(&ours, start, end, &baseline_lines);
        let theirs_text = region_text(&theirs, start, end, &baseline_lines);
        if ours.is_empty() {
            output.extend(theirs_text);
        } else if theirs.is_empty() || ours_text == theirs_text {
            output.extend(ours_text);
        } else {
            conflicted = true;
            push_conflict(&mut output, &ours_text, &theirs_text);
        }
        line = end;
    }

    for index in line..baseline_lines.len() {
        output.push(baseline_lines[index].to_string());
    }

    let mut merged = String::new();
    for (index, piece) in output.iter().enumerate() {
        merged.push_str(piece);
        // Only a source's final line lacks a terminator; mid-output it
        // still needs one.
        if index + 1 < output.len() && !piece.ends_with('\n') {
            merged.push('\n');
        }
    }

    if conflicted {
        Ok(RebaseResult::Conflicted(merged))
    } else {
        Ok(RebaseResult::Clean(merged))
    }
}
