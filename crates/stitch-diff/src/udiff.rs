//! Unified diff generation.

use similar::{ChangeTag, TextDiff};

/// Unchanged lines of context kept around each hunk.
const CONTEXT_LINES: usize = 3;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Compute a line-based unified diff between two texts.
///
/// Output follows the standard format: a `--- old` / `+++ new` preamble,
/// `@@ -a,b +c,d @@` hunk headers with 1-based starts (a zero-length side
/// prints the 0-based index of the line before it), three lines of
/// context, and a `\ No newline at end of file` marker after any line
/// that ends its file without a newline. Changed regions separated by more
/// than twice the context collapse into separate hunks. Identical inputs
/// produce an empty string.
pub fn unified_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);

    let mut out = String::new();
    for group in diff.grouped_ops(CONTEXT_LINES) {
        if group.is_empty() {
            continue;
        }
        if out.is_empty() {
            out.push_str("--- old\n");
            out.push_str("+++ new\n");
        }

        let first = &group[0];
        let last = &group[group.len() - 1];
        let old_start = first.old_range().start;
        let old_count = last.old_range().end - old_start;
        let new_start = first.new_range().start;
        let new_count = last.new_range().end - new_start;
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            printed_start(old_start, old_count),
            old_count,
            printed_start(new_start, new_count),
            new_count
        ));

        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Equal => ' ',
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                };
                out.push(sign);
                let line = change.value();
                out.push_str(line);
                if !line.ends_with('\n') {
                    out.push('\n');
                    out.push_str(NO_NEWLINE_MARKER);
                    out.push('\n');
                }
            }
        }
    }
    out
}

/// The 1-based line number a hunk header prints. A zero-length side prints
/// the 0-based index of the line it sits after instead.
fn printed_start(start: usize, count: usize) -> usize {
    if count == 0 {
        start
    } else {
        start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_inputs_produce_empty_diff() {
        assert_eq!(unified_diff("a\nb\nc\n", "a\nb\nc\n"), "");
        assert_eq!(unified_diff("", ""), "");
    }

    #[test]
    fn test_single_replacement_hunk() {
        let diff = unified_diff("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(diff, "--- old\n+++ new\n@@ -1,3 +1,3 @@\n a\n-b\n+x\n c\n");
    }

    #[test]
    fn test_context_is_limited_to_three_lines() {
        let old = "1\n2\n3\n4\n5\n6\n7\n8\n9\n";
        let new = "1\n2\n3\n4\nX\n6\n7\n8\n9\n";
        let diff = unified_diff(old, new);
        assert_eq!(
            diff,
            "--- old\n+++ new\n@@ -2,7 +2,7 @@\n 2\n 3\n 4\n-5\n+X\n 6\n 7\n 8\n"
        );
    }

    #[test]
    fn test_distant_changes_produce_separate_hunks() {
        // Seven unchanged lines between the edits exceeds twice the context.
        let old = "a\n1\n2\n3\n4\n5\n6\n7\nz\n";
        let new = "A\n1\n2\n3\n4\n5\n6\n7\nZ\n";
        let diff = unified_diff(old, new);
        assert_eq!(diff.matches("@@ -").count(), 2);
        assert!(diff.contains("-a\n+A\n"));
        assert!(diff.contains("-z\n+Z\n"));
    }

    #[test]
    fn test_near_changes_share_one_hunk() {
        // Six unchanged lines between the edits is exactly twice the context.
        let old = "a\n1\n2\n3\n4\n5\n6\nz\n";
        let new = "A\n1\n2\n3\n4\n5\n6\nZ\n";
        let diff = unified_diff(old, new);
        assert_eq!(diff.matches("@@ -").count(), 1);
        assert!(diff.contains("-a\n+A\n"));
        assert!(diff.contains("-z\n+Z\n"));
    }

    #[test]
    fn test_pure_addition_to_empty_file() {
        let diff = unified_diff("", "a\nb\n");
        assert_eq!(diff, "--- old\n+++ new\n@@ -0,0 +1,2 @@\n+a\n+b\n");
    }

    #[test]
    fn test_pure_deletion_to_empty_file() {
        let diff = unified_diff("a\nb\n", "");
        assert_eq!(diff, "--- old\n+++ new\n@@ -1,2 +0,0 @@\n-a\n-b\n");
    }

    #[test]
    fn test_missing_trailing_newline_marker() {
        let diff = unified_diff("a\nb", "a\nc");
        assert_eq!(
            diff,
            "--- old\n+++ new\n@@ -1,2 +1,2 @@\n a\n-b\n\\ No newline at end of file\n+c\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn test_trailing_newline_change_is_a_real_change() {
        let diff = unified_diff("a\nb\n", "a\nb");
        assert_eq!(
            diff,
            "--- old\n+++ new\n@@ -1,2 +1,2 @@\n a\n-b\n+b\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn test_insertion_between_lines() {
        let diff = unified_diff("a\nc\n", "a\nb\nc\n");
        assert_eq!(diff, "--- old\n+++ new\n@@ -1,2 +1,3 @@\n a\n+b\n c\n");
    }
}
