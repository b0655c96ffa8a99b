//! Rebuild content or change lists from a user-chosen subset of changes.
//!
//! Selections pair with change-list entries by change type plus line
//! offset, consumed strictly in list order: each selection entry is spent
//! on the first change that pairs with it and never considered again, so a
//! selection can only ever match the changes it was lifted from.

use crate::format::FormattedFileChange;
use crate::types::{ChangeType, LineChange};

fn pairs_with(selection: &LineChange, change: &LineChange) -> bool {
    selection.kind == change.kind && selection.line_offset == change.line_offset
}

/// Rebuild file content from `changes`, applying only the entries listed
/// in `applying`.
///
/// An applied change contributes its post-change text, so an applied
/// removal disappears. A change not in the selection contributes its
/// pre-change text, so an unapplied addition disappears. Unchanged lines
/// always pass through.
pub fn target_content(changes: &[LineChange], applying: &[LineChange]) -> String {
    let mut result = String::new();
    let mut next = 0usize;
    for change in changes {
        match applying.get(next) {
            Some(selected) if pairs_with(selected, change) => {
                if change.kind != ChangeType::Removed {
                    result.push_str(&change.content);
                }
                next += 1;
            }
            _ => {
                if change.kind != ChangeType::Added {
                    result.push_str(&change.content);
                }
            }
        }
    }
    result
}

/// Rebuild the suggested view of a formatted change list with the entries
/// in `rejecting` rolled back.
///
/// A rejected addition is dropped; a rejected removal is kept with its kind
/// flipped to unchanged, since the line stays in the file after the
/// rejection. Entries not being rejected keep the suggested view: removals
/// disappear and everything else stays as-is.
pub fn suggested_file_change<S: Clone>(
    file: &FormattedFileChange<S>,
    rejecting: &[LineChange],
) -> FormattedFileChange<S> {
    let mut changes = Vec::with_capacity(file.changes.len());
    let mut next = 0usize;
    for entry in &file.changes {
        match rejecting.get(next) {
            Some(rejected) if pairs_with(rejected, &entry.change) => {
                if entry.change.kind != ChangeType::Added {
                    let mut restored = entry.clone();
                    restored.change.kind = ChangeType::Unchanged;
                    changes.push(restored);
                }
                next += 1;
            }
            _ => {
                if entry.change.kind != ChangeType::Removed {
                    changes.push(entry.clone());
                }
            }
        }
    }
    FormattedFileChange { changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{format_changes, Highlighter};
    use crate::types::FileChange;

    struct Plain;

    impl Highlighter for Plain {
        type Styled = String;

        fn highlight(&self, text: &str, _language_hint: &str) -> String {
            text.to_string()
        }
    }

    fn selection(changes: &[LineChange], kinds: &[ChangeType]) -> Vec<LineChange> {
        changes
            .iter()
            .filter(|c| kinds.contains(&c.kind))
            .cloned()
            .collect()
    }

    // =========================================================================
    // target_content
    // =========================================================================

    #[test]
    fn test_applying_every_change_yields_new_content() {
        let file = FileChange::between("a\nb\nc\n", "a\nx\ny\n").unwrap();
        let all = selection(&file.changes, &[ChangeType::Added, ChangeType::Removed]);
        assert_eq!(target_content(&file.changes, &all), file.new_content);
    }

    #[test]
    fn test_applying_nothing_yields_old_content() {
        let file = FileChange::between("a\nb\nc\n", "a\nx\ny\n").unwrap();
        assert_eq!(target_content(&file.changes, &[]), file.old_content);
    }

    #[test]
    fn test_applying_only_the_first_edit() {
        let file = FileChange::between("a\nb\nc\n", "A\nb\nC\n").unwrap();
        let first_pair: Vec<LineChange> = file
            .changes
            .iter()
            .filter(|c| c.kind != ChangeType::Unchanged)
            .take(2)
            .cloned()
            .collect();
        assert_eq!(target_content(&file.changes, &first_pair), "A\nb\nc\n");
    }

    #[test]
    fn test_applying_only_the_second_edit() {
        let file = FileChange::between("a\nb\nc\n", "A\nb\nC\n").unwrap();
        let second_pair: Vec<LineChange> = file
            .changes
            .iter()
            .filter(|c| c.kind != ChangeType::Unchanged)
            .skip(2)
            .cloned()
            .collect();
        assert_eq!(target_content(&file.changes, &second_pair), "a\nb\nC\n");
    }

    #[test]
    fn test_applying_a_removal_without_its_addition() {
        let file = FileChange::between("a\nb\nc\n", "a\nx\nc\n").unwrap();
        let only_removal = selection(&file.changes, &[ChangeType::Removed]);
        assert_eq!(target_content(&file.changes, &only_removal), "a\nc\n");
    }

    #[test]
    fn test_selection_is_consumed_in_order() {
        // The selection lists the later addition first, so the earlier
        // removal entry behind it can never pair up and is ignored.
        let file = FileChange::between("a\nb\nc\n", "A\nb\nC\n").unwrap();
        let mut out_of_order = selection(&file.changes, &[ChangeType::Added]);
        out_of_order.rotate_left(1);
        out_of_order.extend(selection(&file.changes, &[ChangeType::Removed]));
        assert_eq!(
            target_content(&file.changes, &out_of_order),
            "a\nb\nc\nC\n"
        );
    }

    // =========================================================================
    // suggested_file_change
    // =========================================================================

    #[test]
    fn test_rejecting_nothing_keeps_suggested_view() {
        let file = FileChange::between("a\nb\nc\n", "a\nx\nc\n").unwrap();
        let formatted = format_changes(&file.changes, &Plain, "txt");
        let suggested = suggested_file_change(&formatted, &[]);
        let contents: Vec<&str> = suggested
            .changes
            .iter()
            .map(|e| e.change.content.as_str())
            .collect();
        assert_eq!(contents, vec!["a\n", "x\n", "c\n"]);
        assert_eq!(suggested.changes[1].change.kind, ChangeType::Added);
    }

    #[test]
    fn test_rejecting_a_pair_restores_the_old_line() {
        let file = FileChange::between("a\nb\nc\n", "a\nx\nc\n").unwrap();
        let formatted = format_changes(&file.changes, &Plain, "txt");
        let rejecting = selection(&file.changes, &[ChangeType::Added, ChangeType::Removed]);
        let suggested = suggested_file_change(&formatted, &rejecting);
        let contents: Vec<&str> = suggested
            .changes
            .iter()
            .map(|e| e.change.content.as_str())
            .collect();
        assert_eq!(contents, vec!["a\n", "b\n", "c\n"]);
        assert!(suggested
            .changes
            .iter()
            .all(|e| e.change.kind == ChangeType::Unchanged));
    }

    #[test]
    fn test_rejected_removal_keeps_its_formatting() {
        let file = FileChange::between("keep\n", "gone\n").unwrap();
        let formatted = format_changes(&file.changes, &Plain, "txt");
        let rejecting = selection(&file.changes, &[ChangeType::Added, ChangeType::Removed]);
        let suggested = suggested_file_change(&formatted, &rejecting);
        assert_eq!(suggested.changes.len(), 1);
        assert_eq!(suggested.changes[0].change.kind, ChangeType::Unchanged);
        assert_eq!(suggested.changes[0].formatted_content, "keep\n");
    }

    #[test]
    fn test_rejecting_part_of_a_suggestion() {
        let file = FileChange::between("a\nb\nc\n", "A\nb\nC\n").unwrap();
        let formatted = format_changes(&file.changes, &Plain, "txt");
        let reject_first: Vec<LineChange> = file
            .changes
            .iter()
            .filter(|c| c.kind != ChangeType::Unchanged)
            .take(2)
            .cloned()
            .collect();
        let suggested = suggested_file_change(&formatted, &reject_first);
        let contents: Vec<&str> = suggested
            .changes
            .iter()
            .map(|e| e.change.content.as_str())
            .collect();
        assert_eq!(contents, vec!["a\n", "b\n", "C\n"]);
        assert_eq!(suggested.changes[2].change.kind, ChangeType::Added);
    }
}
