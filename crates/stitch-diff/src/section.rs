//! Group a change list into display sections.

use std::ops::Range;

use crate::types::{ChangeType, LineChange};

/// Index ranges of `changes` worth showing, each a maximal cluster of
/// changed lines padded with up to `min_separation` unchanged lines on both
/// sides (clamped to the list bounds).
///
/// Two changed lines share a section while the unchanged gap between them
/// is at most `2 * min_separation` lines; a longer gap closes the section
/// `min_separation` lines past its last change. Sections never overlap and
/// every changed line lands in exactly one of them. An all-unchanged list
/// yields no sections.
pub fn changed_sections(changes: &[LineChange], min_separation: usize) -> Vec<Range<usize>> {
    let mut sections = Vec::new();
    let mut start: Option<usize> = None;
    let mut last_changed = 0usize;
    let mut unchanged_run = 0usize;

    for (index, change) in changes.iter().enumerate() {
        if change.kind == ChangeType::Unchanged {
            unchanged_run += 1;
            if let Some(section_start) = start {
                if unchanged_run > 2 * min_separation {
                    sections.push(section_start..index - min_separation);
                    start = None;
                }
            }
        } else {
            unchanged_run = 0;
            last_changed = index;
            if start.is_none() {
                start = Some(index.saturating_sub(min_separation));
            }
        }
    }
    if let Some(section_start) = start {
        sections.push(section_start..(last_changed + min_separation + 1).min(changes.len()));
    }
    sections
}

/// Maximal runs of consecutive changed lines within one section.
///
/// `section` is an index range as produced by [`changed_sections`]; runs
/// are reported in order and never include unchanged lines.
pub fn continuous_changes(changes: &[LineChange], section: Range<usize>) -> Vec<Range<usize>> {
    let end = section.end.min(changes.len());
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for index in section.start.min(end)..end {
        if changes[index].kind != ChangeType::Unchanged {
            if run_start.is_none() {
                run_start = Some(index);
            }
        } else if let Some(started) = run_start.take() {
            runs.push(started..index);
        }
    }
    if let Some(started) = run_start {
        runs.push(started..end);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shorthand: 'u' is an unchanged line, anything else a changed one.
    fn changes(pattern: &str) -> Vec<LineChange> {
        pattern
            .chars()
            .enumerate()
            .map(|(i, c)| LineChange {
                kind: if c == 'u' {
                    ChangeType::Unchanged
                } else {
                    ChangeType::Added
                },
                line_offset: i,
                character_range: 0..0,
                content: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_single_cluster_is_padded_on_both_sides() {
        let list = changes("uuuuxuuuu");
        assert_eq!(changed_sections(&list, 2), vec![2..7]);
    }

    #[test]
    fn test_padding_is_clamped_to_the_list() {
        let list = changes("xuu");
        assert_eq!(changed_sections(&list, 2), vec![0..3]);

        let list = changes("uux");
        assert_eq!(changed_sections(&list, 2), vec![0..3]);
    }

    #[test]
    fn test_gap_of_twice_the_separation_keeps_one_section() {
        let list = changes("xuuuux");
        assert_eq!(changed_sections(&list, 2), vec![0..6]);
    }

    #[test]
    fn test_longer_gap_splits_sections() {
        let list = changes("xuuuuux");
        assert_eq!(changed_sections(&list, 2), vec![0..3, 4..7]);
    }

    #[test]
    fn test_zero_separation_isolates_each_run() {
        let list = changes("xxuxu");
        assert_eq!(changed_sections(&list, 0), vec![0..2, 3..4]);
    }

    #[test]
    fn test_all_unchanged_yields_no_sections() {
        assert!(changed_sections(&changes("uuuu"), 2).is_empty());
        assert!(changed_sections(&[], 2).is_empty());
    }

    #[test]
    fn test_every_changed_line_lands_in_exactly_one_section() {
        let list = changes("uxxuuuuuuxuxuuuuuuuuxu");
        let sections = changed_sections(&list, 3);

        for window in sections.windows(2) {
            assert!(window[0].end <= window[1].start, "sections must not overlap");
        }
        for (index, change) in list.iter().enumerate() {
            if change.kind != ChangeType::Unchanged {
                let containing = sections.iter().filter(|s| s.contains(&index)).count();
                assert_eq!(containing, 1, "changed line {index} must be in one section");
            }
        }
    }

    #[test]
    fn test_continuous_changes_splits_runs() {
        let list = changes("uxxuxu");
        let sections = changed_sections(&list, 1);
        assert_eq!(sections, vec![0..6]);
        assert_eq!(continuous_changes(&list, 0..6), vec![1..3, 4..5]);
    }

    #[test]
    fn test_continuous_changes_respects_section_bounds() {
        let list = changes("xxuuxx");
        assert_eq!(continuous_changes(&list, 1..5), vec![1..2, 4..5]);
    }

    #[test]
    fn test_continuous_changes_on_unchanged_section_is_empty() {
        let list = changes("uuu");
        assert!(continuous_changes(&list, 0..3).is_empty());
    }

    #[test]
    fn test_continuous_changes_clamps_out_of_bounds_section() {
        let list = changes("ux");
        assert_eq!(continuous_changes(&list, 0..10), vec![1..2]);
    }
}
