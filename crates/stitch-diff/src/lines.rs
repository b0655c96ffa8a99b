//! Line tokenization shared by every stage of the pipeline.
//!
//! All components index the same newline-inclusive line array, so a line
//! index computed by one stage stays valid in every other.

/// Split text into lines, each keeping its trailing newline.
///
/// The final line carries no newline when the text does not end with one.
/// Empty text yields no lines at all.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Line content without its trailing `\n` or `\r\n` terminator.
pub(crate) fn line_text(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
