//! Decorate line changes with externally produced styled text.

use serde::{Deserialize, Serialize};

use crate::types::LineChange;

/// Collaborator that turns plain line text into an opaque styled payload.
///
/// Implemented by the presentation layer, typically a syntax highlighter.
/// The engine forwards the payload untouched and never inspects it.
pub trait Highlighter {
    /// Styled-text type this highlighter produces.
    type Styled;

    /// Style one line of content. `language_hint` names the source language
    /// the way the caller's highlighter expects it, typically a file
    /// extension.
    fn highlight(&self, text: &str, language_hint: &str) -> Self::Styled;
}

/// A [`LineChange`] paired with its styled rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedLineChange<S> {
    /// The underlying change
    #[serde(flatten)]
    pub change: LineChange,
    /// Opaque styled payload produced by a [`Highlighter`]
    pub formatted_content: S,
}

/// Ordered formatted changes covering one file's full diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedFileChange<S> {
    pub changes: Vec<FormattedLineChange<S>>,
}

/// Pair every change with the highlighter's styling of its content.
pub fn format_changes<H: Highlighter>(
    changes: &[LineChange],
    highlighter: &H,
    language_hint: &str,
) -> FormattedFileChange<H::Styled> {
    let changes = changes
        .iter()
        .map(|change| FormattedLineChange {
            change: change.clone(),
            formatted_content: highlighter.highlight(&change.content, language_hint),
        })
        .collect();
    FormattedFileChange { changes }
}
