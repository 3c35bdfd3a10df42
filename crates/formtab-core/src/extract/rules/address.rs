//! Address extraction from free-text paragraphs.

use super::patterns::ADDRESS_MARKER;
use crate::models::analysis::Paragraph;

/// Text following the `E/S` marker in the first paragraph that has one,
/// with whitespace runs collapsed to single spaces.
///
/// Returns `None` when no paragraph carries the marker; a marker followed by
/// nothing but whitespace yields `Some("")`.
pub fn extract_address(paragraphs: &[Paragraph]) -> Option<String> {
    paragraphs.iter().find_map(|paragraph| {
        ADDRESS_MARKER
            .captures(&paragraph.content)
            .map(|caps| collapse_whitespace(&caps[1]))
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
