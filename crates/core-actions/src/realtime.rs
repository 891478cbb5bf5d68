//! Real-time inline formatting run after every host text change.
//!
//! Passes run over the whole buffer, in order, on the working copy of the
//! document before it is committed:
//! 1. hashtags (`#\w+`) restyled, with the character just typed inside a tag
//!    stripped first so it never renders half-styled
//! 2. `"` pairs matched left to right; the interior of each pair styled, an
//!    unmatched trailing open quote left alone
//! 3. link retraction: a link on the character before the caret is removed
//!    from that character, then every remaining link gets its underline back
//!
//! Regex matches are byte offsets into the plain text; they are converted to
//! character offsets before touching the document.

use crate::resolver::{hashtag_attributes, quote_interior_attributes};
use core_config::ThemeConfig;
use core_state::FormattingState;
use core_text::{AttributeKey, AttributeSet, Document, DocumentError, TextRange};
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));
static VALID_HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[A-Za-z0-9_]+$").expect("valid hashtag validator regex"));
static ANGLE_BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("valid angle bracket regex"));

/// Incremental byte → char offset conversion for ascending byte offsets.
struct CharOffsets<'t> {
    text: &'t str,
    byte: usize,
    chars: usize,
}

impl<'t> CharOffsets<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn char_at(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

fn regex_ranges(re: &Regex, text: &str) -> Vec<TextRange> {
    let mut offsets = CharOffsets::new(text);
    re.find_iter(text)
        .map(|m| {
            let start = offsets.char_at(m.start());
            let end = offsets.char_at(m.end());
            TextRange::from_bounds(start, end)
        })
        .collect()
}

/// Character ranges of every `#\w+` run.
pub fn hashtag_ranges(text: &str) -> Vec<TextRange> {
    regex_ranges(&HASHTAG_RE, text)
}

/// Character ranges of every `<...>` span (no newlines inside).
pub fn angle_bracket_ranges(text: &str) -> Vec<TextRange> {
    regex_ranges(&ANGLE_BRACKET_RE, text)
}

/// Whole-string hashtag check: `#` followed by ASCII letters, digits or `_`.
pub fn is_valid_hashtag(s: &str) -> bool {
    VALID_HASHTAG_RE.is_match(s)
}

/// Interiors of `"` pairs, matched left to right. Empty interiors are skipped.
pub fn quote_interiors(text: &str) -> Vec<TextRange> {
    let mut out = Vec::new();
    let mut open: Option<usize> = None;
    for (index, ch) in text.chars().enumerate() {
        if ch != '"' {
            continue;
        }
        match open.take() {
            Some(start) if index > start + 1 => {
                out.push(TextRange::from_bounds(start + 1, index));
            }
            Some(_) => {}
            None => open = Some(index),
        }
    }
    out
}

pub fn apply_hashtags(
    doc: &mut Document,
    cursor: usize,
    attrs: &AttributeSet,
) -> Result<usize, DocumentError> {
    let ranges = hashtag_ranges(&doc.text());
    for range in &ranges {
        if cursor > 0 && range.contains(cursor - 1) {
            let typed = TextRange::new(cursor - 1, 1);
            doc.remove_attribute(AttributeKey::ForegroundColor, typed)?;
            doc.remove_attribute(AttributeKey::Font, typed)?;
        }
        doc.set_attributes(attrs, *range)?;
    }
    Ok(ranges.len())
}

pub fn apply_quotes(doc: &mut Document, attrs: &AttributeSet) -> Result<usize, DocumentError> {
    let ranges = quote_interiors(&doc.text());
    for range in &ranges {
        doc.set_attributes(attrs, *range)?;
    }
    Ok(ranges.len())
}

/// Returns true when a link was cut at the caret.
pub fn retract_hyperlink(
    doc: &mut Document,
    cursor: usize,
    theme: &ThemeConfig,
) -> Result<bool, DocumentError> {
    let mut retracted = false;
    if cursor > 0
        && cursor <= doc.len()
        && doc.attributes_at(cursor - 1).link().is_some()
    {
        doc.remove_attribute(AttributeKey::Link, TextRange::new(cursor - 1, 1))?;
        retracted = true;
    }
    let reassert = AttributeSet::new()
        .with_underline()
        .with_foreground(theme.hyperlink);
    for (range, _) in doc.ranges_with(AttributeKey::Link) {
        doc.set_attributes(&reassert, range)?;
    }
    Ok(retracted)
}

/// Run all passes in order against `doc` with the caret at `cursor`.
pub fn format_realtime(
    doc: &mut Document,
    cursor: usize,
    formatting: &FormattingState,
    theme: &ThemeConfig,
) -> Result<(), DocumentError> {
    let hashtags = apply_hashtags(doc, cursor, &hashtag_attributes(formatting, theme))?;
    let quotes = apply_quotes(doc, &quote_interior_attributes(formatting, theme))?;
    let retracted = retract_hyperlink(doc, cursor, theme)?;
    trace!(target: "actions.format", cursor, hashtags, quotes, retracted, "realtime_pass");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Color;
    use pretty_assertions::assert_eq;

    fn theme() -> ThemeConfig {
        ThemeConfig::default()
    }

    #[test]
    fn hashtag_pass_styles_exactly_the_tag() {
        let mut doc = Document::from_text("see #demo now");
        let f = FormattingState::default();
        format_realtime(&mut doc, 0, &f, &theme()).unwrap();
        assert_eq!(
            doc.ranges_with(AttributeKey::ForegroundColor)
                .into_iter()
                .map(|(r, _)| r)
                .collect::<Vec<_>>(),
            vec![TextRange::new(4, 5)]
        );
        assert_eq!(
            doc.ranges_with(AttributeKey::Font)
                .into_iter()
                .map(|(r, _)| r)
                .collect::<Vec<_>>(),
            vec![TextRange::new(4, 5)]
        );
        for i in (0..4).chain(9..13) {
            assert!(doc.attributes_at(i).is_empty(), "char {i} styled");
        }
    }

    #[test]
    fn hashtag_being_typed_is_fully_styled() {
        let mut doc = Document::from_text("#de");
        let f = FormattingState::default();
        format_realtime(&mut doc, 3, &f, &theme()).unwrap();
        let styled = doc.ranges_with(AttributeKey::ForegroundColor);
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].0, TextRange::new(0, 3));
    }

    #[test]
    fn hashtag_ranges_count_chars_not_bytes() {
        assert_eq!(
            hashtag_ranges("é #ça va #x"),
            vec![TextRange::new(2, 3), TextRange::new(9, 2)]
        );
    }

    #[test]
    fn quote_pairs_and_unmatched_open() {
        assert_eq!(
            quote_interiors(r#"a "bc" "" "de" "open"#),
            vec![TextRange::new(3, 2), TextRange::new(11, 2)]
        );
        assert!(quote_interiors(r#"only "one"#).is_empty());
    }

    #[test]
    fn quote_pass_styles_interior_gray() {
        let mut doc = Document::from_text(r#"say "hi" ok"#);
        apply_quotes(
            &mut doc,
            &quote_interior_attributes(&FormattingState::default(), &theme()),
        )
        .unwrap();
        assert_eq!(doc.attributes_at(5).foreground(), Some(Color::SYSTEM_GRAY));
        assert!(doc.attributes_at(4).is_empty());
        assert!(doc.attributes_at(7).is_empty());
    }

    #[test]
    fn link_is_cut_at_caret_and_rest_reasserted() {
        let mut doc = Document::from_text("linkx");
        doc.set_attributes(
            &AttributeSet::new().with_link("https://a.b"),
            TextRange::new(0, 5),
        )
        .unwrap();
        let cut = retract_hyperlink(&mut doc, 5, &theme()).unwrap();
        assert!(cut);
        assert!(doc.attributes_at(4).link().is_none());
        assert_eq!(doc.attributes_at(3).link(), Some("https://a.b"));
        assert!(doc.attributes_at(0).is_underlined());
        assert!(doc.attributes_at(3).is_underlined());
    }

    #[test]
    fn no_link_before_caret_leaves_document_alone() {
        let mut doc = Document::from_text("plain");
        let before = doc.clone();
        assert!(!retract_hyperlink(&mut doc, 5, &theme()).unwrap());
        assert_eq!(doc, before);
    }

    #[test]
    fn hashtag_validation() {
        assert!(is_valid_hashtag("#rust_2024"));
        assert!(!is_valid_hashtag("#"));
        assert!(!is_valid_hashtag("#two words"));
        assert!(!is_valid_hashtag("#café"));
    }

    #[test]
    fn angle_brackets_are_lazy() {
        assert_eq!(
            angle_bracket_ranges("<a> and <bc>"),
            vec![TextRange::new(0, 3), TextRange::new(8, 4)]
        );
    }
}
