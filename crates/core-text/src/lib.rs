//! Rope-based attributed document.
//!
//! A `Document` is an ordered sequence of Unicode scalar values (stored in a
//! `ropey::Rope`) plus a `RunList` of per-attribute style runs and a map of
//! inline attachments keyed by their slot offset.
//!
//! Invariants (hold after every public call):
//! * Runs of the same key never overlap and never extend past `len()`.
//! * Every attachment key is `< len()` and the character at that offset is
//!   `ATTACHMENT_CHAR`; no other character is.
//! * Offsets are character (scalar) offsets, never bytes.
//!
//! Every mutating operation validates its range first and returns
//! `DocumentError` without touching anything when the range falls outside
//! `[0, len()]`. Callers that want best-effort behavior clamp with
//! `TextRange::clamp_to` before calling in. Documents are cheap to clone
//! (rope nodes and image bytes are shared), so callers snapshot by cloning.

use ropey::Rope;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tracing::trace;

pub mod attachment;
pub mod attributes;
pub mod range;
pub mod runs;

pub use attachment::{ATTACHMENT_CHAR, Attachment, FileAttachment, ImageAttachment};
pub use attributes::{
    Alignment, AttributeKey, AttributeSet, AttributeValue, Color, ColorParseError, Font,
    FontTraits, FontWeight, LineStyle, ParagraphStyle, TextStyle,
};
pub use range::{NOT_FOUND, TextRange};
pub use runs::{Run, RunList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("range {location}+{length} outside document of length {len}")]
    InvalidRange {
        location: usize,
        length: usize,
        len: usize,
    },
    #[error("position {at} outside document of length {len}")]
    InvalidPosition { at: usize, len: usize },
}

#[derive(Clone)]
pub struct Document {
    rope: Rope,
    runs: RunList,
    attachments: BTreeMap<usize, Attachment>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.rope == other.rope && self.runs == other.runs && self.attachments == other.attachments
    }
}

impl Eq for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text())
            .field("runs", &self.runs)
            .field("attachments", &self.attachments.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            runs: RunList::new(),
            attachments: BTreeMap::new(),
        }
    }

    /// Unstyled document holding `text`. Stray `ATTACHMENT_CHAR`s are dropped.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&strip_attachment_chars(text)),
            runs: RunList::new(),
            attachments: BTreeMap::new(),
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Plain text; attachments appear as `ATTACHMENT_CHAR`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.rope.get_char(index)
    }

    pub fn runs(&self) -> &RunList {
        &self.runs
    }

    pub fn attributes_at(&self, index: usize) -> AttributeSet {
        self.runs.attributes_at(index)
    }

    pub fn attachment_at(&self, index: usize) -> Option<&Attachment> {
        self.attachments.get(&index)
    }

    pub fn attachments(&self) -> impl Iterator<Item = (usize, &Attachment)> {
        self.attachments.iter().map(|(k, v)| (*k, v))
    }

    pub fn check_range(&self, range: TextRange) -> Result<(), DocumentError> {
        if range.fits(self.len()) {
            Ok(())
        } else {
            Err(DocumentError::InvalidRange {
                location: range.location,
                length: range.length,
                len: self.len(),
            })
        }
    }

    pub fn check_position(&self, at: usize) -> Result<(), DocumentError> {
        if at <= self.len() {
            Ok(())
        } else {
            Err(DocumentError::InvalidPosition { at, len: self.len() })
        }
    }

    /// Text covered by `range`.
    pub fn slice(&self, range: TextRange) -> Result<String, DocumentError> {
        self.check_range(range)?;
        Ok(self.rope.slice(range.as_range()).to_string())
    }

    /// Insert unstyled `text` at `at`. Returns the number of characters
    /// inserted. `ATTACHMENT_CHAR` is dropped from `text`: slots only come
    /// from `insert_attachment`.
    pub fn insert(&mut self, at: usize, text: &str) -> Result<usize, DocumentError> {
        self.check_position(at)?;
        self.insert_raw(at, &strip_attachment_chars(text))
    }

    fn insert_raw(&mut self, at: usize, text: &str) -> Result<usize, DocumentError> {
        let n = text.chars().count();
        if n == 0 {
            return Ok(0);
        }
        self.rope.insert(at, text);
        self.runs.insert_gap(at, n);
        self.shift_attachments(at, n);
        trace!(target: "text.document", op = "insert", at, chars = n, len = self.len(), "mutate");
        Ok(n)
    }

    /// Insert `text` at `at` carrying `attrs` over exactly the inserted span.
    pub fn insert_with_attributes(
        &mut self,
        at: usize,
        text: &str,
        attrs: &AttributeSet,
    ) -> Result<usize, DocumentError> {
        let n = self.insert(at, text)?;
        self.set_attributes(attrs, TextRange::new(at, n))?;
        Ok(n)
    }

    /// Remove `range`, returning the removed text.
    pub fn delete(&mut self, range: TextRange) -> Result<String, DocumentError> {
        self.check_range(range)?;
        if range.is_empty() {
            return Ok(String::new());
        }
        let removed = self.rope.slice(range.as_range()).to_string();
        self.rope.remove(range.as_range());
        self.runs.remove_span(range.location, range.end());
        self.collapse_attachments(range);
        trace!(target: "text.document", op = "delete", at = range.location, chars = range.length, len = self.len(), "mutate");
        Ok(removed)
    }

    /// Replace `range` with unstyled `text`. Returns the inserted character count.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<usize, DocumentError> {
        self.check_range(range)?;
        self.delete(range)?;
        self.insert(range.location, text)
    }

    /// Apply every key in `attrs` over `range`. Keys absent from `attrs` are
    /// left as they are. Text and length never change.
    pub fn set_attributes(
        &mut self,
        attrs: &AttributeSet,
        range: TextRange,
    ) -> Result<(), DocumentError> {
        self.check_range(range)?;
        for (key, value) in attrs.iter() {
            self.runs.set(key, value.clone(), range.location, range.end());
        }
        Ok(())
    }

    pub fn remove_attribute(
        &mut self,
        key: AttributeKey,
        range: TextRange,
    ) -> Result<(), DocumentError> {
        self.check_range(range)?;
        self.runs.clear(key, range.location, range.end());
        Ok(())
    }

    /// Insert an attachment into one slot at `at`.
    pub fn insert_attachment(
        &mut self,
        at: usize,
        attachment: Attachment,
    ) -> Result<(), DocumentError> {
        self.check_position(at)?;
        let mut buf = [0u8; 4];
        self.insert_raw(at, ATTACHMENT_CHAR.encode_utf8(&mut buf))?;
        self.attachments.insert(at, attachment);
        Ok(())
    }

    /// Ranges carrying `key`, in document order (one entry per run).
    pub fn ranges_with(&self, key: AttributeKey) -> Vec<(TextRange, AttributeValue)> {
        self.runs
            .runs(key)
            .iter()
            .map(|r| (TextRange::new(r.start, r.len), r.value.clone()))
            .collect()
    }

    /// Expand `range` to whole paragraphs (newline-delimited). The trailing
    /// newline of the last paragraph is included when present.
    pub fn paragraph_bounds(&self, range: TextRange) -> TextRange {
        let r = range.clamp_to(self.len());
        let start_line = self.rope.char_to_line(r.location);
        let last = if r.is_empty() { r.location } else { r.end() - 1 };
        let end_line = self.rope.char_to_line(last);
        let start = self.rope.line_to_char(start_line);
        let end = if end_line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(end_line + 1)
        } else {
            self.len()
        };
        TextRange::from_bounds(start, end)
    }

    /// Paragraph style of the paragraph `span` sits in, read from the
    /// character before it or, at a paragraph start, the one after it.
    pub fn paragraph_style_around(&self, span: TextRange) -> Option<ParagraphStyle> {
        let before = span
            .location
            .checked_sub(1)
            .filter(|i| self.char_at(*i).is_some_and(|c| c != '\n'));
        let source = before.or_else(|| Some(span.end()).filter(|i| *i < self.len()))?;
        self.attributes_at(source).paragraph()
    }

    /// Content hash over text, runs and attachments.
    pub fn content_hash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        for chunk in self.rope.chunks() {
            h.write(chunk.as_bytes());
        }
        self.runs.hash(&mut h);
        self.attachments.hash(&mut h);
        h.finish()
    }

    fn shift_attachments(&mut self, at: usize, n: usize) {
        if self.attachments.range(at..).next().is_none() {
            return;
        }
        let moved = self.attachments.split_off(&at);
        self.attachments
            .extend(moved.into_iter().map(|(k, v)| (k + n, v)));
    }

    fn collapse_attachments(&mut self, range: TextRange) {
        if self.attachments.range(range.location..).next().is_none() {
            return;
        }
        let mut tail = self.attachments.split_off(&range.location);
        let after = tail.split_off(&range.end());
        self.attachments
            .extend(after.into_iter().map(|(k, v)| (k - range.length, v)));
    }
}

fn strip_attachment_chars(text: &str) -> std::borrow::Cow<'_, str> {
    if text.contains(ATTACHMENT_CHAR) {
        text.replace(ATTACHMENT_CHAR, "").into()
    } else {
        text.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn red() -> AttributeSet {
        AttributeSet::new().with_foreground(Color::rgb(255, 0, 0))
    }

    #[test]
    fn create_document_and_read_text() {
        let d = Document::from_text("hello\nworld");
        assert_eq!(d.len(), 11);
        assert_eq!(d.text(), "hello\nworld");
        assert_eq!(d.char_at(5), Some('\n'));
        assert_eq!(d.to_string(), "hello\nworld");
    }

    #[test]
    fn offsets_count_scalars_not_bytes() {
        let mut d = Document::from_text("añb");
        assert_eq!(d.len(), 3);
        d.insert(2, "😀").unwrap();
        assert_eq!(d.text(), "añ😀b");
        assert_eq!(d.slice(TextRange::new(2, 1)).unwrap(), "😀");
    }

    #[test]
    fn insert_out_of_range_is_rejected_without_mutation() {
        let mut d = Document::from_text("abc");
        let before = d.clone();
        assert_eq!(
            d.insert(4, "x"),
            Err(DocumentError::InvalidPosition { at: 4, len: 3 })
        );
        assert!(matches!(
            d.delete(TextRange::new(2, 5)),
            Err(DocumentError::InvalidRange { .. })
        ));
        assert!(d.set_attributes(&red(), TextRange::not_found()).is_err());
        assert_eq!(d, before);
    }

    #[test]
    fn set_attributes_preserves_text_and_length() {
        let mut d = Document::from_text("styled text");
        d.set_attributes(&red(), TextRange::new(0, 6)).unwrap();
        assert_eq!(d.text(), "styled text");
        assert_eq!(d.len(), 11);
        assert_eq!(d.attributes_at(5).foreground(), Some(Color::rgb(255, 0, 0)));
        assert!(d.attributes_at(6).is_empty());
    }

    #[test]
    fn insert_inside_run_leaves_new_text_unstyled() {
        let mut d = Document::from_text("abcd");
        d.set_attributes(&red(), TextRange::new(0, 4)).unwrap();
        d.insert(2, "XY").unwrap();
        assert!(d.attributes_at(2).is_empty());
        assert!(d.attributes_at(3).is_empty());
        assert_eq!(d.attributes_at(4).foreground(), Some(Color::rgb(255, 0, 0)));
        assert_eq!(d.runs().max_end(), d.len());
    }

    #[test]
    fn delete_truncates_runs() {
        let mut d = Document::from_text("0123456789");
        d.set_attributes(&red(), TextRange::new(2, 6)).unwrap();
        let removed = d.delete(TextRange::new(5, 5)).unwrap();
        assert_eq!(removed, "56789");
        let runs = d.ranges_with(AttributeKey::ForegroundColor);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, TextRange::new(2, 3));
    }

    #[test]
    fn replace_swaps_text() {
        let mut d = Document::from_text("hello world");
        let n = d.replace(TextRange::new(6, 5), "rust!").unwrap();
        assert_eq!(n, 5);
        assert_eq!(d.text(), "hello rust!");
    }

    #[test]
    fn attachments_shift_with_edits() {
        let mut d = Document::from_text("ab");
        let img = Attachment::Image(ImageAttachment::new(vec![9u8], 10, 10));
        d.insert_attachment(1, img.clone()).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.char_at(1), Some(ATTACHMENT_CHAR));
        d.insert(0, "xx").unwrap();
        assert_eq!(d.attachment_at(3), Some(&img));
        d.delete(TextRange::new(0, 2)).unwrap();
        assert_eq!(d.attachment_at(1), Some(&img));
        d.delete(TextRange::new(1, 1)).unwrap();
        assert_eq!(d.attachments().count(), 0);
        assert_eq!(d.text(), "ab");
    }

    #[test]
    fn bare_attachment_chars_never_become_slots() {
        let mut d = Document::from_text("a\u{FFFC}b");
        assert_eq!(d.text(), "ab");
        let n = d.insert(1, "\u{FFFC}x").unwrap();
        assert_eq!(n, 1);
        assert_eq!(d.text(), "axb");
        assert_eq!(d.insert(1, "\u{FFFC}").unwrap(), 0);
        assert_eq!(d.attachments().count(), 0);
    }

    #[test]
    fn paragraph_style_comes_from_the_surrounding_paragraph() {
        let mut d = Document::from_text("ab\ncd");
        let centered = ParagraphStyle {
            alignment: Alignment::Center,
            ..ParagraphStyle::default()
        };
        d.set_attributes(
            &AttributeSet::new().with_paragraph(centered),
            TextRange::new(3, 2),
        )
        .unwrap();
        assert_eq!(
            d.paragraph_style_around(TextRange::new(4, 0)),
            Some(centered)
        );
        // Paragraph start: the previous char is the newline, look ahead.
        assert_eq!(d.paragraph_style_around(TextRange::new(3, 0)), Some(centered));
        assert_eq!(d.paragraph_style_around(TextRange::new(1, 0)), None);
    }

    #[test]
    fn paragraph_bounds_cover_whole_lines() {
        let d = Document::from_text("one\ntwo\nthree");
        assert_eq!(d.paragraph_bounds(TextRange::caret(5)), TextRange::new(4, 4));
        assert_eq!(d.paragraph_bounds(TextRange::new(2, 4)), TextRange::new(0, 8));
        assert_eq!(d.paragraph_bounds(TextRange::caret(13)), TextRange::new(8, 5));
        assert_eq!(
            Document::new().paragraph_bounds(TextRange::caret(0)),
            TextRange::new(0, 0)
        );
    }

    #[test]
    fn equal_content_means_equal_documents_and_hashes() {
        let mut a = Document::from_text("abc");
        let mut b = Document::from_text("abc");
        a.set_attributes(&red(), TextRange::new(0, 1)).unwrap();
        a.set_attributes(&red(), TextRange::new(1, 2)).unwrap();
        b.set_attributes(&red(), TextRange::new(0, 3)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());
        b.remove_attribute(AttributeKey::ForegroundColor, TextRange::new(2, 1))
            .unwrap();
        assert_ne!(a, b);
    }
}
