//! Paragraph alignment and indentation over the paragraphs a selection touches.

use super::selection;
use crate::EditError;
use core_events::ChangeFlags;
use core_state::EditorState;
use core_text::{AttributeSet, Document, ParagraphStyle, TextRange};

/// Points added or removed by one indent step.
pub const INDENT_STEP: u16 = 20;

pub(crate) fn indent(style: &mut ParagraphStyle) {
    style.first_line_head_indent = style.first_line_head_indent.saturating_add(INDENT_STEP);
    style.head_indent = style.head_indent.saturating_add(INDENT_STEP);
}

pub(crate) fn outdent(style: &mut ParagraphStyle) {
    style.first_line_head_indent = style.first_line_head_indent.saturating_sub(INDENT_STEP);
    style.head_indent = style.head_indent.saturating_sub(INDENT_STEP);
}

/// Split `bounds` into paragraphs, each keeping its trailing newline.
fn paragraphs(doc: &Document, bounds: TextRange) -> Vec<TextRange> {
    let mut out = Vec::new();
    let mut start = bounds.location;
    for i in bounds.location..bounds.end() {
        if doc.char_at(i) == Some('\n') {
            out.push(TextRange::from_bounds(start, i + 1));
            start = i + 1;
        }
    }
    if start < bounds.end() {
        out.push(TextRange::from_bounds(start, bounds.end()));
    }
    out
}

/// Update each touched paragraph's style from its current one. A caret on
/// an empty trailing line updates the typing attributes instead.
pub(crate) fn update_paragraphs(
    state: &mut EditorState,
    f: impl Fn(&mut ParagraphStyle),
) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    let bounds = state.document().paragraph_bounds(sel);
    if bounds.is_empty() {
        let typing = state.typing_attributes().clone();
        let mut style = typing.paragraph().unwrap_or_default();
        f(&mut style);
        state.set_typing_attributes(typing.with_paragraph(style));
        return Ok(ChangeFlags::FORMATTING);
    }
    state.edit_with_snapshot(|doc, _| {
        for para in paragraphs(doc, bounds) {
            let mut style = doc.attributes_at(para.location).paragraph().unwrap_or_default();
            f(&mut style);
            doc.set_attributes(&AttributeSet::new().with_paragraph(style), para)?;
        }
        Ok::<_, EditError>(())
    })?;
    Ok(ChangeFlags::TEXT | ChangeFlags::HISTORY)
}
