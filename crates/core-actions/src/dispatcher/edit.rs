//! Host text edits, selection changes and return-key list handling.
//!
//! Typed text receives the current typing attributes, then the real-time
//! formatter runs over the working copy before it is committed. Contiguous
//! typing coalesces into one undo entry; a newline or a replacement away
//! from the caret starts a new one.
//!
//! A newline typed while a list is active is not inserted verbatim: the
//! return-key handler either continues the list with the next marker or
//! exits the list and inserts a plain newline. It exits after a double
//! newline / double space, or on an item that holds only its marker, in
//! which case the marker is removed first.
//!
//! Inserted text joins the paragraph it lands in, so an aligned or indented
//! paragraph keeps one paragraph style throughout.

use super::{EDITED, EditContext, selection};
use crate::{EditError, realtime};
use core_events::ChangeFlags;
use core_state::{BULLET_MARKER, EditorState, ListState};
use core_text::{ATTACHMENT_CHAR, AttributeSet, Document, TextRange};
use tracing::{debug, trace};

/// Outcome of inspecting the caret context on return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReturnPlan {
    /// Double newline / double space before the caret: list reset.
    Exit,
    /// The caret's line holds only this marker: drop it and reset the list.
    ExitItem(TextRange),
    /// Insert this marker.
    Continue(String),
    /// No list active and no exit sequence.
    Inactive,
}

/// Decide what a return at `cursor` does, updating `list` accordingly.
pub(crate) fn plan_return(doc: &Document, cursor: usize, list: &mut ListState) -> ReturnPlan {
    if list.is_active()
        && let Some(marker) = empty_item(doc, cursor)
    {
        list.reset();
        return ReturnPlan::ExitItem(marker);
    }
    if cursor >= 2 {
        let window = TextRange::new(cursor - 2, 2).clamp_to(doc.len());
        if window.length == 2
            && let Ok(prev) = doc.slice(window)
            && (prev == "\n\n" || prev == "  ")
        {
            list.reset();
            return ReturnPlan::Exit;
        }
    }
    match list.next_marker() {
        Some(marker) => ReturnPlan::Continue(marker),
        None => ReturnPlan::Inactive,
    }
}

/// The marker span when the line around `cursor` is a list item with no
/// content.
fn empty_item(doc: &Document, cursor: usize) -> Option<TextRange> {
    let line = doc.paragraph_bounds(TextRange::caret(cursor));
    let at_line_end = cursor == line.end() || doc.char_at(cursor) == Some('\n');
    if !at_line_end {
        return None;
    }
    let head = TextRange::from_bounds(line.location, cursor);
    let text = doc.slice(head).ok()?;
    is_marker(&text).then_some(head)
}

fn is_marker(text: &str) -> bool {
    text == BULLET_MARKER
        || text
            .strip_suffix(". ")
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

pub(crate) fn replace_text(
    state: &mut EditorState,
    ctx: EditContext<'_>,
    range: TextRange,
    text: &str,
) -> Result<ChangeFlags, EditError> {
    if range.is_not_found() {
        return Err(EditError::NoSelection);
    }
    let range = range.clamp_to(state.document().len());
    // Attachment slots only come from attachment inserts.
    let text = text.replace(ATTACHMENT_CHAR, "");
    let text = text.as_str();
    if range.is_empty() && text.is_empty() {
        return Err(EditError::EmptyOperation("replace_text"));
    }
    if text == "\n" && state.list.is_active() {
        return newline_in_list(state, ctx, range);
    }
    if range.end() != state.selection().end() || text.contains('\n') {
        state.end_insert_coalescing();
    }

    let typing = state.typing_attributes().clone();
    let formatting = state.formatting.clone();
    let theme = ctx.theme;
    state.edit_coalesced(|doc, sel| {
        let n = doc.replace(range, text)?;
        let inserted = TextRange::new(range.location, n);
        if n > 0 && !typing.is_empty() {
            doc.set_attributes(&typing, inserted)?;
        }
        if n > 0
            && let Some(style) = doc.paragraph_style_around(inserted)
        {
            doc.set_attributes(&AttributeSet::new().with_paragraph(style), inserted)?;
        }
        let caret = range.location + n;
        *sel = TextRange::caret(caret);
        realtime::format_realtime(doc, caret, &formatting, theme)?;
        Ok::<_, EditError>(())
    })?;
    if text.contains('\n') {
        state.end_insert_coalescing();
    }
    trace!(target: "actions.dispatch", op = "replace_text", at = range.location, removed = range.length, inserted = text.chars().count(), "edit");
    Ok(EDITED)
}

fn newline_in_list(
    state: &mut EditorState,
    ctx: EditContext<'_>,
    range: TextRange,
) -> Result<ChangeFlags, EditError> {
    let mut list = state.list.clone();
    let typing = state.typing_attributes().clone();
    let formatting = state.formatting.clone();
    let theme = ctx.theme;
    let plan = state.edit_with_snapshot(|doc, sel| {
        doc.delete(range)?;
        let mut cursor = range.location;
        let plan = plan_return(doc, cursor, &mut list);
        let n = match &plan {
            ReturnPlan::Continue(marker) => doc.insert(cursor, marker)?,
            ReturnPlan::ExitItem(marker) => {
                doc.delete(*marker)?;
                cursor = marker.location;
                doc.insert_with_attributes(cursor, "\n", &typing)?
            }
            ReturnPlan::Exit | ReturnPlan::Inactive => {
                doc.insert_with_attributes(cursor, "\n", &typing)?
            }
        };
        *sel = TextRange::caret(cursor + n);
        realtime::format_realtime(doc, cursor + n, &formatting, theme)?;
        Ok::<_, EditError>(plan)
    })?;
    state.list = list;
    trace!(target: "actions.dispatch", op = "newline_in_list", ?plan, "edit");
    Ok(EDITED | ChangeFlags::LIST)
}

/// Return key at the caret: exit the list on a double newline / double
/// space, drop the marker of an empty item, otherwise insert the next
/// marker. Never inserts a bare newline.
pub(crate) fn return_key(
    state: &mut EditorState,
    _ctx: EditContext<'_>,
) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    let was_active = state.list.is_active();
    let mut list = state.list.clone();
    match plan_return(state.document(), sel.location, &mut list) {
        ReturnPlan::Exit => {
            state.list = list;
            if was_active {
                Ok(ChangeFlags::LIST)
            } else {
                Err(EditError::EmptyOperation("return_key"))
            }
        }
        ReturnPlan::Inactive => Err(EditError::EmptyOperation("return_key")),
        ReturnPlan::ExitItem(marker) => {
            state.edit_with_snapshot(|doc, s| {
                doc.delete(marker)?;
                *s = TextRange::caret(marker.location);
                Ok::<_, EditError>(())
            })?;
            state.list = list;
            Ok(EDITED | ChangeFlags::LIST)
        }
        ReturnPlan::Continue(marker) => {
            let at = sel.location;
            state.edit_with_snapshot(|doc, s| {
                let n = doc.insert(at, &marker)?;
                *s = TextRange::caret(at + n);
                Ok::<_, EditError>(())
            })?;
            state.list = list;
            Ok(EDITED | ChangeFlags::LIST)
        }
    }
}

/// Host selection change. In-range selections are taken as-is, the
/// not-found sentinel is kept, anything else falls back to `(0, 0)`.
pub(crate) fn set_selection(
    state: &mut EditorState,
    range: TextRange,
) -> Result<ChangeFlags, EditError> {
    let len = state.document().len();
    let next = if range.is_not_found() || range.fits(len) {
        range
    } else {
        debug!(target: "actions.dispatch", location = range.location, length = range.length, len, "selection_out_of_range");
        TextRange::caret(0)
    };
    if next == state.selection() {
        return Ok(ChangeFlags::empty());
    }
    state.set_selection(next);
    Ok(ChangeFlags::SELECTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_newline_exits() {
        let doc = Document::from_text("a\n\n");
        let mut list = ListState::default();
        list.toggle_bullet();
        assert_eq!(plan_return(&doc, 3, &mut list), ReturnPlan::Exit);
        assert!(!list.is_active());
    }

    #[test]
    fn double_space_exits() {
        let doc = Document::from_text("• item  ");
        let mut list = ListState::default();
        list.toggle_numbered();
        assert_eq!(plan_return(&doc, 8, &mut list), ReturnPlan::Exit);
    }

    #[test]
    fn otherwise_continues_with_next_marker() {
        let doc = Document::from_text("\n1. one");
        let mut list = ListState::default();
        list.toggle_numbered();
        list.next_marker();
        assert_eq!(
            plan_return(&doc, 7, &mut list),
            ReturnPlan::Continue("\n2. ".into())
        );
    }

    #[test]
    fn marker_only_line_exits_and_names_the_marker() {
        let doc = Document::from_text("\n• a\n• ");
        let mut list = ListState::default();
        list.toggle_bullet();
        assert_eq!(
            plan_return(&doc, 7, &mut list),
            ReturnPlan::ExitItem(TextRange::new(5, 2))
        );
        assert!(!list.is_active());

        let doc = Document::from_text("\n1. one\n12. ");
        let mut list = ListState::default();
        list.toggle_numbered();
        assert_eq!(
            plan_return(&doc, 12, &mut list),
            ReturnPlan::ExitItem(TextRange::new(8, 4))
        );
    }

    #[test]
    fn marker_with_content_after_caret_continues() {
        let doc = Document::from_text("\n• a");
        let mut list = ListState::default();
        list.toggle_bullet();
        assert_eq!(
            plan_return(&doc, 3, &mut list),
            ReturnPlan::Continue("\n• ".into())
        );
    }

    #[test]
    fn short_prefix_and_inactive_list() {
        let doc = Document::from_text("x");
        let mut list = ListState::default();
        assert_eq!(plan_return(&doc, 1, &mut list), ReturnPlan::Inactive);
        // Stale cursor past the end is clamped before inspection.
        assert_eq!(plan_return(&doc, 9, &mut list), ReturnPlan::Inactive);
    }
}
