//! Markup commands: quotes, hashtags, code snippets and angle brackets.
//!
//! With a selection the markup wraps or restyles it in place (existing runs
//! and attachments inside are kept); with a caret an empty marker or
//! placeholder is inserted and the caret moved past or into it.

use super::{EDITED, EditContext, selection};
use crate::EditError;
use crate::realtime::{angle_bracket_ranges, is_valid_hashtag};
use crate::resolver::{
    angle_bracket_attributes, code_attributes, hashtag_attributes, quote_attributes,
};
use core_events::ChangeFlags;
use core_state::EditorState;
use core_text::TextRange;
use tracing::trace;

pub const CODE_PLACEHOLDER: &str = "Code snippet";

pub(crate) fn toggle_quote(
    state: &mut EditorState,
    ctx: EditContext<'_>,
) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    let attrs = quote_attributes(&state.formatting, ctx.theme);
    state.edit_with_snapshot(|doc, s| {
        if sel.is_empty() {
            doc.insert_with_attributes(sel.location, "\"\"", &attrs)?;
            *s = TextRange::caret(sel.location + 1);
        } else {
            doc.insert(sel.end(), "\"")?;
            doc.insert(sel.location, "\"")?;
            doc.set_attributes(&attrs, TextRange::new(sel.location, sel.length + 2))?;
            *s = TextRange::new(sel.location + 1, sel.length);
        }
        Ok::<_, EditError>(())
    })?;
    trace!(target: "actions.dispatch", op = "toggle_quote", at = sel.location, len = sel.length, "markup");
    Ok(EDITED)
}

/// Prefix `#`. A wrapped selection is styled only when the result is a
/// valid hashtag; a bare `#` at the caret stays unstyled until typed into.
pub(crate) fn toggle_hashtag(
    state: &mut EditorState,
    ctx: EditContext<'_>,
) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    let attrs = hashtag_attributes(&state.formatting, ctx.theme);
    let styled = state.edit_with_snapshot(|doc, s| {
        doc.insert(sel.location, "#")?;
        if sel.is_empty() {
            *s = TextRange::caret(sel.location + 1);
            return Ok::<_, EditError>(false);
        }
        let tagged = TextRange::new(sel.location, sel.length + 1);
        let valid = is_valid_hashtag(&doc.slice(tagged)?);
        if valid {
            doc.set_attributes(&attrs, tagged)?;
        }
        *s = TextRange::new(sel.location + 1, sel.length);
        Ok(valid)
    })?;
    trace!(target: "actions.dispatch", op = "toggle_hashtag", at = sel.location, styled, "markup");
    Ok(EDITED)
}

/// Render the selection (or an inserted placeholder) in the code presentation.
pub(crate) fn add_code_snippet(
    state: &mut EditorState,
    ctx: EditContext<'_>,
) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    let attrs = code_attributes(ctx.theme);
    state.edit_with_snapshot(|doc, s| {
        let end = if sel.is_empty() {
            sel.location + doc.insert_with_attributes(sel.location, CODE_PLACEHOLDER, &attrs)?
        } else {
            doc.set_attributes(&attrs, sel)?;
            sel.end()
        };
        *s = TextRange::caret(end);
        Ok::<_, EditError>(())
    })?;
    Ok(EDITED)
}

pub(crate) fn style_angle_brackets(
    state: &mut EditorState,
    ctx: EditContext<'_>,
) -> Result<ChangeFlags, EditError> {
    let ranges = angle_bracket_ranges(&state.document().text());
    if ranges.is_empty() {
        return Err(EditError::EmptyOperation("style_angle_brackets"));
    }
    let attrs = angle_bracket_attributes(&state.formatting, ctx.theme);
    state.edit_with_snapshot(|doc, _| {
        for range in &ranges {
            doc.set_attributes(&attrs, *range)?;
        }
        Ok::<_, EditError>(())
    })?;
    trace!(target: "actions.dispatch", op = "style_angle_brackets", matches = ranges.len(), "markup");
    Ok(ChangeFlags::TEXT | ChangeFlags::HISTORY)
}
