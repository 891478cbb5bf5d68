//! Toolbar toggles and the apply-formatting step they all end in.

use super::{EditContext, selection};
use crate::{EditError, resolve};
use core_events::ChangeFlags;
use core_state::{EditorState, FormattingState};
use tracing::{debug, trace};

/// Change toggle state, then re-apply formatting to the selection. The
/// toggle sticks even when there is no selection to apply it to.
pub(crate) fn update(
    state: &mut EditorState,
    ctx: EditContext<'_>,
    f: impl FnOnce(&mut FormattingState),
) -> Result<ChangeFlags, EditError> {
    f(&mut state.formatting);
    let applied = apply_formatting(state, ctx).unwrap_or_else(|error| {
        debug!(target: "actions.dispatch", op = "apply_formatting", %error, "dispatch_skipped");
        ChangeFlags::empty()
    });
    Ok(ChangeFlags::FORMATTING | applied)
}

/// Resolve the toggle state and apply it over the clamped selection. With a
/// caret the result only becomes the typing attributes.
pub(crate) fn apply_formatting(
    state: &mut EditorState,
    ctx: EditContext<'_>,
) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    let resolved = resolve(&state.formatting, ctx.theme);
    state.set_typing_attributes(resolved.attributes.clone());
    if sel.is_empty() {
        trace!(target: "actions.format", at = sel.location, "typing_attributes_set");
        return Ok(ChangeFlags::FORMATTING);
    }
    state.edit_with_snapshot(|doc, _| {
        doc.set_attributes(&resolved.attributes, sel)?;
        for key in &resolved.cleared {
            doc.remove_attribute(*key, sel)?;
        }
        Ok::<_, EditError>(())
    })?;
    trace!(target: "actions.format", at = sel.location, len = sel.length, keys = resolved.attributes.len(), cleared = resolved.cleared.len(), "formatting_applied");
    Ok(ChangeFlags::FORMATTING | ChangeFlags::TEXT | ChangeFlags::HISTORY)
}
