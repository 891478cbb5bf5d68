use super::{EDITED, selection};
use crate::EditError;
use core_events::ChangeFlags;
use core_state::EditorState;
use core_text::TextRange;
use tracing::trace;

/// Enter or leave list mode. Entering inserts the first marker at the caret
/// and moves the caret past it; leaving only resets list state.
pub(crate) fn toggle_list(state: &mut EditorState, numbered: bool) -> Result<ChangeFlags, EditError> {
    let mut list = state.list.clone();
    let entered = if numbered {
        list.toggle_numbered()
    } else {
        list.toggle_bullet()
    };
    if !entered {
        state.list = list;
        trace!(target: "actions.dispatch", op = "list_exit", numbered, "list");
        return Ok(ChangeFlags::LIST);
    }
    let sel = selection(state)?;
    let marker = list
        .next_marker()
        .ok_or(EditError::EmptyOperation("list_marker"))?;
    state.edit_with_snapshot(|doc, s| {
        let n = doc.insert(sel.location, &marker)?;
        *s = TextRange::caret(sel.location + n);
        Ok::<_, EditError>(())
    })?;
    state.list = list;
    trace!(target: "actions.dispatch", op = "list_enter", numbered, at = sel.location, "list");
    Ok(EDITED | ChangeFlags::LIST)
}
