//! Undo / redo.
//!
//! Both restore a whole snapshot (text, runs, attachments and selection).
//! An empty stack is a refused operation, not an error the host sees.

use super::EDITED;
use crate::EditError;
use core_events::ChangeFlags;
use core_state::EditorState;
use tracing::trace;

pub(crate) fn handle_undo(state: &mut EditorState) -> Result<ChangeFlags, EditError> {
    if !state.undo() {
        return Err(EditError::EmptyOperation("undo"));
    }
    trace!(target: "actions.dispatch", op = "undo", undo = state.undo_depth(), redo = state.redo_depth(), "undo");
    Ok(EDITED)
}

pub(crate) fn handle_redo(state: &mut EditorState) -> Result<ChangeFlags, EditError> {
    if !state.redo() {
        return Err(EditError::EmptyOperation("redo"));
    }
    trace!(target: "actions.dispatch", op = "redo", undo = state.undo_depth(), redo = state.redo_depth(), "redo");
    Ok(EDITED)
}
