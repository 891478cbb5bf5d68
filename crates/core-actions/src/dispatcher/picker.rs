use crate::EditError;
use core_events::{ChangeFlags, PickerKind};
use core_state::{EditorState, PickerFlags};

/// Mark a picker as presented. Choosing camera or photo library replaces
/// the image source dropdown.
pub(crate) fn show(state: &mut EditorState, kind: PickerKind) -> Result<ChangeFlags, EditError> {
    let before = state.pickers;
    state.pickers |= PickerFlags::from(kind);
    if matches!(kind, PickerKind::Camera | PickerKind::PhotoLibrary) {
        state.pickers.remove(PickerFlags::IMAGE_DROPDOWN);
    }
    tracing::debug!(target: "actions.dispatch", op = "show_picker", ?kind, "picker");
    Ok(changed(before, state.pickers))
}

pub(crate) fn dismiss(state: &mut EditorState, kind: PickerKind) -> Result<ChangeFlags, EditError> {
    let before = state.pickers;
    state.pickers.remove(PickerFlags::from(kind));
    Ok(changed(before, state.pickers))
}

fn changed(before: PickerFlags, after: PickerFlags) -> ChangeFlags {
    if before == after {
        ChangeFlags::empty()
    } else {
        ChangeFlags::PICKERS
    }
}
