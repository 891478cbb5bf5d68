//! Image and file attachments.
//!
//! An attachment goes in at the selection start without replacing the
//! selected text, and the caret lands right after its slot.

use super::{EDITED, EditContext, selection};
use crate::EditError;
use core_events::ChangeFlags;
use core_state::EditorState;
use core_text::{Attachment, FileAttachment, ImageAttachment, TextRange};
use tracing::trace;

fn insert(state: &mut EditorState, attachment: Attachment) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    state.edit_with_snapshot(|doc, s| {
        doc.insert_attachment(sel.location, attachment)?;
        *s = TextRange::caret(sel.location + 1);
        Ok::<_, EditError>(())
    })?;
    Ok(EDITED)
}

/// Images wider than the effective width are scaled down to it first.
pub(crate) fn insert_image(
    state: &mut EditorState,
    ctx: EditContext<'_>,
    image: ImageAttachment,
) -> Result<ChangeFlags, EditError> {
    let (w, h) = (image.width, image.height);
    let image = image.scaled_to_width(ctx.image_width);
    trace!(target: "actions.dispatch", op = "insert_image", from_w = w, from_h = h, w = image.width, h = image.height, "attach");
    insert(state, Attachment::Image(image))
}

pub(crate) fn insert_file(
    state: &mut EditorState,
    file: FileAttachment,
) -> Result<ChangeFlags, EditError> {
    trace!(target: "actions.dispatch", op = "insert_file", name = %file.name, "attach");
    insert(state, Attachment::File(file))
}
