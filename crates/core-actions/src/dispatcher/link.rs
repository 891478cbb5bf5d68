//! Hyperlinks.
//!
//! Targets without a `scheme://` prefix get `https://` prepended; the result
//! must parse as a URL or the command is a no-op. The stored target is the
//! normalized string as written, not the parser's re-serialization.

use super::{EDITED, EditContext, selection};
use crate::EditError;
use crate::resolver::link_attributes;
use core_events::ChangeFlags;
use core_state::EditorState;
use core_text::TextRange;
use tracing::trace;
use url::Url;

fn has_scheme(s: &str) -> bool {
    let Some(idx) = s.find("://") else {
        return false;
    };
    let scheme = &s[..idx];
    scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

pub fn normalize_url(raw: &str) -> Result<String, EditError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EditError::InvalidUrl(String::new()));
    }
    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    match Url::parse(&candidate) {
        Ok(_) => Ok(candidate),
        Err(e) => Err(EditError::InvalidUrl(format!("{candidate}: {e}"))),
    }
}

/// Link the selection, or insert `text` as a new link at the caret. Either
/// way an unlinked space follows the link and the caret lands after it.
pub(crate) fn add_hyperlink(
    state: &mut EditorState,
    ctx: EditContext<'_>,
    url: &str,
    text: Option<&str>,
) -> Result<ChangeFlags, EditError> {
    let sel = selection(state)?;
    let text = text.filter(|t| !t.is_empty());
    if sel.is_empty() && text.is_none() {
        return Err(EditError::EmptyOperation("add_hyperlink"));
    }
    let target = normalize_url(url)?;
    let attrs = link_attributes(&target, ctx.theme);
    let linked = state.edit_with_snapshot(|doc, s| {
        let linked = match text {
            Some(text) if sel.is_empty() => {
                let n = doc.insert_with_attributes(sel.location, text, &attrs)?;
                TextRange::new(sel.location, n)
            }
            _ => {
                doc.set_attributes(&attrs, sel)?;
                sel
            }
        };
        doc.insert(linked.end(), " ")?;
        *s = TextRange::caret(linked.end() + 1);
        Ok::<_, EditError>(linked)
    })?;
    trace!(target: "actions.dispatch", op = "add_hyperlink", target = %target, at = linked.location, len = linked.length, "link");
    Ok(EDITED)
}
