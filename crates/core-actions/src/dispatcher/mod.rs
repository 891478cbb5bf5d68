//! Dispatcher applying `Action` to mutable editor state.
//!
//! Sub-modules group the mutation engine by concern:
//! * `edit`      - host text replacement, selection changes, return key
//! * `format`    - toolbar toggles, fonts, colors, typing attributes
//! * `paragraph` - alignment and indentation
//! * `list`      - bullet / numbered list entry and exit
//! * `markup`    - quote, hashtag, code snippet, angle brackets
//! * `link`      - hyperlink normalization and application
//! * `attach`    - image and file attachments
//! * `picker`    - picker visibility flags
//! * `undo`      - undo / redo
//!
//! Each handler returns the `ChangeFlags` it produced or an `EditError`.
//! Errors never leave this module: they are logged at debug and reported as
//! a clean result with the state untouched.

use crate::{Action, ActionObserver, EditError};
use core_config::{Config, ThemeConfig};
use core_events::ChangeFlags;
use core_state::EditorState;
use core_text::TextRange;
use tracing::{debug, trace};

mod attach;
mod edit;
mod format;
mod link;
mod list;
mod markup;
mod paragraph;
mod picker;
mod undo;

pub use link::normalize_url;

/// Flags for an edit that changed the document and moved the caret.
pub(crate) const EDITED: ChangeFlags = ChangeFlags::TEXT
    .union(ChangeFlags::SELECTION)
    .union(ChangeFlags::HISTORY);

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchResult {
    pub changes: ChangeFlags,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self {
            changes: ChangeFlags::empty(),
        }
    }
    pub fn changed(changes: ChangeFlags) -> Self {
        Self { changes }
    }
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Host-derived settings the handlers read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EditContext<'a> {
    pub theme: &'a ThemeConfig,
    pub image_width: u32,
}

impl<'a> From<&'a Config> for EditContext<'a> {
    fn from(config: &'a Config) -> Self {
        Self {
            theme: config.theme(),
            image_width: config.effective_image_width,
        }
    }
}

/// The selection clamped to the document; the not-found sentinel refuses.
pub(crate) fn selection(state: &EditorState) -> Result<TextRange, EditError> {
    state.clamped_selection().ok_or(EditError::NoSelection)
}

/// Apply an action to editor state and report what changed.
pub fn dispatch(
    action: Action,
    state: &mut EditorState,
    config: &Config,
    observers: &[Box<dyn ActionObserver>],
) -> DispatchResult {
    for obs in observers {
        obs.on_action(&action);
    }
    let op = action.name();
    if !matches!(action, Action::ReplaceText { .. } | Action::SetSelection(_)) {
        state.end_insert_coalescing();
    }
    let ctx = EditContext::from(config);

    let outcome = match action {
        Action::ReplaceText { range, text } => edit::replace_text(state, ctx, range, &text),
        Action::SetSelection(range) => edit::set_selection(state, range),
        Action::ReturnKey => edit::return_key(state, ctx),

        Action::ToggleBold => format::update(state, ctx, |f| f.bold = !f.bold),
        Action::ToggleItalic => format::update(state, ctx, |f| f.italic = !f.italic),
        Action::ToggleUnderline => format::update(state, ctx, |f| f.underline = !f.underline),
        Action::ToggleStrikethrough => {
            format::update(state, ctx, |f| f.strikethrough = !f.strikethrough)
        }
        Action::IncreaseFontSize => format::update(state, ctx, |f| f.increase_font_size()),
        Action::DecreaseFontSize => format::update(state, ctx, |f| f.decrease_font_size()),
        Action::SetForegroundColor(c) => format::update(state, ctx, |f| f.foreground = c),
        Action::SetBackgroundColor(c) => format::update(state, ctx, |f| f.background = c),
        Action::SetFontFamily(family) => format::update(state, ctx, |f| f.font_family = family),
        Action::SetFontWeight(w) => format::update(state, ctx, |f| f.font_weight = w),
        Action::SetFontStyle(s) => format::update(state, ctx, |f| f.font_style = Some(s)),
        Action::ApplyFormatting => format::apply_formatting(state, ctx),
        Action::ToggleCodeSnippet => {
            format::update(state, ctx, |f| f.code_snippet = !f.code_snippet)
        }

        Action::Align(alignment) => {
            paragraph::update_paragraphs(state, |p| p.alignment = alignment)
        }
        Action::Indent => paragraph::update_paragraphs(state, paragraph::indent),
        Action::Outdent => paragraph::update_paragraphs(state, paragraph::outdent),

        Action::ToggleBulletList => list::toggle_list(state, false),
        Action::ToggleNumberedList => list::toggle_list(state, true),

        Action::ToggleQuote => markup::toggle_quote(state, ctx),
        Action::ToggleHashtag => markup::toggle_hashtag(state, ctx),
        Action::AddCodeSnippet => markup::add_code_snippet(state, ctx),
        Action::StyleAngleBrackets => markup::style_angle_brackets(state, ctx),

        Action::InsertImage(image) => attach::insert_image(state, ctx, image),
        Action::InsertFile(file) => attach::insert_file(state, file),
        Action::AddHyperlink { url, text } => {
            link::add_hyperlink(state, ctx, &url, text.as_deref())
        }

        Action::Undo => undo::handle_undo(state),
        Action::Redo => undo::handle_redo(state),

        Action::ShowPicker(kind) => picker::show(state, kind),
        Action::DismissPicker(kind) => picker::dismiss(state, kind),
    };

    match outcome {
        Ok(changes) => {
            trace!(target: "actions.dispatch", op, ?changes, len = state.document().len(), "dispatch");
            DispatchResult::changed(changes)
        }
        Err(error) => {
            debug!(target: "actions.dispatch", op, %error, "dispatch_skipped");
            DispatchResult::clean()
        }
    }
}
