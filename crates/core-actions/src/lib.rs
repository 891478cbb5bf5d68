//! Editing commands and the mutation engine that applies them.
//!
//! Everything a host can ask of the editor is an `Action`. `dispatcher::dispatch`
//! applies one action to an `EditorState`, running host text edits through the
//! real-time formatter, and reports which observable parts changed.
//!
//! Failure policy: nothing here panics or surfaces errors to the host. Internal
//! handlers return `Result<_, EditError>`; the dispatcher logs the error at
//! debug and reports an unchanged result, so a mutation either fully applies
//! or does not happen at all.

use core_events::PickerKind;
use core_text::{
    Alignment, Color, DocumentError, FileAttachment, FontWeight, ImageAttachment, TextRange,
    TextStyle,
};
use thiserror::Error;

pub mod dispatcher;
pub mod realtime;
pub mod resolver;
pub mod script;

pub use dispatcher::{DispatchResult, dispatch};
pub use resolver::{ResolvedAttributes, resolve};
pub use script::{ParsedCommand, ScriptParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The host widget replaced `range` with `text` (typing, paste, delete).
    ReplaceText { range: TextRange, text: String },
    /// The host widget moved the caret or selection.
    SetSelection(TextRange),
    /// Return key while a list may be active: continue or exit the list.
    ReturnKey,

    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    ToggleStrikethrough,
    IncreaseFontSize,
    DecreaseFontSize,
    SetForegroundColor(Color),
    SetBackgroundColor(Color),
    SetFontFamily(String),
    SetFontWeight(FontWeight),
    SetFontStyle(TextStyle),
    /// Re-apply the current toggle state to the selection (or typing attributes).
    ApplyFormatting,

    Align(Alignment),
    Indent,
    Outdent,

    ToggleBulletList,
    ToggleNumberedList,

    ToggleQuote,
    ToggleHashtag,
    ToggleCodeSnippet,
    AddCodeSnippet,
    StyleAngleBrackets,

    InsertImage(ImageAttachment),
    InsertFile(FileAttachment),
    AddHyperlink { url: String, text: Option<String> },

    Undo,
    Redo,

    ShowPicker(PickerKind),
    DismissPicker(PickerKind),
}

impl Action {
    /// Short stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::ReplaceText { .. } => "replace_text",
            Action::SetSelection(_) => "set_selection",
            Action::ReturnKey => "return_key",
            Action::ToggleBold => "toggle_bold",
            Action::ToggleItalic => "toggle_italic",
            Action::ToggleUnderline => "toggle_underline",
            Action::ToggleStrikethrough => "toggle_strikethrough",
            Action::IncreaseFontSize => "increase_font_size",
            Action::DecreaseFontSize => "decrease_font_size",
            Action::SetForegroundColor(_) => "set_foreground_color",
            Action::SetBackgroundColor(_) => "set_background_color",
            Action::SetFontFamily(_) => "set_font_family",
            Action::SetFontWeight(_) => "set_font_weight",
            Action::SetFontStyle(_) => "set_font_style",
            Action::ApplyFormatting => "apply_formatting",
            Action::Align(_) => "align",
            Action::Indent => "indent",
            Action::Outdent => "outdent",
            Action::ToggleBulletList => "toggle_bullet_list",
            Action::ToggleNumberedList => "toggle_numbered_list",
            Action::ToggleQuote => "toggle_quote",
            Action::ToggleHashtag => "toggle_hashtag",
            Action::ToggleCodeSnippet => "toggle_code_snippet",
            Action::AddCodeSnippet => "add_code_snippet",
            Action::StyleAngleBrackets => "style_angle_brackets",
            Action::InsertImage(_) => "insert_image",
            Action::InsertFile(_) => "insert_file",
            Action::AddHyperlink { .. } => "add_hyperlink",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::ShowPicker(_) => "show_picker",
            Action::DismissPicker(_) => "dismiss_picker",
        }
    }
}

/// Hook invoked before every dispatched action.
pub trait ActionObserver {
    fn on_action(&self, action: &Action);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("range {location}+{length} outside document of length {len}")]
    InvalidRange {
        location: usize,
        length: usize,
        len: usize,
    },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("nothing to do: {0}")]
    EmptyOperation(&'static str),
    #[error("no selection")]
    NoSelection,
}

impl From<DocumentError> for EditError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidRange {
                location,
                length,
                len,
            } => EditError::InvalidRange {
                location,
                length,
                len,
            },
            DocumentError::InvalidPosition { at, len } => EditError::InvalidRange {
                location: at,
                length: 0,
                len,
            },
        }
    }
}
