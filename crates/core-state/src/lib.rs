//! Editor session state: document, selection, toolbar toggles, list mode,
//! picker visibility and the undo engine.
//!
//! Mutation discipline:
//! - Edits run against a working clone of the document (`edit_with_snapshot`,
//!   `edit_coalesced`). Only when the closure succeeds is the pre-edit state
//!   pushed for undo and the clone committed, so a failed edit leaves no
//!   partial state and no stray snapshot.
//! - An edit that leaves the document's attributed content unchanged commits
//!   the selection only and takes no snapshot.
//! - Typing is coalesced: a contiguous run of host insertions is one undo
//!   unit. Any discrete edit, undo/redo, newline or selection jump closes the
//!   run.

use core_config::Config;
use core_events::PickerKind;
use core_text::{AttributeSet, Document, TextRange};
use tracing::trace;

pub mod formatting;
pub mod list;
pub mod undo;

pub use formatting::{FONT_SIZE_STEP, FormattingState};
pub use list::{BULLET_MARKER, ListMode, ListState};
use undo::UndoEngine;
pub use undo::{EditSnapshot, InsertRun};

bitflags::bitflags! {
    /// Pickers and menus currently presented by the host.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PickerFlags: u16 {
        const TEXT_COLOR       = 1 << 0;
        const BACKGROUND_COLOR = 1 << 1;
        const FONT_MENU        = 1 << 2;
        const INDENT_MENU      = 1 << 3;
        const FILE             = 1 << 4;
        const CAMERA           = 1 << 5;
        const PHOTO_LIBRARY    = 1 << 6;
        const IMAGE_DROPDOWN   = 1 << 7;
        const HYPERLINK        = 1 << 8;
    }
}

impl From<PickerKind> for PickerFlags {
    fn from(kind: PickerKind) -> Self {
        match kind {
            PickerKind::TextColor => PickerFlags::TEXT_COLOR,
            PickerKind::BackgroundColor => PickerFlags::BACKGROUND_COLOR,
            PickerKind::FontMenu => PickerFlags::FONT_MENU,
            PickerKind::IndentMenu => PickerFlags::INDENT_MENU,
            PickerKind::File => PickerFlags::FILE,
            PickerKind::Camera => PickerFlags::CAMERA,
            PickerKind::PhotoLibrary => PickerFlags::PHOTO_LIBRARY,
            PickerKind::ImageDropdown => PickerFlags::IMAGE_DROPDOWN,
            PickerKind::Hyperlink => PickerFlags::HYPERLINK,
        }
    }
}

pub struct EditorState {
    document: Document,
    selection: TextRange,
    pub formatting: FormattingState,
    pub list: ListState,
    pub pickers: PickerFlags,
    /// Attributes applied to text typed at the caret.
    typing_attributes: AttributeSet,
    undo: UndoEngine,
    dirty: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl EditorState {
    /// State over `document` with the caret at its end and unbounded undo.
    pub fn new(document: Document) -> Self {
        let selection = TextRange::caret(document.len());
        Self {
            document,
            selection,
            formatting: FormattingState::default(),
            list: ListState::default(),
            pickers: PickerFlags::empty(),
            typing_attributes: AttributeSet::new(),
            undo: UndoEngine::new(),
            dirty: false,
        }
    }

    /// State configured from the loaded config (formatting defaults, undo bound).
    pub fn with_config(document: Document, config: &Config) -> Self {
        let mut state = Self::new(document);
        state.formatting = FormattingState::from_config(&config.file.editor);
        state.undo = UndoEngine::with_limit(config.undo_limit());
        state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> TextRange {
        self.selection
    }

    /// Record a host selection as-is. Out-of-range values are kept so the
    /// next mutation can decide how to treat them; see `clamped_selection`.
    pub fn set_selection(&mut self, selection: TextRange) {
        if selection != self.selection {
            self.undo.end_insert_coalescing();
        }
        self.selection = selection;
    }

    /// The selection clamped to the document, or `None` when it is the
    /// not-found sentinel (no mutation should happen).
    pub fn clamped_selection(&self) -> Option<TextRange> {
        if self.selection.is_not_found() {
            None
        } else {
            Some(self.selection.clamp_to(self.document.len()))
        }
    }

    pub fn typing_attributes(&self) -> &AttributeSet {
        &self.typing_attributes
    }

    pub fn set_typing_attributes(&mut self, attrs: AttributeSet) {
        self.typing_attributes = attrs;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Push the current document for undo (deduplicated against the top).
    pub fn save_state_for_undo(&mut self) {
        self.undo.end_insert_coalescing();
        self.undo.push_snapshot(&self.document, self.selection);
    }

    /// Run a discrete edit on a working copy. On `Ok` the prior state is
    /// saved for undo and the copy becomes current; on `Err` nothing changes.
    pub fn edit_with_snapshot<R, E>(
        &mut self,
        f: impl FnOnce(&mut Document, &mut TextRange) -> Result<R, E>,
    ) -> Result<R, E> {
        self.undo.end_insert_coalescing();
        let mut working = self.document.clone();
        let mut selection = self.selection;
        let out = f(&mut working, &mut selection)?;
        if working != self.document {
            self.undo.push_snapshot(&self.document, self.selection);
            self.commit(working);
        }
        self.selection = selection;
        Ok(out)
    }

    /// Like `edit_with_snapshot`, but successive calls share one undo entry
    /// until the typing run is closed.
    pub fn edit_coalesced<R, E>(
        &mut self,
        f: impl FnOnce(&mut Document, &mut TextRange) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut working = self.document.clone();
        let mut selection = self.selection;
        let out = f(&mut working, &mut selection)?;
        if working != self.document {
            self.undo
                .begin_insert_coalescing(&self.document, self.selection);
            self.commit(working);
        }
        self.selection = selection;
        Ok(out)
    }

    pub fn end_insert_coalescing(&mut self) {
        self.undo.end_insert_coalescing();
    }

    pub fn insert_run(&self) -> InsertRun {
        self.undo.insert_run()
    }

    fn commit(&mut self, document: Document) {
        trace!(target: "state.undo", chars = document.len(), "commit_document");
        self.document = document;
        self.dirty = true;
    }

    /// Restore the previous snapshot. Returns true if one was applied.
    pub fn undo(&mut self) -> bool {
        let applied = self.undo.undo(&mut self.document, &mut self.selection);
        if applied {
            self.dirty = true;
        }
        applied
    }

    /// Re-apply the most recently undone snapshot. Returns true if applied.
    pub fn redo(&mut self) -> bool {
        let applied = self.undo.redo(&mut self.document, &mut self.selection);
        if applied {
            self.dirty = true;
        }
        applied
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }
    pub fn undo_snapshots_skipped(&self) -> u64 {
        self.undo.snapshots_skipped()
    }
    pub fn undo_limit(&self) -> Option<usize> {
        self.undo.limit()
    }
}
