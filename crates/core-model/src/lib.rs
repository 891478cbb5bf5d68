//! Host-facing editor model.
//!
//! `EditorModel` is the single entry point a host binds to. It owns the
//! editor state, the loaded config, the last known host metrics, change
//! observers and the engine-side halves of any open pickers.
//!
//! Threading:
//! * Every method runs on the host's UI thread. The model is not `Sync` and
//!   never locks.
//! * The only cross-thread hop is a picker result. `open_picker` hands the
//!   host a `PickerResponder` it may complete from any thread; the model keeps
//!   the receiving half and only applies the result when the host calls
//!   `poll_pickers` back on the UI thread.
//! * A dismissed or abandoned picker clears its visibility flag and nothing
//!   else. No document mutation happens before a result arrives.
//!
//! Invariants (hold after every public call):
//! * At most one pending picker per `PickerKind`; opening the same kind again
//!   abandons the earlier one.
//! * `config.effective_image_width` reflects the most recent `HostResized`.
//! * Observers are notified exactly once per call that changed something,
//!   with the union of the changes.

use core_actions::{Action, ActionObserver, DispatchResult, dispatch};
use core_config::{Config, HostContext};
use core_events::{
    ChangeFlags, ChangeObserver, Event, PendingPicker, PickerKind, PickerPoll, PickerResponder,
    PickerResult, picker_channel,
};
use core_state::EditorState;
use core_text::{Document, TextRange};
use tracing::{debug, trace};

pub struct EditorModel {
    state: EditorState,
    config: Config,
    host: HostContext,
    observers: Vec<Box<dyn ChangeObserver>>,
    action_observers: Vec<Box<dyn ActionObserver>>,
    pending: Vec<PendingPicker>,
}

impl EditorModel {
    pub fn new(document: Document, config: Config) -> Self {
        let state = EditorState::with_config(document, &config);
        Self {
            state,
            config,
            host: HostContext::default(),
            observers: Vec::new(),
            action_observers: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn host(&self) -> HostContext {
        self.host
    }
    pub fn document(&self) -> &Document {
        self.state.document()
    }
    pub fn selection(&self) -> TextRange {
        self.state.selection()
    }

    pub fn add_observer(&mut self, observer: Box<dyn ChangeObserver>) {
        self.observers.push(observer);
    }

    pub fn add_action_observer(&mut self, observer: Box<dyn ActionObserver>) {
        self.action_observers.push(observer);
    }

    /// Apply one command and notify observers if anything changed.
    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        let result = self.apply(action);
        self.notify(result.changes);
        result
    }

    fn apply(&mut self, action: Action) -> DispatchResult {
        dispatch(action, &mut self.state, &self.config, &self.action_observers)
    }

    fn notify(&self, changes: ChangeFlags) {
        if changes.is_empty() {
            return;
        }
        for obs in &self.observers {
            obs.on_change(changes);
        }
    }

    /// Translate a host widget notification into engine work.
    pub fn handle_event(&mut self, event: Event) -> DispatchResult {
        match event {
            Event::TextReplaced { range, text } => {
                self.dispatch(Action::ReplaceText { range, text })
            }
            Event::SelectionChanged(range) => self.dispatch(Action::SetSelection(range)),
            Event::HostResized {
                width,
                horizontal_inset,
            } => {
                self.host = HostContext::new(width, horizontal_inset);
                if let Some(w) = self.config.recompute_with_context(self.host) {
                    debug!(target: "model", width, horizontal_inset, image_width = w, "host_resized");
                }
                DispatchResult::clean()
            }
        }
    }

    /// Type `text` at the selection as the host widget would report it.
    pub fn type_text(&mut self, text: &str) -> DispatchResult {
        let range = self.state.selection();
        self.handle_event(Event::TextReplaced {
            range,
            text: text.to_string(),
        })
    }

    /// Delete the selection, or the character before the caret.
    pub fn backspace(&mut self) -> DispatchResult {
        let sel = self.state.selection();
        let range = if sel.is_empty() && !sel.is_not_found() && sel.location > 0 {
            TextRange::new(sel.location - 1, 1)
        } else {
            sel
        };
        self.handle_event(Event::TextReplaced {
            range,
            text: String::new(),
        })
    }

    /// Present a picker. The returned responder is the host's to complete or
    /// drop, from any thread.
    pub fn open_picker(&mut self, kind: PickerKind) -> PickerResponder {
        if let Some(idx) = self.pending.iter().position(|p| p.kind() == kind) {
            self.pending.swap_remove(idx);
            trace!(target: "model", ?kind, "picker_replaced");
        }
        let (responder, pending) = picker_channel(kind);
        self.pending.push(pending);
        self.dispatch(Action::ShowPicker(kind));
        responder
    }

    pub fn pending_pickers(&self) -> usize {
        self.pending.len()
    }

    /// Drain finished pickers and apply their results. Call on the UI thread;
    /// pickers still open are left alone.
    pub fn poll_pickers(&mut self) -> DispatchResult {
        let mut changes = ChangeFlags::empty();
        let mut still_open = Vec::with_capacity(self.pending.len());
        for mut pending in std::mem::take(&mut self.pending) {
            let kind = pending.kind();
            match pending.poll() {
                PickerPoll::Pending => still_open.push(pending),
                PickerPoll::Dismissed => {
                    changes |= self.apply(Action::DismissPicker(kind)).changes;
                }
                PickerPoll::Completed(result) => {
                    changes |= self.apply(Action::DismissPicker(kind)).changes;
                    match result_action(kind, result) {
                        Some(action) => changes |= self.apply(action).changes,
                        None => debug!(target: "model", ?kind, "picker_result_mismatch"),
                    }
                }
            }
        }
        self.pending = still_open;
        self.notify(changes);
        DispatchResult::changed(changes)
    }
}

/// The command a picker result stands for, if `result` fits `kind`.
fn result_action(kind: PickerKind, result: PickerResult) -> Option<Action> {
    if !result.fits(kind) {
        return None;
    }
    Some(match result {
        PickerResult::Image(image) => Action::InsertImage(image),
        PickerResult::File(file) => Action::InsertFile(file),
        PickerResult::Hyperlink { url, text } => Action::AddHyperlink { url, text },
        PickerResult::Font(family) => Action::SetFontFamily(family),
        PickerResult::Color(color) if kind == PickerKind::BackgroundColor => {
            Action::SetBackgroundColor(color)
        }
        PickerResult::Color(color) => Action::SetForegroundColor(color),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::PickerFlags;
    use core_text::{AttributeKey, Color, ImageAttachment};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn model(text: &str) -> EditorModel {
        EditorModel::new(Document::from_text(text), Config::default())
    }

    struct Recorder(Rc<RefCell<Vec<ChangeFlags>>>);

    impl ChangeObserver for Recorder {
        fn on_change(&self, changes: ChangeFlags) {
            self.0.borrow_mut().push(changes);
        }
    }

    #[test]
    fn host_events_edit_and_select() {
        let mut m = model("");
        m.type_text("hello");
        assert_eq!(m.document().text(), "hello");
        m.handle_event(Event::SelectionChanged(TextRange::new(0, 5)));
        m.dispatch(Action::ToggleUnderline);
        assert_eq!(
            m.document().ranges_with(AttributeKey::Underline).len(),
            1
        );
        m.handle_event(Event::SelectionChanged(TextRange::caret(5)));
        m.backspace();
        assert_eq!(m.document().text(), "hell");
    }

    #[test]
    fn observers_hear_only_real_changes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut m = model("ab");
        m.add_observer(Box::new(Recorder(log.clone())));
        m.dispatch(Action::Undo);
        m.dispatch(Action::ToggleQuote);
        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].contains(ChangeFlags::TEXT));
    }

    #[test]
    fn resize_clamps_image_width() {
        let mut m = model("");
        m.handle_event(Event::HostResized {
            width: 200,
            horizontal_inset: 20,
        });
        assert_eq!(m.config().effective_image_width, 160);
        m.dispatch(Action::InsertImage(ImageAttachment::new(vec![0u8], 640, 320)));
        match m.document().attachment_at(0) {
            Some(core_text::Attachment::Image(img)) => assert_eq!(img.width, 160),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn picker_result_from_another_thread_applies_on_poll() {
        let mut m = model("");
        let responder = m.open_picker(PickerKind::PhotoLibrary);
        assert!(m.state().pickers.contains(PickerFlags::PHOTO_LIBRARY));
        assert!(!m.poll_pickers().is_dirty());
        assert_eq!(m.pending_pickers(), 1);

        std::thread::spawn(move || {
            responder.complete(PickerResult::Image(ImageAttachment::new(vec![1u8, 2], 10, 10)))
        })
        .join()
        .unwrap();

        let res = m.poll_pickers();
        assert!(res.changes.contains(ChangeFlags::TEXT | ChangeFlags::PICKERS));
        assert_eq!(m.document().len(), 1);
        assert_eq!(m.selection(), TextRange::caret(1));
        assert!(m.state().pickers.is_empty());
        assert_eq!(m.pending_pickers(), 0);
    }

    #[test]
    fn dismissed_picker_leaves_document_alone() {
        let mut m = model("abc");
        let responder = m.open_picker(PickerKind::Hyperlink);
        responder.dismiss();
        let res = m.poll_pickers();
        assert_eq!(res.changes, ChangeFlags::PICKERS);
        assert_eq!(m.document().text(), "abc");
        assert_eq!(m.state().undo_depth(), 0);
    }

    #[test]
    fn color_result_routes_by_picker_kind() {
        let mut m = model("ab");
        m.handle_event(Event::SelectionChanged(TextRange::new(0, 2)));
        let red = Color::rgb(255, 0, 0);
        m.open_picker(PickerKind::BackgroundColor)
            .complete(PickerResult::Color(red));
        m.poll_pickers();
        assert_eq!(m.state().formatting.background, red);
        assert_eq!(m.document().attributes_at(0).background(), Some(red));
    }

    #[test]
    fn mismatched_result_is_ignored() {
        let mut m = model("ab");
        m.open_picker(PickerKind::File)
            .complete(PickerResult::Font("Menlo".into()));
        let res = m.poll_pickers();
        assert_eq!(res.changes, ChangeFlags::PICKERS);
        assert_eq!(m.state().formatting.font_family, "System");
    }

    #[test]
    fn reopening_a_kind_abandons_the_old_picker() {
        let mut m = model("");
        let first = m.open_picker(PickerKind::File);
        let _second = m.open_picker(PickerKind::File);
        assert_eq!(m.pending_pickers(), 1);
        assert!(!first.complete(PickerResult::Font("x".into())));
    }
}
