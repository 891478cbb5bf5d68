//! Host-facing event types, change notifications and picker result channels.
//!
//! The engine is single-threaded: the host text widget reports content and
//! selection changes as `Event`s from its UI thread, and the engine answers
//! with `ChangeFlags` describing which observable parts moved so bindings
//! only refresh what changed.
//!
//! Pickers (camera, photo library, file, hyperlink prompt, color, font) are
//! the one place work may finish elsewhere. Presenting a picker creates a
//! one-shot channel: the host receives a `PickerResponder` it may move to any
//! thread, the engine keeps the matching `PendingPicker` and drains it on its
//! own thread. Dropping the responder is a dismissal and never mutates the
//! document.

use core_text::{Color, FileAttachment, ImageAttachment, TextRange};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tracing::trace;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters; inspected by tests and logged by hosts that care.
pub static PICKERS_PRESENTED: AtomicU64 = AtomicU64::new(0);
pub static PICKERS_COMPLETED: AtomicU64 = AtomicU64::new(0);
pub static PICKERS_DISMISSED: AtomicU64 = AtomicU64::new(0);

/// Notifications from the hosting text widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The widget replaced `range` with `text` (typing, paste, or deletion
    /// when `text` is empty).
    TextReplaced { range: TextRange, text: String },
    /// The user moved the caret or selection.
    SelectionChanged(TextRange),
    /// The widget's layout width changed.
    HostResized { width: u32, horizontal_inset: u32 },
}

bitflags::bitflags! {
    /// Observable state touched by one engine call.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags: u8 {
        const TEXT       = 0b0000_0001;
        const SELECTION  = 0b0000_0010;
        const FORMATTING = 0b0000_0100;
        const LIST       = 0b0000_1000;
        const PICKERS    = 0b0001_0000;
        const HISTORY    = 0b0010_0000;
    }
}

/// Observer notified after every engine call that changed something.
///
/// Observers run synchronously on the engine thread and must not block.
pub trait ChangeObserver {
    fn on_change(&self, changes: ChangeFlags);
}

/// Default no-op observer.
pub struct NoopObserver;

impl ChangeObserver for NoopObserver {
    fn on_change(&self, _changes: ChangeFlags) {}
}

// -------------------------------------------------------------------------------------------------
// Pickers
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerKind {
    TextColor,
    BackgroundColor,
    FontMenu,
    IndentMenu,
    File,
    Camera,
    PhotoLibrary,
    ImageDropdown,
    Hyperlink,
}

/// Validated payload a picker hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerResult {
    Image(ImageAttachment),
    File(FileAttachment),
    Hyperlink { url: String, text: Option<String> },
    Color(Color),
    Font(String),
}

impl PickerResult {
    /// Whether this payload is something `kind` can produce.
    pub fn fits(&self, kind: PickerKind) -> bool {
        matches!(
            (self, kind),
            (
                PickerResult::Image(_),
                PickerKind::Camera | PickerKind::PhotoLibrary
            ) | (PickerResult::File(_), PickerKind::File)
                | (PickerResult::Hyperlink { .. }, PickerKind::Hyperlink)
                | (
                    PickerResult::Color(_),
                    PickerKind::TextColor | PickerKind::BackgroundColor
                )
                | (PickerResult::Font(_), PickerKind::FontMenu)
        )
    }
}

/// Host-side half of a picker channel. `Send`; complete it from any thread.
#[derive(Debug)]
pub struct PickerResponder {
    kind: PickerKind,
    tx: oneshot::Sender<PickerResult>,
}

impl PickerResponder {
    pub fn kind(&self) -> PickerKind {
        self.kind
    }

    /// Deliver the picker's result. Returns false when the editor already
    /// abandoned the picker.
    pub fn complete(self, result: PickerResult) -> bool {
        self.tx.send(result).is_ok()
    }

    /// Close the picker without a result.
    pub fn dismiss(self) {
        drop(self.tx);
    }
}

/// Outcome of draining a pending picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerPoll {
    Pending,
    Completed(PickerResult),
    Dismissed,
}

/// Engine-side half of a picker channel.
#[derive(Debug)]
pub struct PendingPicker {
    kind: PickerKind,
    rx: oneshot::Receiver<PickerResult>,
}

impl PendingPicker {
    pub fn kind(&self) -> PickerKind {
        self.kind
    }

    /// Non-blocking check, safe to call on every UI tick.
    pub fn poll(&mut self) -> PickerPoll {
        match self.rx.try_recv() {
            Ok(result) => {
                PICKERS_COMPLETED.fetch_add(1, Ordering::Relaxed);
                trace!(target: "events.picker", kind = ?self.kind, "picker_completed");
                PickerPoll::Completed(result)
            }
            Err(oneshot::error::TryRecvError::Empty) => PickerPoll::Pending,
            Err(oneshot::error::TryRecvError::Closed) => {
                PICKERS_DISMISSED.fetch_add(1, Ordering::Relaxed);
                trace!(target: "events.picker", kind = ?self.kind, "picker_dismissed");
                PickerPoll::Dismissed
            }
        }
    }

    /// Await the result; `None` when the picker was dismissed.
    pub async fn wait(self) -> Option<PickerResult> {
        match self.rx.await {
            Ok(result) => {
                PICKERS_COMPLETED.fetch_add(1, Ordering::Relaxed);
                Some(result)
            }
            Err(_) => {
                PICKERS_DISMISSED.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }
}

/// Create a linked responder / pending pair for `kind`.
pub fn picker_channel(kind: PickerKind) -> (PickerResponder, PendingPicker) {
    let (tx, rx) = oneshot::channel();
    PICKERS_PRESENTED.fetch_add(1, Ordering::Relaxed);
    trace!(target: "events.picker", ?kind, "picker_presented");
    (PickerResponder { kind, tx }, PendingPicker { kind, rx })
}
