use core_text::{Document, TextRange};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// A full-state snapshot for undo/redo. Documents share rope nodes and
/// attachment bytes, so cloning one is cheap.
#[derive(Clone, Debug)]
pub struct EditSnapshot {
    pub document: Document,
    pub selection: TextRange,
    /// Content hash of the document at capture.
    pub hash: u64,
}

impl EditSnapshot {
    pub fn capture(document: &Document, selection: TextRange) -> Self {
        Self {
            document: document.clone(),
            selection,
            hash: document.content_hash(),
        }
    }

    /// Same attributed content as `document` (hash fast-reject, then full compare).
    pub fn matches(&self, document: &Document, hash: u64) -> bool {
        self.hash == hash && self.document == *document
    }
}

/// Typing run state. While active, further typing reuses the snapshot taken
/// at the start of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertRun {
    Inactive,
    Active { edits: u32 },
}

pub struct UndoEngine {
    undo_stack: Vec<EditSnapshot>,
    redo_stack: Vec<EditSnapshot>,
    insert_run: InsertRun,
    /// `None` keeps every snapshot.
    limit: Option<usize>,
    /// Count of pushes skipped because the top already held identical content.
    snapshots_skipped: AtomicU64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            insert_run: InsertRun::Inactive,
            limit: limit.filter(|l| *l > 0),
            snapshots_skipped: AtomicU64::new(0),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn insert_run(&self) -> InsertRun {
        self.insert_run
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped.load(Ordering::Relaxed)
    }
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Record `document` as the state to return to. A push whose content
    /// equals the top entry is skipped; redo history is discarded either way
    /// since a new edit is about to happen.
    pub fn push_snapshot(&mut self, document: &Document, selection: TextRange) {
        let hash = document.content_hash();
        if let Some(last) = self.undo_stack.last()
            && last.matches(document, hash)
        {
            self.snapshots_skipped.fetch_add(1, Ordering::Relaxed);
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), hash, "snapshot_dedupe_skip");
        } else {
            self.undo_stack.push(EditSnapshot {
                document: document.clone(),
                selection,
                hash,
            });
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), chars = document.len(), hash, "push_snapshot");
            if let Some(limit) = self.limit
                && self.undo_stack.len() > limit
            {
                let excess = self.undo_stack.len() - limit;
                self.undo_stack.drain(..excess);
                trace!(target: "state.undo", limit, "undo_stack_trimmed");
            }
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    /// Snapshot once per typing run.
    pub fn begin_insert_coalescing(&mut self, document: &Document, selection: TextRange) {
        match self.insert_run {
            InsertRun::Inactive => {
                self.push_snapshot(document, selection);
                self.insert_run = InsertRun::Active { edits: 1 };
            }
            InsertRun::Active { ref mut edits } => {
                *edits += 1;
                if !self.redo_stack.is_empty() {
                    self.redo_stack.clear();
                    trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
                }
            }
        }
    }

    pub fn end_insert_coalescing(&mut self) {
        if self.insert_run != InsertRun::Inactive {
            trace!(target: "state.undo", run = ?self.insert_run, "insert_run_closed");
        }
        self.insert_run = InsertRun::Inactive;
    }

    pub fn undo(&mut self, document: &mut Document, selection: &mut TextRange) -> bool {
        self.end_insert_coalescing();
        let Some(last) = self.undo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        self.redo_stack
            .push(EditSnapshot::capture(document, *selection));
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), "redo_push_from_undo");
        *document = last.document;
        *selection = last.selection;
        true
    }

    pub fn redo(&mut self, document: &mut Document, selection: &mut TextRange) -> bool {
        self.end_insert_coalescing();
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), undo_depth = self.undo_stack.len(), "redo_pop");
        self.undo_stack
            .push(EditSnapshot::capture(document, *selection));
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "undo_push_from_redo");
        *document = next.document;
        *selection = next.selection;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{AttributeSet, Color};
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_text(text)
    }

    #[test]
    fn identical_pushes_collapse_to_one_entry() {
        let mut u = UndoEngine::new();
        let d = doc("same");
        u.push_snapshot(&d, TextRange::caret(0));
        u.push_snapshot(&d, TextRange::caret(4));
        assert_eq!(u.undo_depth(), 1);
        assert_eq!(u.snapshots_skipped(), 1);
    }

    #[test]
    fn attribute_only_difference_is_not_deduped() {
        let mut u = UndoEngine::new();
        let plain = doc("abc");
        let mut styled = plain.clone();
        styled
            .set_attributes(
                &AttributeSet::new().with_foreground(Color::LINK),
                TextRange::new(0, 1),
            )
            .unwrap();
        u.push_snapshot(&plain, TextRange::caret(0));
        u.push_snapshot(&styled, TextRange::caret(0));
        assert_eq!(u.undo_depth(), 2);
    }

    #[test]
    fn undo_then_redo_round_trips_state() {
        let mut u = UndoEngine::new();
        let mut current = doc("before");
        let mut sel = TextRange::caret(6);
        u.push_snapshot(&current, sel);
        current = doc("before after");
        sel = TextRange::caret(12);

        assert!(u.undo(&mut current, &mut sel));
        assert_eq!(current.text(), "before");
        assert_eq!(sel, TextRange::caret(6));
        assert_eq!(u.redo_depth(), 1);

        assert!(u.redo(&mut current, &mut sel));
        assert_eq!(current.text(), "before after");
        assert_eq!(sel, TextRange::caret(12));
        assert_eq!(u.undo_depth(), 1);
        assert_eq!(u.redo_depth(), 0);
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut u = UndoEngine::new();
        let mut d = doc("x");
        let mut sel = TextRange::caret(1);
        assert!(!u.undo(&mut d, &mut sel));
        assert!(!u.redo(&mut d, &mut sel));
        assert_eq!(d.text(), "x");
    }

    #[test]
    fn new_push_clears_redo() {
        let mut u = UndoEngine::new();
        let mut d = doc("a");
        let mut sel = TextRange::caret(0);
        u.push_snapshot(&d, sel);
        d = doc("ab");
        u.undo(&mut d, &mut sel);
        assert!(u.can_redo());
        u.push_snapshot(&d, sel);
        assert!(!u.can_redo());
    }

    #[test]
    fn bounded_history_drops_oldest() {
        let mut u = UndoEngine::with_limit(Some(2));
        for t in ["a", "b", "c"] {
            u.push_snapshot(&doc(t), TextRange::caret(0));
        }
        assert_eq!(u.undo_depth(), 2);
        let mut d = doc("d");
        let mut sel = TextRange::caret(0);
        u.undo(&mut d, &mut sel);
        u.undo(&mut d, &mut sel);
        assert_eq!(d.text(), "b");
        assert!(!u.undo(&mut d, &mut sel));
    }

    #[test]
    fn zero_limit_means_unbounded() {
        assert_eq!(UndoEngine::with_limit(Some(0)).limit(), None);
    }

    #[test]
    fn coalesced_run_snapshots_once() {
        let mut u = UndoEngine::new();
        u.begin_insert_coalescing(&doc(""), TextRange::caret(0));
        u.begin_insert_coalescing(&doc("h"), TextRange::caret(1));
        u.begin_insert_coalescing(&doc("hi"), TextRange::caret(2));
        assert_eq!(u.undo_depth(), 1);
        assert_eq!(u.insert_run(), InsertRun::Active { edits: 3 });
        u.end_insert_coalescing();
        u.begin_insert_coalescing(&doc("hi "), TextRange::caret(3));
        assert_eq!(u.undo_depth(), 2);
    }
}
