//! Linear undo/redo history for one open document.
//!
//! The log never reads the buffer on its own. User edits go through
//! [`Editor`], which mutates the buffer first and then records the edit;
//! undo and redo replay through the raw [`TextBuffer`] primitives so a
//! replayed edit is never recorded a second time.

use crate::error::{NoteError, Result, Stack};
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Delete,
}

/// A single recorded mutation. Offsets are character offsets; `byte_len`
/// is the UTF-8 length of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub kind: EditKind,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub byte_len: usize,
}

impl Edit {
    fn insert(start: usize, text: &str) -> Self {
        Self {
            kind: EditKind::Insert,
            start,
            end: start + text.chars().count(),
            text: text.to_string(),
            byte_len: text.len(),
        }
    }

    fn delete(start: usize, end: usize, text: &str) -> Self {
        Self {
            kind: EditKind::Delete,
            start,
            end,
            text: text.to_string(),
            byte_len: text.len(),
        }
    }
}

/// Button enablement derived from the two stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Primitive mutations of an editable text. Implementations must not call
/// back into an [`EditLog`].
pub trait TextBuffer {
    fn text(&self) -> String;
    fn char_len(&self) -> usize;
    fn slice(&self, start: usize, end: usize) -> String;
    fn insert_at(&mut self, offset: usize, text: &str, byte_len: usize);
    fn delete_range(&mut self, start: usize, end: usize);
    /// Replace everything; `None` empties the buffer.
    fn set_text(&mut self, text: Option<&str>);
}

/// `String`-backed buffer addressed by character offsets. Offsets past the
/// end clamp to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBuffer {
    inner: String,
}

impl StringBuffer {
    pub fn new(text: &str) -> Self {
        Self { inner: text.to_string() }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    fn byte_offset(&self, offset: usize) -> usize {
        self.inner
            .char_indices()
            .nth(offset)
            .map(|(idx, _)| idx)
            .unwrap_or(self.inner.len())
    }
}

impl TextBuffer for StringBuffer {
    fn text(&self) -> String {
        self.inner.clone()
    }

    fn char_len(&self) -> usize {
        self.inner.chars().count()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let from = self.byte_offset(start);
        let to = self.byte_offset(end.max(start));
        self.inner[from..to].to_string()
    }

    fn insert_at(&mut self, offset: usize, text: &str, byte_len: usize) {
        let text = text.get(..byte_len).unwrap_or(text);
        let at = self.byte_offset(offset);
        self.inner.insert_str(at, text);
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let from = self.byte_offset(start);
        let to = self.byte_offset(end.max(start));
        self.inner.replace_range(from..to, "");
    }

    fn set_text(&mut self, text: Option<&str>) {
        self.inner.clear();
        if let Some(text) = text {
            self.inner.push_str(text);
        }
    }
}

type Observer = Box<dyn FnMut(HistoryState)>;

#[derive(Default)]
pub struct EditLog {
    undo_stack: Vec<Edit>,
    redo_stack: Vec<Edit>,
    observer: Option<Observer>,
}

impl fmt::Debug for EditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditLog")
            .field("undo_stack", &self.undo_stack)
            .field("redo_stack", &self.redo_stack)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl EditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every state notification, e.g. to toggle undo/redo buttons.
    pub fn set_observer(&mut self, observer: impl FnMut(HistoryState) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: !self.undo_stack.is_empty(),
            can_redo: !self.redo_stack.is_empty(),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Record an insert that already happened in the live buffer.
    pub fn record_insert(&mut self, start: usize, text: &str) -> HistoryState {
        self.push(Edit::insert(start, text))
    }

    /// Record a delete of `[start, end)` that already happened.
    pub fn record_delete(
        &mut self,
        start: usize,
        end: usize,
        deleted: &str,
    ) -> HistoryState {
        self.push(Edit::delete(start, end, deleted))
    }

    pub fn undo(&mut self, buffer: &mut impl TextBuffer) -> Result<HistoryState> {
        let edit = self
            .undo_stack
            .pop()
            .ok_or(NoteError::EmptyStack { stack: Stack::Undo })?;
        match edit.kind {
            EditKind::Insert => buffer.delete_range(edit.start, edit.end),
            EditKind::Delete => {
                buffer.insert_at(edit.start, &edit.text, edit.byte_len)
            }
        }
        trace!(kind = ?edit.kind, start = edit.start, "undo");
        self.redo_stack.push(edit);
        Ok(self.notify())
    }

    pub fn redo(&mut self, buffer: &mut impl TextBuffer) -> Result<HistoryState> {
        let edit = self
            .redo_stack
            .pop()
            .ok_or(NoteError::EmptyStack { stack: Stack::Redo })?;
        match edit.kind {
            EditKind::Insert => {
                buffer.insert_at(edit.start, &edit.text, edit.byte_len)
            }
            EditKind::Delete => buffer.delete_range(edit.start, edit.end),
        }
        trace!(kind = ?edit.kind, start = edit.start, "redo");
        self.undo_stack.push(edit);
        Ok(self.notify())
    }

    /// Load `text` into the buffer and forget all history. Not undoable.
    pub fn reset(
        &mut self,
        buffer: &mut impl TextBuffer,
        text: Option<&str>,
    ) -> HistoryState {
        buffer.set_text(text);
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify()
    }

    fn push(&mut self, edit: Edit) -> HistoryState {
        trace!(kind = ?edit.kind, start = edit.start, end = edit.end, "record");
        self.undo_stack.push(edit);
        self.redo_stack.clear();
        self.notify()
    }

    fn notify(&mut self) -> HistoryState {
        let state = self.state();
        if let Some(observer) = self.observer.as_mut() {
            observer(state);
        }
        state
    }
}

/// A buffer together with its edit log.
#[derive(Debug, Default)]
pub struct Editor<B = StringBuffer> {
    buffer: B,
    log: EditLog,
}

impl<B: TextBuffer> Editor<B> {
    pub fn new(buffer: B) -> Self {
        Self { buffer, log: EditLog::new() }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn log(&self) -> &EditLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut EditLog {
        &mut self.log
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn state(&self) -> HistoryState {
        self.log.state()
    }

    /// User-driven insert. Empty text is ignored.
    pub fn insert(&mut self, offset: usize, text: &str) -> HistoryState {
        if text.is_empty() {
            return self.log.state();
        }
        let offset = offset.min(self.buffer.char_len());
        self.buffer.insert_at(offset, text, text.len());
        self.log.record_insert(offset, text)
    }

    /// User-driven delete of `[start, end)`. An empty range is ignored.
    pub fn delete(&mut self, start: usize, end: usize) -> HistoryState {
        let end = end.min(self.buffer.char_len());
        if start >= end {
            return self.log.state();
        }
        let removed = self.buffer.slice(start, end);
        self.buffer.delete_range(start, end);
        self.log.record_delete(start, end, &removed)
    }

    /// Swap in `text` as one delete plus one insert, both undoable.
    pub fn replace_all(&mut self, text: &str) -> HistoryState {
        if self.buffer.text() == text {
            return self.log.state();
        }
        let len = self.buffer.char_len();
        self.delete(0, len);
        self.insert(0, text)
    }

    pub fn undo(&mut self) -> Result<HistoryState> {
        self.log.undo(&mut self.buffer)
    }

    pub fn redo(&mut self) -> Result<HistoryState> {
        self.log.redo(&mut self.buffer)
    }

    pub fn reset(&mut self, text: Option<&str>) -> HistoryState {
        self.log.reset(&mut self.buffer, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> Editor {
        Editor::new(StringBuffer::default())
    }

    #[test]
    fn test_undo_redo_scenario() {
        let mut ed = editor();
        ed.insert(0, "ab");
        ed.insert(2, "c");
        assert_eq!(ed.text(), "abc");

        ed.undo().unwrap();
        assert_eq!(ed.text(), "ab");
        ed.undo().unwrap();
        assert_eq!(ed.text(), "");
        let state = ed.redo().unwrap();
        assert_eq!(ed.text(), "ab");
        assert_eq!(state, HistoryState { can_undo: true, can_redo: true });
    }

    #[test]
    fn test_undo_k_then_redo_k_restores_buffer() {
        let mut ed = editor();
        ed.insert(0, "hello world");
        ed.delete(5, 11);
        ed.insert(5, ", there");
        ed.delete(0, 1);
        ed.insert(0, "H");
        let expected = ed.text();
        let depth = ed.log().undo_depth();

        for k in 0..=depth {
            for _ in 0..k {
                ed.undo().unwrap();
            }
            for _ in 0..k {
                ed.redo().unwrap();
            }
            assert_eq!(ed.text(), expected, "k = {k}");
            assert_eq!(ed.log().undo_depth(), depth);
            assert_eq!(ed.log().redo_depth(), 0);
        }
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut ed = editor();
        ed.insert(0, "one");
        ed.insert(3, " two");
        ed.undo().unwrap();
        assert!(ed.state().can_redo);

        let state = ed.insert(3, "!");
        assert_eq!(state, HistoryState { can_undo: true, can_redo: false });
        assert_eq!(ed.log().redo_depth(), 0);
        assert!(matches!(
            ed.redo(),
            Err(NoteError::EmptyStack { stack: Stack::Redo })
        ));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut ed = editor();
        ed.insert(0, "draft");
        ed.undo().unwrap();
        ed.insert(0, "x");
        let state = ed.reset(Some("loaded"));
        assert_eq!(state, HistoryState::default());
        assert_eq!(ed.text(), "loaded");
        assert!(matches!(
            ed.undo(),
            Err(NoteError::EmptyStack { stack: Stack::Undo })
        ));

        ed.reset(None);
        assert_eq!(ed.text(), "");
    }

    #[test]
    fn test_replay_is_not_recorded() {
        let mut ed = editor();
        ed.insert(0, "abc");
        ed.delete(1, 2);
        assert_eq!(ed.text(), "ac");

        ed.undo().unwrap();
        assert_eq!(ed.text(), "abc");
        assert_eq!(ed.log().undo_depth(), 1);
        assert_eq!(ed.log().redo_depth(), 1);

        ed.redo().unwrap();
        assert_eq!(ed.text(), "ac");
        assert_eq!(ed.log().undo_depth(), 2);
        assert_eq!(ed.log().redo_depth(), 0);
    }

    #[test]
    fn test_offsets_are_characters() {
        let mut ed = editor();
        ed.insert(0, "héllo");
        ed.insert(5, " wörld");
        ed.delete(1, 2);
        assert_eq!(ed.text(), "hllo wörld");

        let edit = &ed.log().undo_stack[0];
        assert_eq!(edit.end, 5);
        assert_eq!(edit.byte_len, "héllo".len());

        ed.undo().unwrap();
        assert_eq!(ed.text(), "héllo wörld");
    }

    #[test]
    fn test_replace_all_undoes_in_two_steps() {
        let mut ed = editor();
        ed.reset(Some("old text"));
        ed.replace_all("new");
        assert_eq!(ed.text(), "new");
        ed.undo().unwrap();
        assert_eq!(ed.text(), "");
        ed.undo().unwrap();
        assert_eq!(ed.text(), "old text");
        assert!(!ed.state().can_undo);
    }

    #[test]
    fn test_empty_edits_are_ignored() {
        let mut ed = editor();
        ed.insert(0, "");
        ed.delete(0, 0);
        ed.delete(3, 1);
        assert_eq!(ed.log().undo_depth(), 0);
    }

    #[test]
    fn test_observer_sees_every_notification() {
        let seen: Rc<RefCell<Vec<HistoryState>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let mut ed = editor();
        ed.log_mut().set_observer(move |s| sink.borrow_mut().push(s));

        ed.insert(0, "a");
        ed.undo().unwrap();
        ed.redo().unwrap();
        ed.reset(None);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], HistoryState { can_undo: true, can_redo: false });
        assert_eq!(seen[1], HistoryState { can_undo: false, can_redo: true });
        assert_eq!(seen[2], HistoryState { can_undo: true, can_redo: false });
        assert_eq!(seen[3], HistoryState::default());
    }

    #[test]
    fn test_log_against_external_buffer() {
        // Buffer mutated by someone else, log told afterwards.
        let mut buf = StringBuffer::new("xyz");
        let mut log = EditLog::new();
        buf.delete_range(0, 1);
        log.record_delete(0, 1, "x");
        buf.insert_at(2, "!", 1);
        log.record_insert(2, "!");
        assert_eq!(buf.as_str(), "yz!");

        log.undo(&mut buf).unwrap();
        log.undo(&mut buf).unwrap();
        assert_eq!(buf.as_str(), "xyz");
    }
}
