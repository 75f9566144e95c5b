//! The one note currently open in the editor.

use crate::edit_log::{Editor, StringBuffer};
use crate::error::Result;
use tracing::debug;

/// Answer to "save changes before closing?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// Tracks the last saved name and content of the open note so unsaved
/// changes can be detected. A blank session (no key, empty name and
/// content) stands for a new note that was never saved.
#[derive(Debug, Default)]
pub struct DocumentSession {
    open_key: Option<String>,
    last_saved_name: String,
    last_saved_content: String,
    editor: Editor<StringBuffer>,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, key: Option<String>, name: &str, content: &str) {
        self.editor.reset(Some(content));
        self.last_saved_name = name.to_string();
        self.last_saved_content = content.to_string();
        debug!(?key, %name, "opened note");
        self.open_key = key;
    }

    pub fn open_blank(&mut self) {
        self.open(None, "", "");
    }

    /// Point the session at the storage key its content was saved under.
    pub fn attach(&mut self, key: String) {
        self.open_key = Some(key);
    }

    pub fn open_key(&self) -> Option<&str> {
        self.open_key.as_deref()
    }

    pub fn last_saved_name(&self) -> &str {
        &self.last_saved_name
    }

    pub fn last_saved_content(&self) -> &str {
        &self.last_saved_content
    }

    /// True when nothing is open: no key and nothing saved yet.
    pub fn is_blank(&self) -> bool {
        self.open_key.is_none()
            && self.last_saved_name.is_empty()
            && self.last_saved_content.is_empty()
    }

    pub fn editor(&self) -> &Editor<StringBuffer> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor<StringBuffer> {
        &mut self.editor
    }

    pub fn current_content(&self) -> String {
        self.editor.text()
    }

    pub fn is_dirty(&self, name: &str, content: &str) -> bool {
        name != self.last_saved_name || content != self.last_saved_content
    }

    /// Whether the document may be closed. Unsaved changes are put to
    /// `confirm`; `Save` goes through [`DocumentSession::save`].
    pub fn request_close<C, P>(
        &mut self,
        name: &str,
        content: &str,
        confirm: C,
        persist: P,
    ) -> Result<bool>
    where
        C: FnOnce() -> CloseChoice,
        P: FnOnce(&str, &str, &str) -> Result<bool>,
    {
        if !self.is_dirty(name, content) {
            return Ok(true);
        }
        match confirm() {
            CloseChoice::Save => self.save(name, content, persist),
            CloseChoice::Discard => Ok(true),
            CloseChoice::Cancel => Ok(false),
        }
    }

    /// `request_close`, then fall back to a blank document when allowed.
    pub fn close<C, P>(
        &mut self,
        name: &str,
        content: &str,
        confirm: C,
        persist: P,
    ) -> Result<bool>
    where
        C: FnOnce() -> CloseChoice,
        P: FnOnce(&str, &str, &str) -> Result<bool>,
    {
        if !self.request_close(name, content, confirm, persist)? {
            return Ok(false);
        }
        self.open_blank();
        Ok(true)
    }

    /// `persist(old_name, new_name, content)` does the registry work and may
    /// decline. State only moves forward when it accepts.
    pub fn save<P>(&mut self, name: &str, content: &str, persist: P) -> Result<bool>
    where
        P: FnOnce(&str, &str, &str) -> Result<bool>,
    {
        if name.is_empty() {
            return Ok(false);
        }
        if !persist(&self.last_saved_name, name, content)? {
            return Ok(false);
        }
        self.last_saved_name = name.to_string();
        self.last_saved_content = content.to_string();
        debug!(%name, "saved note");
        Ok(true)
    }
}
