//! User actions as commands against one explicit application state.
//!
//! A front end turns its own events into [`Action`]s, answers questions
//! through a [`Prompter`], and renders the returned [`Effect`]s.

use crate::edit_log::HistoryState;
use crate::error::{NoteError, Result};
use crate::registry::NoteRegistry;
use crate::session::{CloseChoice, DocumentSession};
use crate::storage::{MetadataStore, NoteStore};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Open(String),
    New,
    SetName(String),
    Insert { offset: usize, text: String },
    Delete { start: usize, end: usize },
    ReplaceText(String),
    Undo,
    Redo,
    Save,
    Close,
    DeleteNote(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Message(String),
    ListChanged,
    History(HistoryState),
    Opened { name: String },
    Closed,
    Quit,
}

/// Questions the core cannot answer on its own.
pub trait Prompter {
    fn confirm_close(&mut self) -> CloseChoice;
    /// Another note already has `name`; replace it?
    fn confirm_overwrite(&mut self, name: &str) -> bool;
    fn confirm_delete(&mut self, name: &str) -> bool;
}

pub const MSG_NO_NAME: &str = "Error: this note has no name";
pub const MSG_NOTE_OPEN: &str = "Error: this note is currently open";

pub struct App<S, M> {
    registry: NoteRegistry<S>,
    metadata: M,
    session: DocumentSession,
    name_field: String,
}

impl<S: NoteStore, M: MetadataStore> App<S, M> {
    pub fn new(registry: NoteRegistry<S>, metadata: M) -> Self {
        Self {
            registry,
            metadata,
            session: DocumentSession::new(),
            name_field: String::new(),
        }
    }

    /// Load the registry from `store` and `metadata` and start blank.
    pub fn load(store: S, metadata: M) -> Result<Self> {
        let registry = NoteRegistry::load(store, &metadata)?;
        Ok(Self::new(registry, metadata))
    }

    pub fn registry(&self) -> &NoteRegistry<S> {
        &self.registry
    }

    pub fn session(&self) -> &DocumentSession {
        &self.session
    }

    pub fn name_field(&self) -> &str {
        &self.name_field
    }

    pub fn text(&self) -> String {
        self.session.current_content()
    }

    pub fn dispatch(
        &mut self,
        action: Action,
        prompter: &mut dyn Prompter,
    ) -> Result<Vec<Effect>> {
        debug!(?action, "dispatch");
        let mut effects = Vec::new();
        match action {
            Action::Open(name) => {
                if !self.registry.contains(&name) {
                    effects.push(Effect::Message(
                        NoteError::not_found(&name).to_string(),
                    ));
                    return Ok(effects);
                }
                if !self.close_current(prompter, &mut effects)? {
                    return Ok(effects);
                }
                let content = self.registry.get(&name)?;
                let key = self.registry.record(&name).map(|r| r.key.clone());
                self.session.open(key, &name, &content);
                self.name_field = name.clone();
                effects.push(Effect::Opened { name });
                effects.push(Effect::History(self.history()));
            }
            Action::New | Action::Close => {
                if self.close_current(prompter, &mut effects)? {
                    self.session.open_blank();
                    self.name_field.clear();
                    effects.push(Effect::Closed);
                    effects.push(Effect::History(self.history()));
                }
            }
            Action::SetName(name) => self.name_field = name,
            Action::Insert { offset, text } => {
                let state = self.session.editor_mut().insert(offset, &text);
                effects.push(Effect::History(state));
            }
            Action::Delete { start, end } => {
                let state = self.session.editor_mut().delete(start, end);
                effects.push(Effect::History(state));
            }
            Action::ReplaceText(text) => {
                let state = self.session.editor_mut().replace_all(&text);
                effects.push(Effect::History(state));
            }
            Action::Undo => {
                if self.history().can_undo {
                    let state = self.session.editor_mut().undo()?;
                    effects.push(Effect::History(state));
                }
            }
            Action::Redo => {
                if self.history().can_redo {
                    let state = self.session.editor_mut().redo()?;
                    effects.push(Effect::History(state));
                }
            }
            Action::Save => {
                self.save_current(prompter, &mut effects)?;
            }
            Action::DeleteNote(name) => {
                self.delete_note(&name, prompter, &mut effects)?;
            }
            Action::Quit => {
                if self.close_current(prompter, &mut effects)? {
                    self.registry.persist(&self.metadata)?;
                    info!(count = self.registry.len(), "saved note list");
                    effects.push(Effect::Quit);
                }
            }
        }
        Ok(effects)
    }

    /// Write the name mapping without quitting.
    pub fn persist(&mut self) -> Result<()> {
        self.registry.persist(&self.metadata)
    }

    fn history(&self) -> HistoryState {
        self.session.editor().state()
    }

    fn save_current(
        &mut self,
        prompter: &mut dyn Prompter,
        effects: &mut Vec<Effect>,
    ) -> Result<bool> {
        let name = self.name_field.clone();
        if name.is_empty() {
            effects.push(Effect::Message(MSG_NO_NAME.to_string()));
            return Ok(false);
        }
        let content = self.session.current_content();
        let registry = &mut self.registry;
        let saved = self.session.save(&name, &content, |old, new, body| {
            persist_note(registry, prompter, old, new, body)
        })?;
        if saved {
            if let Some(record) = self.registry.record(&name) {
                self.session.attach(record.key.clone());
            }
            effects.push(Effect::ListChanged);
        }
        Ok(saved)
    }

    /// Ask about unsaved changes; true when the current note may go away.
    fn close_current(
        &mut self,
        prompter: &mut dyn Prompter,
        effects: &mut Vec<Effect>,
    ) -> Result<bool> {
        let name = self.name_field.clone();
        let content = self.session.current_content();
        if !self.session.is_dirty(&name, &content) {
            return Ok(true);
        }
        let choice = prompter.confirm_close();
        if choice == CloseChoice::Save && name.is_empty() {
            effects.push(Effect::Message(MSG_NO_NAME.to_string()));
            return Ok(false);
        }
        let registry = &mut self.registry;
        let allowed = self.session.request_close(
            &name,
            &content,
            || choice,
            |old, new, body| persist_note(registry, prompter, old, new, body),
        )?;
        if allowed && choice == CloseChoice::Save {
            effects.push(Effect::ListChanged);
        }
        Ok(allowed)
    }

    fn delete_note(
        &mut self,
        name: &str,
        prompter: &mut dyn Prompter,
        effects: &mut Vec<Effect>,
    ) -> Result<()> {
        if !self.session.last_saved_name().is_empty()
            && self.session.last_saved_name() == name
        {
            effects.push(Effect::Message(MSG_NOTE_OPEN.to_string()));
            return Ok(());
        }
        if !self.registry.contains(name) {
            effects.push(Effect::Message(NoteError::not_found(name).to_string()));
            return Ok(());
        }
        if !prompter.confirm_delete(name) {
            return Ok(());
        }
        self.registry.delete(name)?;
        effects.push(Effect::ListChanged);
        Ok(())
    }
}

/// Registry side of saving. An existing note of the new name is replaced
/// only after confirmation. A retitled note's content is written under its
/// old name first; nothing else changes unless that write succeeds.
fn persist_note<S: NoteStore>(
    registry: &mut NoteRegistry<S>,
    prompter: &mut dyn Prompter,
    old: &str,
    new: &str,
    content: &str,
) -> Result<bool> {
    let renaming = !old.is_empty() && old != new && registry.contains(old);
    let collides = old != new && registry.contains(new);
    if collides && !prompter.confirm_overwrite(new) {
        return Ok(false);
    }
    if !renaming {
        registry.write(new, content)?;
        return Ok(true);
    }
    registry.write(old, content)?;
    if collides {
        // The renamed note takes over; the old holder of the name goes.
        registry.delete(new)?;
    }
    registry.rename(old, new)?;
    Ok(true)
}
