//! The list of notes: storage key, display name and modification label for
//! every file in the notes directory.
//!
//! Records are held in one vector sorted by case-folded display name (stable
//! sort, so equal names keep their relative order). The name lookup is
//! rebuilt from that vector after every structural change.

use crate::error::{NoteError, Result};
use crate::note::{NoteRecord, cmp_names, modified_label, placeholder_name};
use crate::storage::{KEY_PREFIX, MetadataStore, NoteStore};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::SystemTime;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct NoteRegistry<S> {
    store: S,
    records: Vec<NoteRecord>,
    index: HashMap<String, usize>,
}

impl<S: NoteStore> NoteRegistry<S> {
    /// Scan the notes directory and attach names from `metadata`. A missing
    /// or unreadable name file only means every note gets a placeholder.
    pub fn load(store: S, metadata: &impl MetadataStore) -> Result<Self> {
        let mut entries = store.list()?;
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        let mut names = metadata.load().into_names();

        let records = entries
            .into_iter()
            .map(|entry| NoteRecord {
                name: names.remove(&entry.key),
                modified: Some(modified_label(entry.modified)),
                key: entry.key,
            })
            .collect::<Vec<_>>();
        if !names.is_empty() {
            debug!(stale = names.len(), "names without a note file dropped");
        }

        let mut registry = Self { store, records, index: HashMap::new() };
        registry.repair_names();
        debug!(count = registry.len(), "loaded notes");
        Ok(registry)
    }

    /// Give every unnamed record, and every record whose name is already
    /// taken by an earlier one, a fresh placeholder name.
    pub fn repair_names(&mut self) {
        let mut taken: HashSet<String> =
            self.records.iter().filter_map(|r| r.name.clone()).collect();
        let mut seen: HashSet<String> = HashSet::new();
        for record in &mut self.records {
            if let Some(name) = &record.name {
                if seen.insert(name.clone()) {
                    continue;
                }
                warn!(key = %record.key, %name, "duplicate note name");
            }
            let name = loop {
                let candidate = placeholder_name();
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(name.clone());
            seen.insert(name.clone());
            record.name = Some(name);
        }
        self.rebuild();
    }

    /// Reserve a new storage key by creating an empty file. The record is
    /// appended unnamed and unsorted until it is written or repaired.
    pub fn create(&mut self) -> Result<String> {
        let key = self.store.create_unique(KEY_PREFIX)?;
        self.records.push(NoteRecord::new(key.clone()));
        Ok(key)
    }

    /// Overwrite the note called `name`, or create it when no such note
    /// exists.
    pub fn write(&mut self, name: &str, content: &str) -> Result<()> {
        let idx = match self.position(name) {
            Some(idx) => {
                self.store.write(&self.records[idx].key, content)?;
                idx
            }
            None => {
                let key = self.create()?;
                if let Err(err) = self.store.write(&key, content) {
                    self.discard_orphan(&key);
                    return Err(err);
                }
                let idx = self.records.len() - 1;
                self.records[idx].name = Some(name.to_string());
                idx
            }
        };
        let label = self.label_for(&self.records[idx].key);
        self.records[idx].modified = Some(label);
        debug!(%name, key = %self.records[idx].key, "wrote note");
        self.rebuild();
        Ok(())
    }

    /// Change a display name. Collisions are the caller's concern.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let idx = self.position(old).ok_or_else(|| NoteError::not_found(old))?;
        self.records[idx].name = Some(new.to_string());
        debug!(%old, %new, "renamed note");
        self.rebuild();
        Ok(())
    }

    /// Remove the file, then the record. A failed removal changes nothing.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let idx =
            self.position(name).ok_or_else(|| NoteError::not_found(name))?;
        self.store.remove(&self.records[idx].key)?;
        let record = self.records.remove(idx);
        debug!(%name, key = %record.key, "deleted note");
        self.rebuild();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<String> {
        let idx =
            self.position(name).ok_or_else(|| NoteError::not_found(name))?;
        self.store.read(&self.records[idx].key)
    }

    /// Save the key to name mapping for every record.
    pub fn persist(&mut self, metadata: &impl MetadataStore) -> Result<()> {
        self.repair_names();
        let names: BTreeMap<String, String> = self
            .records
            .iter()
            .map(|r| (r.key.clone(), r.name().to_string()))
            .collect();
        metadata.save(&names)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn record(&self, name: &str) -> Option<&NoteRecord> {
        self.position(name).map(|idx| &self.records[idx])
    }

    pub fn records(&self) -> &[NoteRecord] {
        &self.records
    }

    /// Display names in list order.
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(NoteRecord::name).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn rebuild(&mut self) {
        self.records.sort_by(cmp_names);
        self.index.clear();
        for (idx, record) in self.records.iter().enumerate() {
            if let Some(name) = &record.name {
                self.index.entry(name.clone()).or_insert(idx);
            }
        }
    }

    fn label_for(&self, key: &str) -> String {
        let at = self.store.modified(key).unwrap_or_else(|err| {
            warn!(%key, "could not stat note: {err}");
            SystemTime::now()
        });
        modified_label(at)
    }

    fn discard_orphan(&mut self, key: &str) {
        if let Some(pos) = self.records.iter().rposition(|r| r.key == key) {
            self.records.remove(pos);
        }
        if let Err(err) = self.store.remove(key) {
            warn!(%key, "could not remove empty note file: {err}");
        }
    }
}
