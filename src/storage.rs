//! Raw persistence: note bodies as one plain file each, and the name mapping
//! as a small TOML file with a single `[NotesNames]` table.

use crate::error::{NoteError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

/// Prefix for generated storage keys.
pub const KEY_PREFIX: &str = "note_";

/// One file in the notes directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub key: String,
    pub modified: SystemTime,
}

/// Where note bodies live, addressed by storage key.
pub trait NoteStore {
    /// Every note file, in no particular order.
    fn list(&self) -> Result<Vec<DirEntry>>;
    fn read(&self, key: &str) -> Result<String>;
    /// Full overwrite.
    fn write(&self, key: &str, content: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Atomically create an empty file with a fresh name and return its key.
    fn create_unique(&self, prefix: &str) -> Result<String>;
    fn modified(&self, key: &str) -> Result<SystemTime>;
}

#[derive(Debug, Clone)]
pub struct FsNoteStore {
    dir: PathBuf,
}

impl FsNoteStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl NoteStore for FsNoteStore {
    fn list(&self) -> Result<Vec<DirEntry>> {
        let read_dir =
            fs::read_dir(&self.dir).map_err(|e| NoteError::io(&self.dir, e))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| NoteError::io(&self.dir, e))?;
            let path = entry.path();
            let meta = entry.metadata().map_err(|e| NoteError::io(&path, e))?;
            if !meta.is_file() {
                continue;
            }
            let Some(key) = entry.file_name().to_str().map(str::to_string)
            else {
                warn!("Skipping non UTF-8 file name {:?}", path);
                continue;
            };
            let modified =
                meta.modified().map_err(|e| NoteError::io(&path, e))?;
            entries.push(DirEntry { key, modified });
        }
        Ok(entries)
    }

    fn read(&self, key: &str) -> Result<String> {
        let path = self.path_for(key);
        fs::read_to_string(&path).map_err(|e| NoteError::io(path, e))
    }

    fn write(&self, key: &str, content: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, content).map_err(|e| NoteError::io(path, e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::remove_file(&path).map_err(|e| NoteError::io(path, e))
    }

    fn create_unique(&self, prefix: &str) -> Result<String> {
        let file = Builder::new()
            .prefix(prefix)
            .tempfile_in(&self.dir)
            .map_err(|e| NoteError::io(&self.dir, e))?;
        let (_, path) =
            file.keep().map_err(|e| NoteError::io(&self.dir, e.error))?;
        let key = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                NoteError::io(
                    &path,
                    io::Error::other("generated file name is not UTF-8"),
                )
            })?;
        debug!(%key, "created note file");
        Ok(key)
    }

    fn modified(&self, key: &str) -> Result<SystemTime> {
        let path = self.path_for(key);
        fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| NoteError::io(path, e))
    }
}

/// Outcome of reading the name mapping. Only `Loaded` carries data; every
/// other variant means "start with no names".
#[derive(Debug)]
pub enum MetadataLoad {
    Loaded(BTreeMap<String, String>),
    Missing,
    Malformed(String),
    Unreadable(io::Error),
}

impl MetadataLoad {
    pub fn into_names(self) -> BTreeMap<String, String> {
        match self {
            MetadataLoad::Loaded(names) => names,
            MetadataLoad::Missing => BTreeMap::new(),
            MetadataLoad::Malformed(details) => {
                warn!("Ignoring malformed note names file: {details}");
                BTreeMap::new()
            }
            MetadataLoad::Unreadable(err) => {
                warn!("Ignoring unreadable note names file: {err}");
                BTreeMap::new()
            }
        }
    }
}

/// Persisted storage key to display name mapping.
pub trait MetadataStore {
    fn load(&self) -> MetadataLoad;
    fn save(&self, names: &BTreeMap<String, String>) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NotesData {
    #[serde(rename = "NotesNames", default)]
    notes_names: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TomlMetadataStore {
    path: PathBuf,
}

impl TomlMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataStore for TomlMetadataStore {
    fn load(&self) -> MetadataLoad {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return MetadataLoad::Missing;
            }
            Err(e) => return MetadataLoad::Unreadable(e),
        };
        match toml::from_str::<NotesData>(&raw) {
            Ok(data) => MetadataLoad::Loaded(data.notes_names),
            Err(e) => MetadataLoad::Malformed(e.to_string()),
        }
    }

    fn save(&self, names: &BTreeMap<String, String>) -> Result<()> {
        let data = NotesData { notes_names: names.clone() };
        let encoded =
            toml::to_string(&data).map_err(|e| NoteError::Metadata {
                path: self.path.clone(),
                details: e.to_string(),
            })?;
        atomic_write(&self.path, encoded.as_bytes())?;
        debug!(count = names.len(), path = ?self.path, "saved note names");
        Ok(())
    }
}

/// Write through a temp file in the target directory, then rename over the
/// target so readers never see a half-written file.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp =
        NamedTempFile::new_in(parent).map_err(|e| NoteError::io(parent, e))?;
    tmp.write_all(data).map_err(|e| NoteError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| NoteError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| NoteError::io(path, e.error))?;
    Ok(())
}
