//! Filesystem-backed draft and preference stores
//!
//! Drafts live as `<dir>/draft-{formId}.json`, one file per form, so the
//! storage key stays the same as in the browser's local storage.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::PersistenceError;
use crate::drafts::{draft_key, DraftStore};
use crate::preferences::{PreferenceStore, Preferences};

#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of the draft for `form_id`
    pub fn path_for(&self, form_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", draft_key(form_id)))
    }
}

impl DraftStore for FileDraftStore {
    fn load_raw(&self, form_id: &str) -> Result<Option<String>, PersistenceError> {
        read_optional(&self.path_for(form_id))
    }

    fn save_raw(&mut self, form_id: &str, json: &str) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(form_id);
        // Write-then-rename so a crash never leaves a half-written draft
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!("Saved draft {}", path.display());
        Ok(())
    }

    fn remove(&mut self, form_id: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path_for(form_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Preferences kept in a single JSON file
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Preferences, PersistenceError> {
        match read_optional(&self.path)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Preferences::default()),
        }
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(preferences)?)?;
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
