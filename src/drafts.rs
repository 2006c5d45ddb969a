//! Draft persistence port
//!
//! One draft per form, stored under `draft-{formId}` as the JSON-serialized
//! answer map.

use std::collections::HashMap;

use crate::domain::{AnswerMap, PersistenceError};

/// Quiet period after the last change before a draft is written
pub const DRAFT_DEBOUNCE_MS: u32 = 1000;

/// Storage key for a form's draft
pub fn draft_key(form_id: &str) -> String {
    format!("draft-{}", form_id)
}

/// Where in-progress answers live between sessions
pub trait DraftStore {
    /// Raw JSON stored for `form_id`, if any
    fn load_raw(&self, form_id: &str) -> Result<Option<String>, PersistenceError>;

    fn save_raw(&mut self, form_id: &str, json: &str) -> Result<(), PersistenceError>;

    fn remove(&mut self, form_id: &str) -> Result<(), PersistenceError>;

    /// Decoded draft. Undecodable drafts are logged and treated as absent.
    fn load(&self, form_id: &str) -> Result<Option<AnswerMap>, PersistenceError> {
        let Some(raw) = self.load_raw(form_id)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(answers) => Ok(Some(answers)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable draft for {}: {}", form_id, e);
                Ok(None)
            }
        }
    }

    fn save(&mut self, form_id: &str, answers: &AnswerMap) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(answers)?;
        self.save_raw(form_id, &json)
    }
}

/// Process-local draft store
#[derive(Debug, Default, Clone)]
pub struct InMemoryDraftStore {
    entries: HashMap<String, String>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry by full storage key, for inspection
    pub fn entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load_raw(&self, form_id: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(&draft_key(form_id)).cloned())
    }

    fn save_raw(&mut self, form_id: &str, json: &str) -> Result<(), PersistenceError> {
        self.entries.insert(draft_key(form_id), json.to_string());
        Ok(())
    }

    fn remove(&mut self, form_id: &str) -> Result<(), PersistenceError> {
        self.entries.remove(&draft_key(form_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let mut store = InMemoryDraftStore::new();
        let mut answers = AnswerMap::new();
        answers.set("name", "Ada");

        store.save("home", &answers).unwrap();
        assert_eq!(store.entry("draft-home"), Some(r#"{"name":"Ada"}"#));
        assert_eq!(store.load("home").unwrap(), Some(answers));
        assert_eq!(store.load("auto").unwrap(), None);
    }

    #[test]
    fn test_corrupt_draft_is_ignored() {
        let mut store = InMemoryDraftStore::new();
        store.save_raw("home", "{not json").unwrap();
        assert_eq!(store.load("home").unwrap(), None);
    }
}
