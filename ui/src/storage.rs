//! `localStorage` backed stores
//!
//! Drafts use the same `draft-{formId}` keys as every other host; theme and
//! language live under `darkMode` and `locale`.

use coverform::domain::PersistenceError;
use coverform::drafts::{draft_key, DraftStore};
use coverform::i18n::Locale;
use coverform::preferences::{PreferenceStore, Preferences, Theme};
use web_sys::Storage;

const DARK_MODE_KEY: &str = "darkMode";
const LOCALE_KEY: &str = "locale";

fn local_storage() -> Result<Storage, PersistenceError> {
    web_sys::window()
        .ok_or_else(|| PersistenceError::Storage("No window".to_string()))?
        .local_storage()
        .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))?
        .ok_or_else(|| PersistenceError::Storage("localStorage is unavailable".to_string()))
}

fn get_item(key: &str) -> Result<Option<String>, PersistenceError> {
    local_storage()?
        .get_item(key)
        .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))
}

fn set_item(key: &str, value: &str) -> Result<(), PersistenceError> {
    local_storage()?
        .set_item(key, value)
        .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageDraftStore;

impl DraftStore for LocalStorageDraftStore {
    fn load_raw(&self, form_id: &str) -> Result<Option<String>, PersistenceError> {
        get_item(&draft_key(form_id))
    }

    fn save_raw(&mut self, form_id: &str, json: &str) -> Result<(), PersistenceError> {
        set_item(&draft_key(form_id), json)
    }

    fn remove(&mut self, form_id: &str) -> Result<(), PersistenceError> {
        local_storage()?
            .remove_item(&draft_key(form_id))
            .map_err(|e| PersistenceError::Storage(format!("{:?}", e)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStoragePreferenceStore;

impl PreferenceStore for LocalStoragePreferenceStore {
    fn load(&self) -> Result<Preferences, PersistenceError> {
        let theme = get_item(DARK_MODE_KEY)?.map(|v| if v == "true" { Theme::Dark } else { Theme::Light });
        let locale = get_item(LOCALE_KEY)?.and_then(|v| Locale::from_tag(&v));
        Ok(Preferences { theme, locale })
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), PersistenceError> {
        if let Some(theme) = preferences.theme {
            set_item(DARK_MODE_KEY, if theme == Theme::Dark { "true" } else { "false" })?;
        }
        if let Some(locale) = preferences.locale {
            set_item(LOCALE_KEY, locale.code())?;
        }
        Ok(())
    }
}

/// `prefers-color-scheme` of the browser
pub fn system_theme() -> Theme {
    let dark = web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|mql| mql.matches())
        .unwrap_or(false);
    if dark {
        Theme::Dark
    } else {
        Theme::Light
    }
}

/// `navigator.languages`, most preferred first
pub fn browser_languages() -> Vec<String> {
    web_sys::window()
        .map(|w| {
            w.navigator()
                .languages()
                .iter()
                .filter_map(|v| v.as_string())
                .collect()
        })
        .unwrap_or_default()
}
