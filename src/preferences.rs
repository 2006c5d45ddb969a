//! Theme and locale contexts
//!
//! Explicit context objects created once at start-up by the host and passed
//! down to whatever needs them. Each reads its initial value from a
//! [`PreferenceStore`] and writes changes back through it.

use serde::{Deserialize, Serialize};

use crate::domain::PersistenceError;
use crate::i18n::{self, Locale, Message};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
}

pub trait PreferenceStore {
    fn load(&self) -> Result<Preferences, PersistenceError>;

    fn save(&mut self, preferences: &Preferences) -> Result<(), PersistenceError>;

    /// Updates one part of the stored preferences, keeping the rest
    fn update<F>(&mut self, change: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut Preferences),
        Self: Sized,
    {
        let mut preferences = self.load()?;
        change(&mut preferences);
        self.save(&preferences)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPreferenceStore {
    preferences: Preferences,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load(&self) -> Result<Preferences, PersistenceError> {
        Ok(self.preferences.clone())
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), PersistenceError> {
        self.preferences = preferences.clone();
        Ok(())
    }
}

// ============================================================================
// Theme Context
// ============================================================================

pub struct ThemeContext<S: PreferenceStore> {
    theme: Theme,
    store: S,
}

impl<S: PreferenceStore> ThemeContext<S> {
    /// Stored theme, or `system_default` when nothing was saved yet
    pub fn new(store: S, system_default: Theme) -> Self {
        let theme = match store.load() {
            Ok(prefs) => prefs.theme.unwrap_or(system_default),
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {}", e);
                system_default
            }
        };
        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    pub fn set(&mut self, theme: Theme) -> Result<(), PersistenceError> {
        self.theme = theme;
        self.store.update(|p| p.theme = Some(theme))
    }

    pub fn toggle(&mut self) -> Result<Theme, PersistenceError> {
        let next = self.theme.toggled();
        self.set(next)?;
        Ok(next)
    }
}

// ============================================================================
// Locale Context
// ============================================================================

pub struct LocaleContext<S: PreferenceStore> {
    locale: Locale,
    store: S,
}

impl<S: PreferenceStore> LocaleContext<S> {
    /// Stored locale, or the first supported one among `preferred` tags
    pub fn new<I, T>(store: S, preferred: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let stored = match store.load() {
            Ok(prefs) => prefs.locale,
            Err(e) => {
                tracing::warn!("Failed to read locale preference: {}", e);
                None
            }
        };
        let locale = stored.unwrap_or_else(|| Locale::detect(preferred));
        Self { locale, store }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set(&mut self, locale: Locale) -> Result<(), PersistenceError> {
        self.locale = locale;
        self.store.update(|p| p.locale = Some(locale))
    }

    pub fn translate(&self, message: Message) -> &'static str {
        i18n::translate(self.locale, message)
    }
}
