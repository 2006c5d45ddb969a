//! Theme and locale provided through Leptos context
//!
//! Each handle pairs a signal for rendering with the persistent context
//! object that owns the stored preference.

use coverform::i18n::{self, Locale, Message};
use coverform::preferences::{LocaleContext, Theme, ThemeContext};
use leptos::prelude::*;

use crate::storage::{browser_languages, system_theme, LocalStoragePreferenceStore};

#[derive(Clone, Copy)]
pub struct ThemeHandle {
    theme: RwSignal<Theme>,
    context: StoredValue<ThemeContext<LocalStoragePreferenceStore>>,
}

impl ThemeHandle {
    pub fn is_dark(&self) -> bool {
        self.theme.get() == Theme::Dark
    }

    pub fn toggle(&self) {
        self.context.update_value(|ctx| {
            if let Err(e) = ctx.toggle() {
                log::warn!("Failed to store theme: {}", e);
            }
        });
        self.theme.set(self.context.with_value(|ctx| ctx.theme()));
    }
}

#[derive(Clone, Copy)]
pub struct LocaleHandle {
    locale: RwSignal<Locale>,
    context: StoredValue<LocaleContext<LocalStoragePreferenceStore>>,
}

impl LocaleHandle {
    pub fn locale(&self) -> Locale {
        self.locale.get()
    }

    pub fn set(&self, locale: Locale) {
        self.context.update_value(|ctx| {
            if let Err(e) = ctx.set(locale) {
                log::warn!("Failed to store locale: {}", e);
            }
        });
        self.locale.set(locale);
    }

    /// Switches between the two supported languages
    pub fn toggle(&self) {
        let next = match self.locale.get_untracked() {
            Locale::En => Locale::Fa,
            Locale::Fa => Locale::En,
        };
        self.set(next);
    }

    pub fn t(&self, message: Message) -> &'static str {
        i18n::translate(self.locale.get(), message)
    }
}

/// Creates both handles, provides them and keeps `<html>` in sync
pub fn provide_preferences() {
    let theme_ctx = ThemeContext::new(LocalStoragePreferenceStore, system_theme());
    let theme = ThemeHandle {
        theme: RwSignal::new(theme_ctx.theme()),
        context: StoredValue::new(theme_ctx),
    };

    let locale_ctx = LocaleContext::new(LocalStoragePreferenceStore, browser_languages());
    let locale = LocaleHandle {
        locale: RwSignal::new(locale_ctx.locale()),
        context: StoredValue::new(locale_ctx),
    };

    Effect::new(move |_| {
        let dark = theme.is_dark();
        if let Some(root) = document().document_element() {
            let result = if dark {
                root.class_list().add_1("dark")
            } else {
                root.class_list().remove_1("dark")
            };
            if result.is_err() {
                log::warn!("Failed to update theme class");
            }
        }
    });

    Effect::new(move |_| {
        let current = locale.locale();
        if let Some(root) = document().document_element() {
            let _ = root.set_attribute("lang", current.code());
            let _ = root.set_attribute("dir", if current.is_rtl() { "rtl" } else { "ltr" });
        }
    });

    provide_context(theme);
    provide_context(locale);
}

pub fn use_theme() -> ThemeHandle {
    expect_context::<ThemeHandle>()
}

pub fn use_locale() -> LocaleHandle {
    expect_context::<LocaleHandle>()
}
