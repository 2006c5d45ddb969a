//! UI strings for the two supported locales

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fa,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Fa];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fa => "fa",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Locale::Fa)
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Fa => "فارسی",
        }
    }

    /// Matches a language tag such as `fa-IR` or `en_US.UTF-8` on its primary subtag
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let primary = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Locale::ALL.into_iter().find(|l| l.code() == primary)
    }

    /// First supported locale among preferred tags, English otherwise
    pub fn detect<I, T>(preferred: I) -> Locale
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        preferred
            .into_iter()
            .find_map(|tag| Locale::from_tag(tag.as_ref()))
            .unwrap_or_default()
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| format!("Unsupported locale: {}", s))
    }
}

/// Translatable UI messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    FormTitle,
    Submit,
    SubmittedApps,
    Search,
    Columns,
    NoData,
    Loading,
    Previous,
    Next,
    PageOf,
    SubmitSuccess,
    SubmitFailure,
    ValidationFailed,
    SelectPlaceholder,
    Forms,
    Submissions,
    DarkMode,
    LightMode,
}

/// Translation for `message`. `PageOf` contains `{page}` and `{total}` placeholders.
pub fn translate(locale: Locale, message: Message) -> &'static str {
    use Message::*;

    match locale {
        Locale::En => match message {
            FormTitle => "Application",
            Submit => "Submit",
            SubmittedApps => "Submitted Applications",
            Search => "Search",
            Columns => "Columns",
            NoData => "No data found",
            Loading => "Loading...",
            Previous => "Prev",
            Next => "Next",
            PageOf => "Page {page} of {total}",
            SubmitSuccess => "Form submitted successfully",
            SubmitFailure => "Submission failed",
            ValidationFailed => "Validation Error:",
            SelectPlaceholder => "Select...",
            Forms => "Forms",
            Submissions => "Submissions",
            DarkMode => "Dark mode",
            LightMode => "Light mode",
        },
        Locale::Fa => match message {
            FormTitle => "درخواست",
            Submit => "ارسال",
            SubmittedApps => "درخواست‌های ثبت‌شده",
            Search => "جستجو",
            Columns => "ستون‌ها",
            NoData => "داده‌ای یافت نشد",
            Loading => "در حال بارگذاری...",
            Previous => "قبلی",
            Next => "بعدی",
            PageOf => "صفحه {page} از {total}",
            SubmitSuccess => "فرم با موفقیت ارسال شد",
            SubmitFailure => "ارسال ناموفق بود",
            ValidationFailed => "خطای اعتبارسنجی:",
            SelectPlaceholder => "انتخاب کنید...",
            Forms => "فرم‌ها",
            Submissions => "ارسال‌ها",
            DarkMode => "حالت تاریک",
            LightMode => "حالت روشن",
        },
    }
}

/// `PageOf` with its placeholders filled
pub fn page_of(locale: Locale, page: usize, total: usize) -> String {
    translate(locale, Message::PageOf)
        .replace("{page}", &page.to_string())
        .replace("{total}", &total.to_string())
}
