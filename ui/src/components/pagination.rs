use coverform::i18n::{self, Message};
use leptos::prelude::*;

use crate::context::use_locale;

/// Prev / "Page x of y" / Next controls
#[component]
pub fn Pagination(
    /// Current page (0-indexed)
    #[prop(into)] page: Signal<usize>,
    #[prop(into)] total_pages: Signal<usize>,
    #[prop(into)] has_previous: Signal<bool>,
    #[prop(into)] has_next: Signal<bool>,
    on_previous: Callback<()>,
    on_next: Callback<()>,
) -> impl IntoView {
    let locale = use_locale();
    let button_class = |enabled: bool| {
        format!(
            "px-4 py-2 rounded-md border border-gray-300 dark:border-gray-600 {}",
            if enabled {
                "hover:bg-gray-200 dark:hover:bg-gray-700 dark:text-gray-200"
            } else {
                "text-gray-400 cursor-not-allowed dark:text-gray-600"
            }
        )
    };

    view! {
        <div class="flex justify-center items-center mt-6 gap-4">
            <button
                class=move || button_class(has_previous.get())
                disabled=move || !has_previous.get()
                on:click=move |_| on_previous.run(())
            >
                {move || locale.t(Message::Previous)}
            </button>
            <span class="font-medium text-gray-900 dark:text-gray-200">
                {move || i18n::page_of(locale.locale(), page.get() + 1, total_pages.get().max(1))}
            </span>
            <button
                class=move || button_class(has_next.get())
                disabled=move || !has_next.get()
                on:click=move |_| on_next.run(())
            >
                {move || locale.t(Message::Next)}
            </button>
        </div>
    }
}
