use coverform::i18n::Message;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes, A};
use leptos_router::path;

mod api;
mod components;
mod context;
mod storage;

use components::form_page::FormPage;
use components::submissions_page::SubmissionsPage;
use context::{provide_preferences, use_locale, use_theme};

#[component]
pub fn App() -> impl IntoView {
    provide_preferences();
    let theme = use_theme();
    let locale = use_locale();

    view! {
        <Router>
            <div class="min-h-screen bg-gray-100 dark:bg-gray-800">
                <nav class="bg-gray-800 dark:bg-gray-950 text-white px-6 py-3 flex items-center gap-2">
                    <h1 class="text-xl font-bold me-6">"Coverform"</h1>
                    <NavLink href="/" label=Message::Forms />
                    <NavLink href="/submissions" label=Message::Submissions />
                    <div class="flex-1"></div>
                    <button
                        class="px-3 py-1 rounded hover:bg-gray-700 transition-colors"
                        on:click=move |_| theme.toggle()
                    >
                        {move || if theme.is_dark() { locale.t(Message::LightMode) } else { locale.t(Message::DarkMode) }}
                    </button>
                    <button
                        class="px-3 py-1 rounded hover:bg-gray-700 transition-colors"
                        on:click=move |_| locale.toggle()
                    >
                        {move || locale.locale().native_name()}
                    </button>
                </nav>

                <Routes fallback=|| "Not found.">
                    <Route path=path!("/") view=FormPage/>
                    <Route path=path!("/submissions") view=SubmissionsPage/>
                </Routes>
            </div>
        </Router>
    }
}

#[component]
fn NavLink(href: &'static str, label: Message) -> impl IntoView {
    let locale = use_locale();
    view! {
        <A href=href attr:class="block px-3 py-1 hover:bg-gray-700 rounded transition-colors">
            {move || locale.t(label)}
        </A>
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::mount_to_body(App);
}
