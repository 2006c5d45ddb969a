//! Form page
//!
//! Owns a [`FormSession`] for the lifetime of the page. Every change bumps a
//! version signal that the render tree and answer memos track, restarts the
//! draft timer and kicks off any option fetches the change made necessary.

use coverform::domain::{AnswerValue, FormError};
use coverform::drafts::DRAFT_DEBOUNCE_MS;
use coverform::engine::OptionFetcher;
use coverform::i18n::Message;
use coverform::session::FormSession;
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, GlooOptionFetcher};
use crate::components::dynamic_form::DynamicForm;
use crate::context::use_locale;
use crate::storage::LocalStorageDraftStore;

fn alert(message: &str) {
    let _ = web_sys::window().and_then(|w| w.alert_with_message(message).ok());
}

#[component]
pub fn FormPage() -> impl IntoView {
    let locale = use_locale();
    let session = StoredValue::new(FormSession::new(LocalStorageDraftStore));
    let version = RwSignal::new(0u64);
    let pending_save = StoredValue::new_local(None::<Timeout>);
    let load_error = RwSignal::new(None::<String>);
    let submitting = RwSignal::new(false);

    let bump = move || version.update(|v| *v += 1);

    let nodes = Memo::new(move |_| {
        version.track();
        session.with_value(|s| s.render())
    });
    let answers = Memo::new(move |_| {
        version.track();
        session.with_value(|s| s.answers().clone())
    });
    let selected = Memo::new(move |_| {
        version.track();
        session.with_value(|s| s.selected_form().map(|f| (f.form_id.clone(), f.title.clone())))
    });
    let form_list = Memo::new(move |_| {
        version.track();
        session.with_value(|s| {
            s.forms()
                .iter()
                .map(|f| (f.form_id.clone(), f.title.clone()))
                .collect::<Vec<_>>()
        })
    });

    // Fetches whatever option lists the current answers call for. Stale
    // responses are dropped by the session.
    let refresh_options = move || {
        let requests = session.try_update_value(|s| s.plan_options()).unwrap_or_default();
        for request in requests {
            spawn_local(async move {
                let outcome = GlooOptionFetcher.fetch_options(&request).await;
                if let Err(e) = &outcome {
                    log::warn!("Options for '{}' failed: {}", request.field_id, e);
                }
                let applied = session
                    .try_update_value(|s| s.apply_options(&request, outcome))
                    .unwrap_or(false);
                if applied {
                    bump();
                }
            });
        }
    };

    let persist_now = move || {
        pending_save.set_value(None);
        session.update_value(|s| {
            if s.is_dirty() {
                if let Err(e) = s.persist_draft() {
                    log::warn!("Failed to save draft: {}", e);
                }
            }
        });
    };

    let schedule_save = move || {
        let timeout = Timeout::new(DRAFT_DEBOUNCE_MS, move || {
            session.update_value(|s| {
                if let Err(e) = s.persist_draft() {
                    log::warn!("Failed to save draft: {}", e);
                }
            });
        });
        // Replacing the handle drops the previous timer, which cancels it
        pending_save.set_value(Some(timeout));
    };

    let forms = LocalResource::new(|| async move { api::list_forms().await });

    Effect::new(move |_| {
        if let Some(result) = forms.get() {
            match result {
                Ok(list) => {
                    let loaded = session.try_update_value(|s| s.load_forms(list));
                    if let Some(Err(e)) = loaded {
                        log::error!("Failed to open form: {}", e);
                        load_error.set(Some(e.to_string()));
                    }
                    bump();
                    refresh_options();
                }
                Err(e) => {
                    log::error!("Failed to load forms: {}", e);
                    load_error.set(Some(e.to_string()));
                }
            }
        }
    });

    on_cleanup(move || persist_now());

    let on_change = Callback::new(move |(id, value): (String, AnswerValue)| {
        session.update_value(|s| s.set_answer(id, value));
        bump();
        schedule_save();
        refresh_options();
    });

    let on_toggle = Callback::new(move |(id, value, checked): (String, String, bool)| {
        session.update_value(|s| s.toggle_choice(&id, &value, checked));
        bump();
        schedule_save();
        refresh_options();
    });

    let on_select = move |ev: leptos::ev::Event| {
        let form_id = event_target_value(&ev);
        persist_now();
        let result = session.try_update_value(|s| s.select_form(&form_id));
        match result {
            Some(Err(e)) => {
                log::error!("Failed to open form '{}': {}", form_id, e);
                load_error.set(Some(e.to_string()));
            }
            _ => load_error.set(None),
        }
        bump();
        refresh_options();
    };

    let on_submit = move |_: leptos::ev::MouseEvent| {
        let prepared = session.with_value(|s| {
            let form_id = s.selected_form().map(|f| f.form_id.clone()).unwrap_or_default();
            s.prepare_submission().cloned().map(|answers| (form_id, answers))
        });
        match prepared {
            Err(FormError::Validation(errors)) => {
                alert(&format!("{}\n{}", locale.t(Message::ValidationFailed), errors.join("\n")));
            }
            Err(e) => alert(&e.to_string()),
            Ok((form_id, answers)) => {
                submitting.set(true);
                spawn_local(async move {
                    match api::submit(&answers).await {
                        Ok(()) => {
                            pending_save.set_value(None);
                            session.update_value(|s| {
                                if let Err(e) = s.complete_submission(&form_id, &answers) {
                                    log::warn!("Failed to clear draft: {}", e);
                                }
                            });
                            bump();
                            refresh_options();
                            alert(locale.t(Message::SubmitSuccess));
                        }
                        Err(e) => {
                            log::error!("Submission failed: {}", e);
                            alert(locale.t(Message::SubmitFailure));
                        }
                    }
                    submitting.set(false);
                });
            }
        }
    };

    view! {
        <div class="p-6 min-h-screen bg-gray-100 dark:bg-gray-800">
            {move || load_error.get().map(|e| view! {
                <div class="max-w-3xl mx-auto mb-4 bg-red-50 border border-red-200 rounded-lg p-4 text-red-800">
                    {e}
                </div>
            })}

            <Suspense fallback=move || view! {
                <div class="text-center py-8 text-gray-500 dark:text-gray-400">{locale.t(Message::Loading)}</div>
            }>
                {move || forms.get().map(|_| view! {
                    <div class="max-w-3xl mx-auto mb-4 flex items-center justify-between gap-4">
                        <h2 class="text-2xl font-bold text-gray-900 dark:text-gray-100">
                            {move || selected.get().map(|(_, title)| format!("{} {}", title, locale.t(Message::FormTitle)))}
                        </h2>
                        <select
                            class="rounded border border-gray-300 px-3 py-2 bg-white dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            prop:value=move || selected.get().map(|(id, _)| id).unwrap_or_default()
                            on:change=on_select
                        >
                            <For
                                each=move || form_list.get()
                                key=|(id, _)| id.clone()
                                children=move |(id, title)| {
                                    let option_id = id.clone();
                                    view! {
                                        <option
                                            value=id
                                            selected=move || selected.get().is_some_and(|(s, _)| s == option_id)
                                        >
                                            {title}
                                        </option>
                                    }
                                }
                            />
                        </select>
                    </div>

                    <DynamicForm nodes=nodes answers=answers on_change=on_change on_toggle=on_toggle />

                    <div class="max-w-3xl mx-auto mt-4 flex justify-end">
                        <button
                            class="px-6 py-2 rounded-md bg-indigo-600 text-white hover:bg-indigo-700 disabled:opacity-50"
                            disabled=move || submitting.get() || selected.get().is_none()
                            on:click=on_submit
                        >
                            {move || locale.t(Message::Submit)}
                        </button>
                    </div>
                })}
            </Suspense>
        </div>
    }
}
