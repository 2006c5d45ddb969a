//! Submitted applications table

use coverform::i18n::Message;
use coverform::table::{cell_text, SortOrder, SubmissionTable};
use leptos::prelude::*;

use crate::api;
use crate::components::pagination::Pagination;
use crate::context::use_locale;

#[component]
pub fn SubmissionsPage() -> impl IntoView {
    let locale = use_locale();
    let table = RwSignal::new(None::<SubmissionTable>);
    let load_error = RwSignal::new(None::<String>);

    let submissions = LocalResource::new(|| async move { api::list_submissions().await });

    Effect::new(move |_| {
        if let Some(result) = submissions.get() {
            match result {
                Ok(page) => table.set(Some(SubmissionTable::new(page))),
                Err(e) => {
                    log::error!("Failed to load submissions: {}", e);
                    load_error.set(Some(e.to_string()));
                }
            }
        }
    });

    let columns = Memo::new(move |_| {
        table.with(|t| {
            t.as_ref()
                .map(|t| {
                    t.columns()
                        .iter()
                        .map(|c| (c.clone(), t.is_visible(c)))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    });
    let visible = Memo::new(move |_| {
        table.with(|t| t.as_ref().map(|t| t.visible_columns().to_vec()).unwrap_or_default())
    });
    let rows = Memo::new(move |_| {
        table.with(|t| {
            t.as_ref()
                .map(|t| {
                    t.rows()
                        .into_iter()
                        .map(|row| {
                            let cells: Vec<String> = t.visible_columns().iter().map(|c| cell_text(row, c)).collect();
                            (row.id.clone(), cells)
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    });
    let sort = Memo::new(move |_| {
        table.with(|t| t.as_ref().and_then(|t| t.sort().map(|(c, o)| (c.to_string(), o))))
    });

    let page = Signal::derive(move || table.with(|t| t.as_ref().map(|t| t.page()).unwrap_or(0)));
    let total_pages = Signal::derive(move || table.with(|t| t.as_ref().map(|t| t.total_pages()).unwrap_or(0)));
    let has_previous = Signal::derive(move || table.with(|t| t.as_ref().is_some_and(|t| t.has_previous())));
    let has_next = Signal::derive(move || table.with(|t| t.as_ref().is_some_and(|t| t.has_next())));

    let update = move |f: &dyn Fn(&mut SubmissionTable)| {
        table.update(|t| {
            if let Some(t) = t.as_mut() {
                f(t);
            }
        })
    };

    view! {
        <div class="p-6 min-h-screen bg-gray-100 dark:bg-gray-800">
            <h2 class="text-2xl font-bold mb-6 text-gray-900 dark:text-gray-100">
                {move || locale.t(Message::SubmittedApps)}
            </h2>

            {move || load_error.get().map(|e| view! {
                <div class="mb-4 bg-red-50 border border-red-200 rounded-lg p-4 text-red-800">{e}</div>
            })}

            <Suspense fallback=move || view! {
                <div class="text-center py-8 text-gray-500 dark:text-gray-400">{locale.t(Message::Loading)}</div>
            }>
                {move || submissions.get().map(|_| view! {
                    <div class="mb-4 flex flex-wrap items-center gap-4">
                        <input
                            type="text"
                            class="rounded border border-gray-300 px-3 py-2 dark:bg-gray-700 dark:border-gray-600 dark:text-white"
                            placeholder=move || locale.t(Message::Search)
                            prop:value=move || table.with(|t| t.as_ref().map(|t| t.search().to_string()).unwrap_or_default())
                            on:input=move |ev| {
                                let query = event_target_value(&ev);
                                update(&|t| t.set_search(query.clone()));
                            }
                        />
                        <div class="flex flex-wrap items-center gap-3 dark:text-gray-200">
                            <span class="font-medium">{move || locale.t(Message::Columns)}</span>
                            <For
                                each=move || columns.get()
                                key=|(column, shown)| format!("{}:{}", column, shown)
                                children=move |(column, shown)| {
                                    let name = column.clone();
                                    view! {
                                        <label class="inline-flex items-center space-x-1 cursor-pointer">
                                            <input
                                                type="checkbox"
                                                class="form-checkbox text-indigo-600 dark:bg-gray-700"
                                                prop:checked=shown
                                                on:change=move |_| update(&|t| t.toggle_column(&name))
                                            />
                                            <span>{column}</span>
                                        </label>
                                    }
                                }
                            />
                        </div>
                    </div>

                    <div class="overflow-x-auto bg-white dark:bg-gray-900 rounded-lg shadow-md">
                        <table class="min-w-full divide-y divide-gray-200 dark:divide-gray-700">
                            <thead class="bg-gray-50 dark:bg-gray-800">
                                <tr>
                                    <For
                                        each=move || visible.get()
                                        key=|column| column.clone()
                                        children=move |column| {
                                            let name = column.clone();
                                            let arrow_for = column.clone();
                                            let arrow = move || match sort.get() {
                                                Some((c, SortOrder::Ascending)) if c == arrow_for => " ▲",
                                                Some((c, SortOrder::Descending)) if c == arrow_for => " ▼",
                                                _ => "",
                                            };
                                            view! {
                                                <th
                                                    class="px-4 py-3 text-start text-xs font-medium uppercase tracking-wider text-gray-500 dark:text-gray-300 cursor-pointer select-none"
                                                    on:click=move |_| update(&|t| t.sort_by(&name))
                                                >
                                                    {column} {arrow}
                                                </th>
                                            }
                                        }
                                    />
                                </tr>
                            </thead>
                            <tbody class="divide-y divide-gray-200 dark:divide-gray-700">
                                {move || {
                                    let current = rows.get();
                                    if current.is_empty() {
                                        let span = visible.with(|v| v.len().max(1));
                                        view! {
                                            <tr>
                                                <td colspan=span class="px-4 py-6 text-center text-gray-500 dark:text-gray-400">
                                                    {locale.t(Message::NoData)}
                                                </td>
                                            </tr>
                                        }.into_any()
                                    } else {
                                        current.into_iter().map(|(id, cells)| view! {
                                            <tr data-id=id class="hover:bg-gray-50 dark:hover:bg-gray-800">
                                                {cells.into_iter().map(|cell| view! {
                                                    <td class="px-4 py-3 whitespace-nowrap text-sm text-gray-900 dark:text-gray-200">{cell}</td>
                                                }).collect_view()}
                                            </tr>
                                        }).collect_view().into_any()
                                    }
                                }}
                            </tbody>
                        </table>
                    </div>

                    <Pagination
                        page=page
                        total_pages=total_pages
                        has_previous=has_previous
                        has_next=has_next
                        on_previous=Callback::new(move |_| update(&|t| t.previous_page()))
                        on_next=Callback::new(move |_| update(&|t| t.next_page()))
                    />
                })}
            </Suspense>
        </div>
    }
}
