//! Dynamic Form Renderer
//!
//! Draws the render tree produced by the form engine. The tree is flattened
//! into rows keyed by their structure (kind, options, enabled state), so an
//! input is only rebuilt when its shape changes. Values are bound through
//! `prop:` attributes and follow the answer map without rebuilding. Group
//! members are drawn as their own row list inside the group's fieldset.

use coverform::domain::{AnswerMap, AnswerValue};
use coverform::engine::{InputKind, RenderNode};
use coverform::i18n::Message;
use leptos::prelude::*;

use crate::context::use_locale;

// ============================================================================
// Rows
// ============================================================================

/// A render node placed in the flat row list
#[derive(Debug, Clone, PartialEq)]
pub struct FormRow {
    pub key: String,
    pub depth: usize,
    pub node: RenderNode,
}

/// Depth-first rows: a node, then its children. Group members stay with
/// the group and are flattened separately.
pub fn flatten_rows(nodes: &[RenderNode]) -> Vec<FormRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&RenderNode, usize)> = nodes.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }

        let options: Vec<&str> = node.options.iter().map(|o| o.value.as_str()).collect();
        let key = format!(
            "{}|{}|{}|{}",
            node.id,
            node.input.name(),
            node.disabled,
            options.join("\u{1f}")
        );

        let mut flat = node.clone();
        flat.members.clear();
        flat.children.clear();
        rows.push(FormRow { key, depth, node: flat });
    }

    rows
}

/// Node with `id` anywhere in the tree
pub fn find_node<'a>(nodes: &'a [RenderNode], id: &str) -> Option<&'a RenderNode> {
    let mut stack: Vec<&RenderNode> = nodes.iter().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.members.iter());
        stack.extend(node.children.iter());
    }
    None
}

const INPUT_CLASS: &str = "w-full rounded border border-gray-300 px-3 py-2 focus:outline-none focus:ring-2 focus:ring-indigo-500 dark:bg-gray-700 dark:border-gray-600 dark:text-white";

// ============================================================================
// Form
// ============================================================================

#[component]
pub fn DynamicForm(
    #[prop(into)] nodes: Signal<Vec<RenderNode>>,
    #[prop(into)] answers: Signal<AnswerMap>,
    /// Value change of a single-valued input
    on_change: Callback<(String, AnswerValue)>,
    /// Checkbox-group change: (field, option value, checked)
    on_toggle: Callback<(String, String, bool)>,
) -> impl IntoView {
    let rows = Memo::new(move |_| nodes.with(|n| flatten_rows(n)));

    view! {
        <form
            class="max-w-3xl mx-auto px-4 sm:px-6 py-6 bg-white dark:bg-gray-900 rounded-lg shadow-md"
            on:submit=|ev| ev.prevent_default()
        >
            <For
                each=move || rows.get()
                key=|row| row.key.clone()
                children=move |row| {
                    view! { <FieldRow row=row nodes=nodes answers=answers on_change=on_change on_toggle=on_toggle /> }
                }
            />
        </form>
    }
}

#[component]
fn FieldRow(
    row: FormRow,
    nodes: Signal<Vec<RenderNode>>,
    answers: Signal<AnswerMap>,
    on_change: Callback<(String, AnswerValue)>,
    on_toggle: Callback<(String, String, bool)>,
) -> impl IntoView {
    let FormRow { depth, node, .. } = row;
    let class = if depth > 0 {
        "mb-5 ps-4 border-s-2 border-dashed border-gray-300 dark:border-gray-600"
    } else {
        "mb-5"
    };
    let style = format!("margin-inline-start: {}rem", depth.saturating_sub(1));

    let show_label = !matches!(
        node.input,
        InputKind::CheckboxGroup | InputKind::Toggle | InputKind::Group
    );
    let label = show_label.then(|| {
        view! {
            <label for=node.id.clone() class="block mb-1 font-medium text-gray-700 dark:text-gray-300">
                {node.label.clone()} " "
                {node.required.then(|| view! { <span class="text-red-500">"*"</span> })}
            </label>
        }
    });

    view! {
        <div class=class style=style>
            {label}
            {field_input(node, nodes, answers, on_change, on_toggle)}
        </div>
    }
}

fn field_input(
    node: RenderNode,
    nodes: Signal<Vec<RenderNode>>,
    answers: Signal<AnswerMap>,
    on_change: Callback<(String, AnswerValue)>,
    on_toggle: Callback<(String, String, bool)>,
) -> AnyView {
    let id = node.id.clone();
    let text_value = {
        let id = id.clone();
        move || answers.with(|a| a.text(&id).unwrap_or_default().to_string())
    };

    match node.input {
        InputKind::Text | InputKind::Number | InputKind::Date => {
            let input_type = node.input.name();
            let (min, max) = node
                .validation
                .as_ref()
                .map(|v| (v.min.map(|m| m.to_string()), v.max.map(|m| m.to_string())))
                .unwrap_or_default();
            let pattern = node.validation.as_ref().and_then(|v| v.pattern.clone());
            view! {
                <input
                    type=input_type
                    id=id.clone()
                    required=node.required
                    min=min
                    max=max
                    pattern=pattern
                    class=INPUT_CLASS
                    prop:value=text_value
                    on:input=move |ev| on_change.run((id.clone(), AnswerValue::Text(event_target_value(&ev))))
                />
            }
            .into_any()
        }
        InputKind::Textarea => view! {
            <textarea
                id=id.clone()
                required=node.required
                class=format!("{} resize-y min-h-[80px]", INPUT_CLASS)
                prop:value=text_value
                on:input=move |ev| on_change.run((id.clone(), AnswerValue::Text(event_target_value(&ev))))
            />
        }
        .into_any(),
        InputKind::Select => select_input(node, answers, on_change),
        InputKind::Radio => {
            let options = node.options.into_iter().map(|opt| {
                let id = id.clone();
                let name = id.clone();
                let value = opt.value.clone();
                let checked = {
                    let id = id.clone();
                    let value = value.clone();
                    move || answers.with(|a| a.text(&id) == Some(value.as_str()))
                };
                view! {
                    <label class="inline-flex items-center space-x-2 me-4 cursor-pointer dark:text-white">
                        <input
                            type="radio"
                            name=name
                            value=value.clone()
                            class="form-radio text-indigo-600 dark:bg-gray-700"
                            prop:checked=checked
                            on:change=move |_| on_change.run((id.clone(), AnswerValue::Text(value.clone())))
                        />
                        <span>{opt.label}</span>
                    </label>
                }
            }).collect_view();
            view! { <div class="space-y-2">{options}</div> }.into_any()
        }
        InputKind::Toggle => {
            let checked = {
                let id = id.clone();
                move || answers.with(|a| a.get(&id).and_then(AnswerValue::as_flag).unwrap_or(false))
            };
            view! {
                <label class="inline-flex items-center space-x-2 cursor-pointer dark:text-white">
                    <input
                        type="checkbox"
                        id=id.clone()
                        class="form-checkbox text-indigo-600 dark:bg-gray-700"
                        prop:checked=checked
                        on:change=move |ev| on_change.run((id.clone(), AnswerValue::Flag(event_target_checked(&ev))))
                    />
                    <span>{node.label}</span>
                    {node.required.then(|| view! { <span class="text-red-500">"*"</span> })}
                </label>
            }
            .into_any()
        }
        InputKind::CheckboxGroup => {
            let options = node.options.into_iter().map(|opt| {
                let id = id.clone();
                let value = opt.value.clone();
                let checked = {
                    let id = id.clone();
                    let value = value.clone();
                    move || answers.with(|a| {
                        a.get(&id)
                            .and_then(AnswerValue::as_choices)
                            .is_some_and(|c| c.contains(&value))
                    })
                };
                view! {
                    <label class="inline-flex items-center space-x-2 me-4 cursor-pointer dark:text-white">
                        <input
                            type="checkbox"
                            value=value.clone()
                            class="form-checkbox text-indigo-600 dark:bg-gray-700"
                            prop:checked=checked
                            on:change=move |ev| on_toggle.run((id.clone(), value.clone(), event_target_checked(&ev)))
                        />
                        <span>{opt.label}</span>
                    </label>
                }
            }).collect_view();
            view! {
                <fieldset>
                    <legend class="mb-1 font-medium text-gray-700 dark:text-gray-300">
                        {node.label} " "
                        {node.required.then(|| view! { <span class="text-red-500">"*"</span> })}
                    </legend>
                    <div class="space-y-2">{options}</div>
                </fieldset>
            }
            .into_any()
        }
        InputKind::Group => {
            let members = Memo::new(move |_| {
                nodes.with(|n| find_node(n, &id).map(|g| flatten_rows(&g.members)).unwrap_or_default())
            });
            view! {
                <fieldset class="rounded-lg border border-gray-300 dark:border-gray-600 p-4">
                    <legend class="px-2 font-semibold text-lg text-gray-900 dark:text-gray-100">{node.label}</legend>
                    <For
                        each=move || members.get()
                        key=|row| row.key.clone()
                        children=move |row| {
                            view! { <FieldRow row=row nodes=nodes answers=answers on_change=on_change on_toggle=on_toggle /> }
                        }
                    />
                </fieldset>
            }
            .into_any()
        }
        InputKind::Error(message) => view! {
            <p class="text-red-600 dark:text-red-400">{message}</p>
        }
        .into_any(),
    }
}

fn select_input(
    node: RenderNode,
    answers: Signal<AnswerMap>,
    on_change: Callback<(String, AnswerValue)>,
) -> AnyView {
    let locale = use_locale();
    let id = node.id.clone();
    let disabled = node.disabled;
    let current = {
        let id = id.clone();
        move || answers.with(|a| a.text(&id).unwrap_or_default().to_string())
    };

    let options = node.options.into_iter().map(|opt| {
        let current = current.clone();
        let value = opt.value.clone();
        view! {
            <option value=opt.value selected=move || current() == value>{opt.label}</option>
        }
    }).collect_view();

    view! {
        <select
            id=id.clone()
            required=node.required
            disabled=disabled
            class=format!(
                "{} bg-white {}",
                INPUT_CLASS,
                if disabled { "opacity-50 cursor-not-allowed" } else { "" }
            )
            prop:value=current.clone()
            on:change=move |ev| on_change.run((id.clone(), AnswerValue::Text(event_target_value(&ev))))
        >
            <option value="">
                {move || if disabled { "...".to_string() } else { locale.t(Message::SelectPlaceholder).to_string() }}
            </option>
            {options}
        </select>
    }
    .into_any()
}
