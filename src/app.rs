use std::sync::Arc;

use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions;
use crate::api::HttpBackend;
use crate::config::{Endpoints, PROVIDERS};
use crate::highlight::highlight_mindmap_markdown;
use crate::state::{Action, AppState, Store};
use crate::status::StatusKind;

const FIELD_STYLE: &str = "width: 100%; padding: 10px; box-sizing: border-box; border-radius: var(--radius-md); border: 1px solid var(--border-color); background: var(--bg-primary); color: var(--text-primary);";
const LABEL_STYLE: &str = "display: block; margin-bottom: 5px; font-weight: 600;";
const EDITOR_LAYER_STYLE: &str = "position: absolute; top: 0; left: 0; width: 100%; height: 100%; padding: 10px; margin: 0; font-family: var(--font-editor); font-size: 0.9em; line-height: 1.5; white-space: pre-wrap; word-wrap: break-word; box-sizing: border-box;";

fn banner_style(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Error => "border-color: #f5c6cb; background: #f8d7da; color: #721c24;",
        StatusKind::Success => "border-color: #c3e6cb; background: #d4edda; color: #155724;",
        StatusKind::Info => "border-color: #bee5eb; background: #d1ecf1; color: #0c5460;",
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Seeds only; both counters advance on their own from here.
    let seed = js_sys::Date::now() as u64;
    let endpoints = Endpoints::same_origin();
    let backend = Arc::new(HttpBackend::new(endpoints, seed));
    let state = RwSignal::new(AppState::new(seed));

    let form = Memo::new(move |_| state.with(|s| s.form.clone()));
    let models = Memo::new(move |_| form.with(|f| f.models()));
    let generating = Memo::new(move |_| state.with(|s| s.generating));
    let loading = Memo::new(move |_| state.with(|s| s.loading));
    let saving = Memo::new(move |_| state.with(|s| s.saving));
    let can_generate = Memo::new(move |_| state.with(AppState::can_generate));
    let can_load = Memo::new(move |_| state.with(AppState::can_load));
    let can_save = Memo::new(move |_| state.with(AppState::can_save));
    let editor_locked = Memo::new(move |_| state.with(AppState::editor_locked));
    let status = Memo::new(move |_| state.with(|s| s.status.clone()));
    let editor = Memo::new(move |_| state.with(|s| s.editor.clone()));
    let highlighted = Memo::new(move |_| editor.with(|text| highlight_mindmap_markdown(text)));
    let viewer_url = Memo::new(move |_| state.with(|s| s.viewer_url(&endpoints)));

    let (scroll_top, set_scroll_top) = signal(0);

    {
        let backend = backend.clone();
        Effect::new(move |_| {
            let backend = backend.clone();
            spawn_local(async move {
                actions::initialize(backend.as_ref(), &state).await;
            });
        });
    }

    let on_generate = {
        let backend = backend.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            let backend = backend.clone();
            spawn_local(async move {
                actions::submit_generation(backend.as_ref(), &state).await;
            });
        }
    };

    let on_load = {
        let backend = backend.clone();
        move |_: MouseEvent| {
            let backend = backend.clone();
            spawn_local(async move {
                actions::load_editor(backend.as_ref(), &state).await;
            });
        }
    };

    let on_save = move |_: MouseEvent| {
        let backend = backend.clone();
        spawn_local(async move {
            actions::save_editor(backend.as_ref(), &state).await;
        });
    };

    view! {
        <main class="app-layout" style="display: flex; height: 100vh; width: 100vw; background: var(--bg-primary); color: var(--text-primary); font-family: var(--font-ui);">
            <section class="control-pane" style="width: 40%; min-width: 450px; padding: 20px; border-right: 1px solid var(--border-color); overflow-y: auto; display: flex; flex-direction: column; box-sizing: border-box;">
                <h1 style="flex-shrink: 0; margin-top: 0;">"Mindmap Generator & Editor"</h1>

                <form
                    on:submit=on_generate
                    style="margin-bottom: 20px; padding: 15px; border: 1px solid var(--border-color); border-radius: var(--radius-md); background: var(--bg-secondary); flex-shrink: 0;"
                >
                    <div style="margin-bottom: 15px;">
                        <label for="provider-select" style=LABEL_STYLE>"LLM Provider:"</label>
                        <select
                            id="provider-select"
                            style=FIELD_STYLE
                            disabled=move || generating.get()
                            on:change=move |ev| state.dispatch(Action::SelectProvider(event_target_value(&ev)))
                        >
                            {PROVIDERS.iter().map(|provider| {
                                let name = provider.name;
                                view! {
                                    <option value=name prop:selected=move || form.with(|f| f.provider == name)>
                                        {name}
                                    </option>
                                }
                            }).collect::<Vec<_>>()}
                        </select>
                    </div>
                    <div style="margin-bottom: 15px;">
                        <label for="model-select" style=LABEL_STYLE>"Model:"</label>
                        <select
                            id="model-select"
                            style=FIELD_STYLE
                            disabled=move || generating.get()
                            on:change=move |ev| state.dispatch(Action::SelectModel(event_target_value(&ev)))
                        >
                            {move || models.get().iter().map(|&model| {
                                view! {
                                    <option value=model prop:selected=move || form.with(|f| f.model == model)>
                                        {model}
                                    </option>
                                }
                            }).collect::<Vec<_>>()}
                        </select>
                    </div>
                    <div style="margin-bottom: 15px;">
                        <label for="book-name" style=LABEL_STYLE>"Book Name:"</label>
                        <input
                            id="book-name"
                            type="text"
                            placeholder="e.g., Atomic Habits"
                            style=FIELD_STYLE
                            required
                            disabled=move || generating.get()
                            prop:value=move || form.with(|f| f.book_name.clone())
                            on:input=move |ev| state.dispatch(Action::SetBookName(event_target_value(&ev)))
                        />
                    </div>
                    <div style="margin-bottom: 15px;">
                        <label for="author-name" style=LABEL_STYLE>"Author Name:"</label>
                        <input
                            id="author-name"
                            type="text"
                            placeholder="e.g., James Clear"
                            style=FIELD_STYLE
                            required
                            disabled=move || generating.get()
                            prop:value=move || form.with(|f| f.author_name.clone())
                            on:input=move |ev| state.dispatch(Action::SetAuthorName(event_target_value(&ev)))
                        />
                    </div>
                    <button
                        type="submit"
                        disabled=move || !can_generate.get()
                        style=move || format!(
                            "padding: 10px 15px; border: none; border-radius: var(--radius-md); color: white; font-size: 1rem; cursor: {}; background: {};",
                            if can_generate.get() { "pointer" } else { "not-allowed" },
                            if generating.get() { "#ccc" } else { "var(--accent-color)" },
                        )
                    >
                        {move || if generating.get() { "Generating..." } else { "Generate Mindmap" }}
                    </button>
                </form>

                {move || {
                    let current = status.get();
                    (!current.message.is_empty()).then(|| view! {
                        <div
                            class=format!("status-message {}", current.kind.as_str())
                            style=format!("padding: 12px; margin-bottom: 15px; border-radius: var(--radius-md); border: 1px solid; flex-shrink: 0; {}", banner_style(current.kind))
                        >
                            {current.message}
                        </div>
                    })
                }}

                <hr style="margin: 20px 0; flex-shrink: 0; border: none; border-top: 1px solid var(--border-color);" />

                <div class="edit-section" style="flex-grow: 1; display: flex; flex-direction: column; min-height: 300px;">
                    <h2 style="flex-shrink: 0; margin: 0 0 10px 0;">"Edit Mindmap Markdown (Plain Text)"</h2>
                    <div class="edit-buttons" style="margin-bottom: 10px; flex-shrink: 0; display: flex; gap: 10px;">
                        <button
                            on:click=on_load
                            disabled=move || !can_load.get()
                            style=move || format!("padding: 8px 12px; cursor: {};", if can_load.get() { "pointer" } else { "wait" })
                        >
                            {move || if loading.get() { "Loading..." } else { "Load/Refresh Editor" }}
                        </button>
                        <button
                            on:click=on_save
                            disabled=move || !can_save.get()
                            style=move || format!(
                                "padding: 8px 12px; border: none; color: white; cursor: {}; background: {};",
                                if can_save.get() { "pointer" } else { "not-allowed" },
                                if editor_locked.get() { "#ccc" } else { "#28a745" },
                            )
                        >
                            {move || if saving.get() { "Saving..." } else { "Save & Re-Convert" }}
                        </button>
                    </div>
                    <div class="editor-container" style="flex-grow: 1; position: relative; overflow: hidden; border: 1px solid var(--border-color); border-radius: var(--radius-md); background: var(--bg-primary);">
                        <div
                            class="markdown-highlight-layer"
                            style=format!("{EDITOR_LAYER_STYLE} color: var(--text-primary); pointer-events: none; overflow-y: hidden;")
                            inner_html=move || highlighted.get()
                            prop:scrollTop=move || scroll_top.get()
                        ></div>
                        <textarea
                            id="md-editor"
                            class="raw-editor"
                            style=format!("{EDITOR_LAYER_STYLE} color: transparent; background: transparent; caret-color: var(--text-primary); outline: none; border: none; resize: none; overflow-y: auto;")
                            placeholder="Load or edit PLAIN Markdown content here... (Fences ```markdown ... ``` are handled by the server on save/generate)"
                            spellcheck="false"
                            disabled=move || editor_locked.get()
                            prop:value=move || editor.get()
                            on:input=move |ev| state.dispatch(Action::EditMarkdown(event_target_value(&ev)))
                            on:scroll=move |ev| {
                                let target: web_sys::Element = event_target(&ev);
                                set_scroll_top.set(target.scroll_top());
                            }
                        ></textarea>
                    </div>
                </div>
            </section>

            <section class="viewer-pane" style="width: 60%; height: 100vh; overflow: hidden;">
                // A fresh element per token, so the browser can't hand back the old frame.
                {move || {
                    let url = viewer_url.get();
                    log::debug!("mounting viewer at {url}");
                    view! {
                        <iframe
                            src=url
                            title="Interactive Mindmap Preview"
                            style="width: 100%; height: 100%; border: none;"
                        >
                            "Your browser doesn't support iframes. The mindmap cannot be displayed here."
                        </iframe>
                    }
                }}
            </section>
        </main>
    }
}
