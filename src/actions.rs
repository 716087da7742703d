//! The three user-triggered operations, each a straight-line async sequence
//! against a [`MindmapBackend`] that reports progress through a [`Store`].
//!
//! Every operation refuses to start while its own previous run is pending.
//! Generate and save do not exclude each other.

use crate::api::MindmapBackend;
use crate::config::copy;
use crate::state::{Action, Store};

pub async fn submit_generation<B, S>(backend: &B, store: &S)
where
    B: MindmapBackend + ?Sized,
    S: Store + ?Sized,
{
    let state = store.snapshot();
    if state.generating {
        log::debug!("generation already in flight");
        return;
    }

    let request = match state.form.to_request() {
        Ok(request) => request,
        Err(err) => {
            log::warn!("generation form rejected: {err}");
            store.dispatch(Action::GenerationRejected(err));
            return;
        }
    };

    log::info!(
        "generating mindmap with {} ({})",
        request.provider,
        request.model
    );
    store.dispatch(Action::GenerateStarted {
        provider: request.provider.clone(),
        model: request.model.clone(),
    });

    match backend.generate(&request).await {
        Ok(message) => {
            store.dispatch(Action::GenerateAccepted);
            reload_editor(backend, store).await;
            let message =
                message.unwrap_or_else(|| copy::generated(&request.provider, &request.model));
            store.dispatch(Action::GenerateFinished { message });
        }
        Err(err) => {
            log::error!("generation failed: {err}");
            store.dispatch(Action::GenerateFailed(err));
        }
    }
}

/// Pull the current plain markdown into the editor.
pub async fn load_editor<B, S>(backend: &B, store: &S)
where
    B: MindmapBackend + ?Sized,
    S: Store + ?Sized,
{
    if store.snapshot().loading {
        log::debug!("editor load already in flight");
        return;
    }
    reload_editor(backend, store).await;
}

async fn reload_editor<B, S>(backend: &B, store: &S)
where
    B: MindmapBackend + ?Sized,
    S: Store + ?Sized,
{
    store.dispatch(Action::LoadStarted);
    match backend.fetch_plain_markdown().await {
        Ok(Some(markdown)) => {
            log::info!("loaded {} bytes of markdown", markdown.len());
            store.dispatch(Action::LoadSucceeded(markdown));
        }
        Ok(None) => {
            log::info!("no markdown on the server yet");
            store.dispatch(Action::LoadEmpty);
        }
        Err(err) => {
            log::error!("failed to load markdown: {err}");
            store.dispatch(Action::LoadFailed(err));
        }
    }
}

pub async fn save_editor<B, S>(backend: &B, store: &S)
where
    B: MindmapBackend + ?Sized,
    S: Store + ?Sized,
{
    let state = store.snapshot();
    if state.saving || state.loading {
        log::debug!("save ignored while editor is busy");
        return;
    }
    if state.editor.trim().is_empty() {
        store.dispatch(Action::SaveSkipped);
        return;
    }

    store.dispatch(Action::SaveStarted);
    match backend.save_markdown(&state.editor).await {
        Ok(message) => {
            log::info!("saved {} bytes of markdown", state.editor.len());
            store.dispatch(Action::SaveSucceeded(message));
        }
        Err(err) => {
            log::error!("save failed: {err}");
            store.dispatch(Action::SaveFailed(err));
        }
    }
}

/// Mount-time sync: pick up whatever the server already has and make sure the
/// viewer is not showing a cached document from an earlier session.
pub async fn initialize<B, S>(backend: &B, store: &S)
where
    B: MindmapBackend + ?Sized,
    S: Store + ?Sized,
{
    load_editor(backend, store).await;
    store.dispatch(Action::RefreshViewer);
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::api::GenerationRequest;
    use crate::error::ApiError;
    use crate::state::AppState;
    use crate::status::{Status, StatusKind};

    struct CellStore(RefCell<AppState>);

    impl CellStore {
        fn new() -> Self {
            Self(RefCell::new(AppState::new(100)))
        }

        fn with(actions: impl IntoIterator<Item = Action>) -> Self {
            let store = Self::new();
            for action in actions {
                store.dispatch(action);
            }
            store
        }
    }

    impl Store for CellStore {
        fn snapshot(&self) -> AppState {
            self.0.borrow().clone()
        }

        fn dispatch(&self, action: Action) {
            let next = self.0.borrow().reduce(action);
            *self.0.borrow_mut() = next;
        }
    }

    #[derive(Default)]
    struct ScriptedBackend {
        generate_replies: RefCell<VecDeque<Result<Option<String>, ApiError>>>,
        markdown_replies: RefCell<VecDeque<Result<Option<String>, ApiError>>>,
        save_replies: RefCell<VecDeque<Result<Option<String>, ApiError>>>,
        generated: RefCell<Vec<GenerationRequest>>,
        saved: RefCell<Vec<String>>,
        fetches: Cell<usize>,
    }

    impl ScriptedBackend {
        fn on_generate(self, reply: Result<Option<String>, ApiError>) -> Self {
            self.generate_replies.borrow_mut().push_back(reply);
            self
        }

        fn on_fetch(self, reply: Result<Option<String>, ApiError>) -> Self {
            self.markdown_replies.borrow_mut().push_back(reply);
            self
        }

        fn on_save(self, reply: Result<Option<String>, ApiError>) -> Self {
            self.save_replies.borrow_mut().push_back(reply);
            self
        }

        fn calls(&self) -> usize {
            self.generated.borrow().len() + self.saved.borrow().len() + self.fetches.get()
        }
    }

    #[async_trait(?Send)]
    impl MindmapBackend for ScriptedBackend {
        async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ApiError> {
            self.generated.borrow_mut().push(request.clone());
            self.generate_replies
                .borrow_mut()
                .pop_front()
                .expect("unexpected generate call")
        }

        async fn fetch_plain_markdown(&self) -> Result<Option<String>, ApiError> {
            self.fetches.set(self.fetches.get() + 1);
            self.markdown_replies
                .borrow_mut()
                .pop_front()
                .expect("unexpected fetch call")
        }

        async fn save_markdown(&self, content: &str) -> Result<Option<String>, ApiError> {
            self.saved.borrow_mut().push(content.to_string());
            self.save_replies
                .borrow_mut()
                .pop_front()
                .expect("unexpected save call")
        }
    }

    fn filled(book: &str, author: &str) -> CellStore {
        CellStore::with([
            Action::SetBookName(book.into()),
            Action::SetAuthorName(author.into()),
        ])
    }

    #[test]
    fn blank_names_never_reach_the_network() {
        for (book, author) in [("", "James Clear"), ("Atomic Habits", "  "), ("", "")] {
            let backend = ScriptedBackend::default();
            let store = filled(book, author);
            block_on(submit_generation(&backend, &store));

            assert_eq!(backend.calls(), 0);
            let state = store.snapshot();
            assert_eq!(state.status.kind, StatusKind::Error);
            assert_eq!(state.status.message, copy::MISSING_FIELDS);
            assert!(!state.generating);
        }
    }

    #[test]
    fn generation_scenario_reloads_editor_and_viewer() {
        let backend = ScriptedBackend::default()
            .on_generate(Ok(Some("ok".into())))
            .on_fetch(Ok(Some("## Habits".into())));
        let store = filled("Atomic Habits", "James Clear");
        store.dispatch(Action::SelectProvider("OpenAI".into()));
        let before = store.snapshot();

        block_on(submit_generation(&backend, &store));

        let sent = backend.generated.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].provider, "OpenAI");
        assert_eq!(sent[0].model, "gpt-4o-mini");
        assert_eq!(sent[0].book_name, "Atomic Habits");
        assert_eq!(backend.fetches.get(), 1);

        let after = store.snapshot();
        assert_eq!(after.editor, "## Habits");
        assert_eq!(after.status, Status::success("ok"));
        assert_ne!(after.refresh_token, before.refresh_token);
        assert!(!after.generating);
        assert!(!after.loading);
    }

    #[test]
    fn generation_without_server_message_uses_fallback() {
        let backend = ScriptedBackend::default()
            .on_generate(Ok(None))
            .on_fetch(Ok(None));
        let store = filled("Dune", "Frank Herbert");
        block_on(submit_generation(&backend, &store));

        let state = store.snapshot();
        assert_eq!(
            state.status,
            Status::success("Mindmap generated with DeepSeek (deepseek-chat)! View updated.")
        );
        assert_eq!(state.editor, "");
    }

    #[test]
    fn failed_generation_changes_nothing_but_status() {
        let backend = ScriptedBackend::default()
            .on_generate(Err(ApiError::Transport("connection refused".into())));
        let store = filled("Dune", "Frank Herbert");
        store.dispatch(Action::EditMarkdown("# Mine".into()));
        let before = store.snapshot();

        block_on(submit_generation(&backend, &store));

        let after = store.snapshot();
        assert_eq!(backend.fetches.get(), 0);
        assert_eq!(after.editor, before.editor);
        assert_eq!(after.refresh_token, before.refresh_token);
        assert_eq!(
            after.status,
            Status::error("Generation failed: Request failed: connection refused")
        );
        assert!(!after.generating);
    }

    #[test]
    fn generation_is_not_reentrant() {
        let backend = ScriptedBackend::default();
        let store = filled("Dune", "Frank Herbert");
        store.dispatch(Action::GenerateStarted {
            provider: "DeepSeek".into(),
            model: "deepseek-chat".into(),
        });
        block_on(submit_generation(&backend, &store));
        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn load_not_found_is_informational() {
        let backend = ScriptedBackend::default().on_fetch(Ok(None));
        let store = CellStore::with([Action::EditMarkdown("old".into())]);
        block_on(load_editor(&backend, &store));

        let state = store.snapshot();
        assert_eq!(state.editor, "");
        assert_eq!(state.status, Status::info(copy::NOTHING_TO_LOAD));
        assert!(!state.loading);
    }

    #[test]
    fn load_not_found_keeps_prior_error() {
        let backend = ScriptedBackend::default().on_fetch(Ok(None));
        let store = CellStore::with([Action::SaveFailed(ApiError::Rejected("disk full".into()))]);
        block_on(load_editor(&backend, &store));
        assert_eq!(store.snapshot().status, Status::error("disk full"));
    }

    #[test]
    fn load_success_defers_to_existing_success() {
        let backend = ScriptedBackend::default().on_fetch(Ok(Some("# Root".into())));
        let store = CellStore::with([Action::SaveSucceeded(Some("saved".into()))]);
        block_on(load_editor(&backend, &store));

        let state = store.snapshot();
        assert_eq!(state.editor, "# Root");
        assert_eq!(state.status, Status::success("saved"));
    }

    #[test]
    fn load_skipped_while_already_loading() {
        let backend = ScriptedBackend::default();
        let store = CellStore::with([Action::LoadStarted]);
        block_on(load_editor(&backend, &store));
        assert_eq!(backend.fetches.get(), 0);
    }

    #[test]
    fn blank_editor_is_not_saved() {
        let backend = ScriptedBackend::default();
        let store = CellStore::with([Action::EditMarkdown("  \n ".into())]);
        block_on(save_editor(&backend, &store));

        assert_eq!(backend.calls(), 0);
        assert_eq!(store.snapshot().status, Status::info(copy::NOTHING_TO_SAVE));
    }

    #[test]
    fn save_skipped_while_saving() {
        let backend = ScriptedBackend::default();
        let store = CellStore::with([Action::EditMarkdown("# Root".into()), Action::SaveStarted]);
        block_on(save_editor(&backend, &store));
        assert_eq!(backend.calls(), 0);
        assert!(store.snapshot().saving);
    }

    #[test]
    fn save_skipped_while_loading() {
        let backend = ScriptedBackend::default();
        let store = CellStore::with([Action::EditMarkdown("# Root".into()), Action::LoadStarted]);
        let before = store.snapshot();
        block_on(save_editor(&backend, &store));
        assert_eq!(backend.calls(), 0);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn transport_failures_name_the_action() {
        let backend = ScriptedBackend::default()
            .on_save(Err(ApiError::Transport("connection reset".into())));
        let store = CellStore::with([Action::EditMarkdown("# Root".into())]);
        block_on(save_editor(&backend, &store));
        assert_eq!(
            store.snapshot().status,
            Status::error("Save failed: Request failed: connection reset")
        );
    }

    #[test]
    fn successful_save_refreshes_viewer_only() {
        let backend = ScriptedBackend::default().on_save(Ok(Some("Saved!".into())));
        let store = CellStore::with([Action::EditMarkdown("# Root\n## Leaf\n".into())]);
        let before = store.snapshot();

        block_on(save_editor(&backend, &store));

        let after = store.snapshot();
        assert_eq!(backend.saved.borrow().as_slice(), ["# Root\n## Leaf\n"]);
        assert_eq!(after.editor, "# Root\n## Leaf\n");
        assert_ne!(after.refresh_token, before.refresh_token);
        assert_eq!(after.status, Status::success("Saved!"));
        assert!(!after.saving);
    }

    #[test]
    fn rejected_save_keeps_user_edits() {
        let backend =
            ScriptedBackend::default().on_save(Err(ApiError::Rejected("disk full".into())));
        let store = CellStore::with([Action::EditMarkdown("# Unsaved work".into())]);
        let before = store.snapshot();

        block_on(save_editor(&backend, &store));

        let after = store.snapshot();
        assert_eq!(after.status.message, "disk full");
        assert_eq!(after.status.kind, StatusKind::Error);
        assert_eq!(after.editor, "# Unsaved work");
        assert_eq!(after.refresh_token, before.refresh_token);
    }

    #[test]
    fn initialize_loads_and_refreshes_viewer() {
        let backend = ScriptedBackend::default().on_fetch(Ok(Some("# Existing".into())));
        let store = CellStore::new();
        let before = store.snapshot();

        block_on(initialize(&backend, &store));

        let after = store.snapshot();
        assert_eq!(after.editor, "# Existing");
        assert_eq!(after.status, Status::success(copy::LOADED));
        assert_eq!(after.refresh_token, before.refresh_token.advance());
    }
}
