use leptos::prelude::*;

use crate::api::GenerationRequest;
use crate::config::{self, copy, Endpoints};
use crate::error::{ApiError, FormError};
use crate::status::{Status, StatusKind};

/// Opaque value baked into the viewer URL. Every advance yields a value the
/// viewer has never been loaded with during this session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RefreshToken(u64);

impl RefreshToken {
    pub fn seeded(seed: u64) -> Self {
        Self(seed)
    }

    pub fn advance(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationForm {
    pub provider: String,
    pub model: String,
    pub book_name: String,
    pub author_name: String,
}

impl Default for GenerationForm {
    fn default() -> Self {
        let provider = config::default_provider();
        Self {
            provider: provider.name.to_string(),
            model: provider.default_model().to_string(),
            book_name: String::new(),
            author_name: String::new(),
        }
    }
}

impl GenerationForm {
    pub fn is_complete(&self) -> bool {
        !self.book_name.trim().is_empty() && !self.author_name.trim().is_empty()
    }

    pub fn models(&self) -> &'static [&'static str] {
        config::find_provider(&self.provider)
            .map(|p| p.models)
            .unwrap_or_default()
    }

    pub fn to_request(&self) -> Result<GenerationRequest, FormError> {
        if !self.is_complete() {
            return Err(FormError::MissingFields);
        }
        let provider = config::find_provider(&self.provider)
            .ok_or_else(|| FormError::UnknownProvider(self.provider.clone()))?;
        if !provider.offers(&self.model) {
            return Err(FormError::UnknownModel {
                provider: self.provider.clone(),
                model: self.model.clone(),
            });
        }
        Ok(GenerationRequest {
            book_name: self.book_name.trim().to_string(),
            author_name: self.author_name.trim().to_string(),
            provider: provider.name.to_string(),
            model: self.model.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    pub form: GenerationForm,
    /// Plain markdown as the user last left it.
    pub editor: String,
    pub status: Status,
    pub refresh_token: RefreshToken,
    pub generating: bool,
    pub loading: bool,
    pub saving: bool,
}

impl AppState {
    pub fn new(refresh_seed: u64) -> Self {
        Self {
            form: GenerationForm::default(),
            editor: String::new(),
            status: Status::info(copy::APP_LOADED),
            refresh_token: RefreshToken::seeded(refresh_seed),
            generating: false,
            loading: false,
            saving: false,
        }
    }

    pub fn can_generate(&self) -> bool {
        !self.generating && self.form.is_complete()
    }

    pub fn can_load(&self) -> bool {
        !self.loading && !self.saving
    }

    pub fn can_save(&self) -> bool {
        !self.loading && !self.saving && !self.editor.trim().is_empty()
    }

    pub fn editor_locked(&self) -> bool {
        self.loading || self.saving
    }

    pub fn viewer_url(&self, endpoints: &Endpoints) -> String {
        endpoints.viewer(self.refresh_token.value())
    }

    /// Produce the next snapshot. The only place state changes.
    pub fn reduce(&self, action: Action) -> AppState {
        let mut next = self.clone();
        match action {
            Action::SelectProvider(name) => match config::find_provider(&name) {
                Some(provider) => {
                    next.form.provider = provider.name.to_string();
                    next.form.model = provider.default_model().to_string();
                }
                None => log::warn!("ignoring unknown provider {name:?}"),
            },
            Action::SelectModel(model) => {
                if next.form.models().contains(&model.as_str()) {
                    next.form.model = model;
                } else {
                    log::warn!("ignoring model {model:?} for {}", next.form.provider);
                }
            }
            Action::SetBookName(text) => next.form.book_name = text,
            Action::SetAuthorName(text) => next.form.author_name = text,
            Action::EditMarkdown(text) => next.editor = text,

            Action::GenerationRejected(err) => next.status = Status::error(err.to_string()),
            Action::GenerateStarted { provider, model } => {
                next.generating = true;
                next.status = Status::info(copy::generating(&provider, &model));
            }
            Action::GenerateAccepted => next.status = Status::success(copy::GENERATED_RELOADING),
            Action::GenerateFailed(err) => {
                next.generating = false;
                next.status = Status::error(err.banner("Generation"));
            }
            Action::GenerateFinished { message } => {
                next.generating = false;
                next.refresh_token = next.refresh_token.advance();
                // A failed reload of the editor is the more useful thing to show.
                if next.status.kind != StatusKind::Error {
                    next.status = Status::success(message);
                }
            }

            Action::LoadStarted => next.loading = true,
            Action::LoadSucceeded(markdown) => {
                next.loading = false;
                next.editor = markdown;
                next.status = next.status.reconcile(Status::success(copy::LOADED));
            }
            Action::LoadEmpty => {
                next.loading = false;
                next.editor.clear();
                next.status = next.status.reconcile(Status::info(copy::NOTHING_TO_LOAD));
            }
            Action::LoadFailed(err) => {
                next.loading = false;
                next.editor.clear();
                next.status = Status::error(format!(
                    "Failed to load mindmap content for editor: {err}"
                ));
            }

            Action::SaveSkipped => next.status = Status::info(copy::NOTHING_TO_SAVE),
            Action::SaveStarted => {
                next.saving = true;
                next.status = Status::info(copy::SAVING);
            }
            Action::SaveSucceeded(message) => {
                next.saving = false;
                next.refresh_token = next.refresh_token.advance();
                next.status = Status::success(message.unwrap_or_else(|| copy::SAVED.to_string()));
            }
            Action::SaveFailed(err) => {
                next.saving = false;
                next.status = Status::error(err.banner("Save"));
            }

            Action::RefreshViewer => next.refresh_token = next.refresh_token.advance(),
        }
        next
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SelectProvider(String),
    SelectModel(String),
    SetBookName(String),
    SetAuthorName(String),
    EditMarkdown(String),

    GenerationRejected(FormError),
    GenerateStarted { provider: String, model: String },
    GenerateAccepted,
    GenerateFailed(ApiError),
    GenerateFinished { message: String },

    LoadStarted,
    LoadSucceeded(String),
    LoadEmpty,
    LoadFailed(ApiError),

    SaveSkipped,
    SaveStarted,
    SaveSucceeded(Option<String>),
    SaveFailed(ApiError),

    RefreshViewer,
}

/// Holder of the current snapshot. The UI uses a signal; tests use a cell.
pub trait Store {
    fn snapshot(&self) -> AppState;
    fn dispatch(&self, action: Action);
}

impl Store for RwSignal<AppState> {
    fn snapshot(&self) -> AppState {
        self.get_untracked()
    }

    fn dispatch(&self, action: Action) {
        self.update(|state| *state = state.reduce(action));
    }
}
