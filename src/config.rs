/// One LLM provider and the models the backend accepts for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    pub models: &'static [&'static str],
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        self.models.first().copied().unwrap_or_default()
    }

    pub fn offers(&self, model: &str) -> bool {
        self.models.contains(&model)
    }
}

pub const PROVIDERS: &[Provider] = &[
    Provider {
        name: "DeepSeek",
        models: &["deepseek-chat", "deepseek-math"],
    },
    Provider {
        name: "OpenAI",
        models: &["gpt-4o-mini", "gpt-4o"],
    },
];

pub fn find_provider(name: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|provider| provider.name == name)
}

pub fn default_provider() -> &'static Provider {
    &PROVIDERS[0]
}

/// Backend paths. Everything is served from the page's own origin, so URLs
/// stay relative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Endpoints;

impl Endpoints {
    pub fn same_origin() -> Self {
        Self
    }

    pub fn generate(&self) -> String {
        "/generate".to_string()
    }

    pub fn plain_markdown(&self, cache_buster: u64) -> String {
        format!("/mindmap-plain.md?t={cache_buster}")
    }

    pub fn save_markdown(&self) -> String {
        "/save-md".to_string()
    }

    pub fn viewer(&self, refresh_token: u64) -> String {
        format!("/mindmap.html?v={refresh_token}")
    }
}

pub mod copy {
    pub const APP_LOADED: &str = "App loaded. Ready to generate or load existing mindmap.";
    pub const MISSING_FIELDS: &str = "Please enter both Book Name and Author Name.";
    pub const GENERATED_RELOADING: &str = "Mindmap generated! Loading editor and refreshing view...";
    pub const LOADED: &str = "Loaded mindmap content into editor.";
    pub const NOTHING_TO_LOAD: &str = "No existing mindmap content found to load into editor.";
    pub const NOTHING_TO_SAVE: &str = "Editor is empty. Nothing to save.";
    pub const SAVING: &str = "Saving editor content and regenerating mindmap...";
    pub const SAVED: &str = "Editor content saved & mindmap view updated!";

    pub fn generating(provider: &str, model: &str) -> String {
        format!("Generating mindmap using {provider} ({model})... Please wait.")
    }

    pub fn generated(provider: &str, model: &str) -> String {
        format!("Mindmap generated with {provider} ({model})! View updated.")
    }
}
