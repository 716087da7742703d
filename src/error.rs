use thiserror::Error;

use crate::config::copy;

/// Failures talking to the mindmap backend. `Display` is what the status banner shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Server error: {status} {status_text}")]
    Status { status: u16, status_text: String },
    /// The server answered and said no; its own words are shown verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("Server reported a failure without details (HTTP {0})")]
    Unsuccessful(u16),
    #[error("Failed to parse server reply: {0}")]
    Malformed(String),
    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// Banner text for a failed `action`. The server's own refusal is shown
    /// as-is; everything else says which action broke.
    pub fn banner(&self, action: &str) -> String {
        match self {
            ApiError::Rejected(reason) => reason.clone(),
            other => format!("{action} failed: {other}"),
        }
    }
}

/// The generation form was submitted in a state that can't produce a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{}", copy::MISSING_FIELDS)]
    MissingFields,
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
    #[error("Model {model} is not offered by {provider}")]
    UnknownModel { provider: String, model: String },
}
