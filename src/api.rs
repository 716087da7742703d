use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::{Deserialize, Serialize};

use crate::config::Endpoints;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub book_name: String,
    pub author_name: String,
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveMarkdownRequest<'a> {
    md_content: &'a str,
}

/// Envelope shared by `/generate` and `/save-md`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ServerReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn is_ok_status(status: u16) -> bool {
    (200..300).contains(&status)
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Turn a raw `/generate` or `/save-md` response into the server's success
/// message (if any) or the reason it failed.
pub fn interpret_reply(status: u16, status_text: &str, body: &str) -> Result<Option<String>, ApiError> {
    let ok = is_ok_status(status);
    match serde_json::from_str::<ServerReply>(body) {
        Ok(reply) if ok && reply.success => Ok(non_blank(reply.message)),
        Ok(reply) => {
            if let Some(error) = non_blank(reply.error) {
                Err(ApiError::Rejected(error))
            } else if !ok {
                Err(ApiError::Status {
                    status,
                    status_text: status_text.to_string(),
                })
            } else {
                Err(ApiError::Unsuccessful(status))
            }
        }
        Err(_) if !ok => Err(ApiError::Status {
            status,
            status_text: status_text.to_string(),
        }),
        Err(e) => Err(ApiError::Malformed(e.to_string())),
    }
}

/// `Ok(None)` means the server has no markdown yet.
pub fn interpret_markdown(status: u16, status_text: &str, body: String) -> Result<Option<String>, ApiError> {
    match status {
        404 => Ok(None),
        s if is_ok_status(s) => Ok(Some(body)),
        _ => Err(ApiError::Status {
            status,
            status_text: status_text.to_string(),
        }),
    }
}

/// Monotonic source of query values that make each GET distinct to caches.
#[derive(Debug, Default)]
pub struct CacheBuster {
    next: AtomicU64,
}

impl CacheBuster {
    pub fn starting_at(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// The three calls the UI makes. Success values are the server's optional
/// human-readable message.
#[async_trait(?Send)]
pub trait MindmapBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ApiError>;
    async fn fetch_plain_markdown(&self) -> Result<Option<String>, ApiError>;
    async fn save_markdown(&self, content: &str) -> Result<Option<String>, ApiError>;
}

pub struct HttpBackend {
    endpoints: Endpoints,
    cache_buster: CacheBuster,
}

impl HttpBackend {
    pub fn new(endpoints: Endpoints, cache_seed: u64) -> Self {
        Self {
            endpoints,
            cache_buster: CacheBuster::starting_at(cache_seed),
        }
    }

    async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<Option<String>, ApiError> {
        let response = Request::post(url)
            .json(body)
            .map_err(|e| ApiError::Encode(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let status_text = response.status_text();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        log::debug!("POST {url} -> {status}");
        interpret_reply(status, &status_text, &text)
    }
}

#[async_trait(?Send)]
impl MindmapBackend for HttpBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ApiError> {
        self.post_json(&self.endpoints.generate(), request).await
    }

    async fn fetch_plain_markdown(&self) -> Result<Option<String>, ApiError> {
        let url = self.endpoints.plain_markdown(self.cache_buster.next());
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let status_text = response.status_text();
        log::debug!("GET {url} -> {status}");
        let body = if is_ok_status(status) {
            response
                .text()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
        } else {
            String::new()
        };
        interpret_markdown(status, &status_text, body)
    }

    async fn save_markdown(&self, content: &str) -> Result<Option<String>, ApiError> {
        self.post_json(
            &self.endpoints.save_markdown(),
            &SaveMarkdownRequest { md_content: content },
        )
        .await
    }
}
