//! Client side of the caption flow: turning a local file into an
//! [`ImagePayload`], submitting it, and holding what should be displayed.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ErrorCategory, ErrorDescriptor};
use crate::payload::ImagePayload;

pub const NO_CAPTION_MESSAGE: &str = "Failed to generate caption. No caption returned from API.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate caption. Please try again.";
pub const NETWORK_FAILURE_MESSAGE: &str = "Network error. Please check your connection and try again.";

pub type CaptionResult = Result<String, ErrorDescriptor>;

/// Something that can turn an image into a caption.
#[async_trait]
pub trait CaptionBackend: Send + Sync {
    async fn request_caption(&self, image: &ImagePayload) -> CaptionResult;
}

/// Talks to a running caption server over HTTP.
pub struct HttpCaptionClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Default, Deserialize)]
struct ServerReply {
    caption: Option<String>,
    error: Option<String>,
}

impl HttpCaptionClient {
    pub fn new(client: reqwest::Client, server: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/caption", server.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl CaptionBackend for HttpCaptionClient {
    async fn request_caption(&self, image: &ImagePayload) -> CaptionResult {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "image": image.as_str() }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, endpoint = %self.endpoint, "caption request failed");
                ErrorDescriptor::new(ErrorCategory::NetworkError, NETWORK_FAILURE_MESSAGE, 500)
            })?;

        let status = response.status();
        let reply: ServerReply = response.json().await.unwrap_or_default();

        if status.is_success() {
            return match reply.caption {
                Some(caption) if !caption.is_empty() => Ok(caption),
                _ => Err(ErrorDescriptor::new(
                    ErrorCategory::ProviderError,
                    NO_CAPTION_MESSAGE,
                    status.as_u16(),
                )),
            };
        }

        let message = reply.error.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        Err(ErrorDescriptor::from_status(status.as_u16(), message))
    }
}

/// The currently selected image and the last caption (or error) shown for it.
pub struct CaptionSession<B> {
    backend: B,
    image: Option<ImagePayload>,
    result: Option<CaptionResult>,
}

impl<B: CaptionBackend> CaptionSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            image: None,
            result: None,
        }
    }

    /// Reads and encodes a file, then captions it.
    pub async fn select_file(&mut self, path: impl AsRef<Path>) -> &CaptionResult {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => self.select_bytes(&bytes).await,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read image file");
                self.clear();
                self.result.insert(Err(ErrorDescriptor::new(
                    ErrorCategory::InvalidInput,
                    format!("Could not read {}", path.display()),
                    400,
                )))
            }
        }
    }

    /// Encodes raw image bytes and immediately captions them.
    pub async fn select_bytes(&mut self, bytes: &[u8]) -> &CaptionResult {
        match ImagePayload::from_bytes(bytes) {
            Ok(image) => {
                self.image = Some(image);
                self.generate().await
            }
            Err(e) => {
                self.clear();
                self.result.insert(Err(e.descriptor()))
            }
        }
    }

    /// Re-submits the already encoded image. `None` when nothing is selected.
    pub async fn regenerate(&mut self) -> Option<&CaptionResult> {
        if self.image.is_none() {
            return None;
        }
        Some(self.generate().await)
    }

    pub fn clear(&mut self) {
        self.image = None;
        self.result = None;
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&CaptionResult> {
        self.result.as_ref()
    }

    /// Text for the caption region: the caption, or the error prefixed with
    /// `Error:`. A failure to reach the server is shown as is.
    pub fn display(&self) -> Option<String> {
        self.result.as_ref().map(|result| match result {
            Ok(caption) => caption.clone(),
            Err(err) if err.category == ErrorCategory::NetworkError => err.message.clone(),
            Err(err) => format!("Error: {}", err.message),
        })
    }

    async fn generate(&mut self) -> &CaptionResult {
        self.result = None;
        let outcome = match &self.image {
            Some(image) => self.backend.request_caption(image).await,
            None => Err(ErrorDescriptor::new(
                ErrorCategory::InvalidInput,
                "Image data is required",
                400,
            )),
        };
        self.result.insert(outcome)
    }
}
