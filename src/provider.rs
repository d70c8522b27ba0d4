use async_trait::async_trait;

use crate::error::ProviderFailure;
use crate::payload::ImagePayload;

/// Instruction sent alongside every image.
pub const CAPTION_PROMPT: &str = "Please generate a concise, engaging caption for this image suitable for social media. Add relevant hashtags.";

/// One single-turn captioning call: a text instruction plus one image.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub model: String,
    pub prompt: String,
    pub image: ImagePayload,
    pub max_tokens: u32,
}

/// A hosted vision-language model.
///
/// `Ok(None)` means the model answered but produced no text.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    async fn describe(&self, request: &CaptionRequest) -> Result<Option<String>, ProviderFailure>;
}
