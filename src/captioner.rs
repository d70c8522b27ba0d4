//! Request handling for `POST /api/caption`: validate, call the provider with
//! rate-limit retries, map the outcome.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{Config, RetryPolicy};
use crate::error::{CaptionError, ProviderFailure};
use crate::payload::ImagePayload;
use crate::provider::{CaptionRequest, VisionProvider, CAPTION_PROMPT};

/// Returned with status 200 when the model answers with no text.
pub const FALLBACK_CAPTION: &str = "Could not generate caption.";

#[derive(Clone)]
pub struct Captioner {
    provider: Option<Arc<dyn VisionProvider>>,
    model: String,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl Captioner {
    /// `provider` is `None` when no credential is configured.
    pub fn new(config: &Config, provider: Option<Arc<dyn VisionProvider>>) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            retry: config.retry,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn ensure_configured(&self) -> Result<&Arc<dyn VisionProvider>, CaptionError> {
        self.provider.as_ref().ok_or(CaptionError::MissingConfiguration)
    }

    /// Full request flow for the `image` field of a request body.
    pub async fn caption(&self, image: Option<&Value>) -> Result<String, CaptionError> {
        self.ensure_configured()?;
        let payload = ImagePayload::from_request_value(image)?;
        self.caption_payload(payload).await
    }

    pub async fn caption_payload(&self, image: ImagePayload) -> Result<String, CaptionError> {
        let provider = self.ensure_configured()?;
        let request = CaptionRequest {
            model: self.model.clone(),
            prompt: CAPTION_PROMPT.to_string(),
            image,
            max_tokens: self.max_tokens,
        };

        match self.describe_with_retry(provider.as_ref(), &request).await {
            Ok(text) => {
                let caption = text
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| FALLBACK_CAPTION.to_string());
                tracing::info!(model = %request.model, chars = caption.len(), "caption generated");
                Ok(caption)
            }
            Err(failure) => {
                tracing::error!(model = %request.model, error = %failure, "error generating caption");
                Err(failure.into())
            }
        }
    }

    async fn describe_with_retry(
        &self,
        provider: &dyn VisionProvider,
        request: &CaptionRequest,
    ) -> Result<Option<String>, ProviderFailure> {
        let mut retry = 0;
        loop {
            match provider.describe(request).await {
                Err(failure) if failure.is_rate_limited() && retry < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry);
                    retry += 1;
                    tracing::warn!(
                        retry,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited by provider, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    type Reply = Result<Option<String>, ProviderFailure>;

    /// Replays a fixed sequence of replies and records when each call arrived.
    #[derive(Default)]
    pub(crate) struct ScriptedProvider {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
                calls: Mutex::default(),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl VisionProvider for ScriptedProvider {
        async fn describe(&self, _request: &CaptionRequest) -> Reply {
            self.calls.lock().unwrap().push(Instant::now());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Some("out of script".to_string())))
        }
    }

    pub(crate) fn status(code: u16) -> Reply {
        Err(ProviderFailure::Api {
            status: Some(code),
            message: format!("provider said {code}"),
        })
    }

    pub(crate) fn text(caption: &str) -> Reply {
        Ok(Some(caption.to_string()))
    }

    pub(crate) fn test_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    fn captioner(provider: &Arc<ScriptedProvider>) -> Captioner {
        Captioner::new(&test_config(), Some(provider.clone() as Arc<dyn VisionProvider>))
    }

    fn image() -> Value {
        json!("data:image/png;base64,iVBORw0KGgo=")
    }

    #[tokio::test]
    async fn missing_image_is_rejected_without_provider_call() {
        let provider = ScriptedProvider::new([]);
        let err = captioner(&provider).caption(None).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::InvalidInput);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn non_data_url_is_rejected_without_provider_call() {
        let provider = ScriptedProvider::new([]);
        let captioner = captioner(&provider);

        for bad in [json!("https://example.com/a.png"), json!(123), json!(["data:image/png"])] {
            let err = captioner.caption(Some(&bad)).await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.category(), ErrorCategory::InvalidInput);
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn unconfigured_captioner_fails_before_validation() {
        let captioner = Captioner::new(&test_config(), None);
        assert!(!captioner.is_configured());

        for body in [None, Some(image())] {
            let err = captioner.caption(body.as_ref()).await.unwrap_err();
            assert_eq!(err.category(), ErrorCategory::MissingConfiguration);
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_are_retried_with_doubling_backoff() {
        let provider = ScriptedProvider::new([status(429), status(429), text("Sunset vibes #golden")]);
        let started = Instant::now();

        let caption = captioner(&provider).caption(Some(&image())).await.unwrap();

        assert_eq!(caption, "Sunset vibes #golden");
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.gaps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_rate_limited() {
        let provider = ScriptedProvider::new([status(429), status(429), status(429)]);

        let err = captioner(&provider).caption(Some(&image())).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::RateLimited);
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_is_not_retried() {
        let provider = ScriptedProvider::new([status(401), text("never reached")]);
        let started = Instant::now();

        let err = captioner(&provider).caption(Some(&image())).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Unauthorized);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_pass_through_without_retry() {
        let provider = ScriptedProvider::new([status(503)]);

        let err = captioner(&provider).caption(Some(&image())).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::ProviderError);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "provider said 503");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn transport_failures_are_network_errors() {
        let provider = ScriptedProvider::new([Err(ProviderFailure::Transport(anyhow::anyhow!(
            "connection reset"
        )))]);

        let err = captioner(&provider).caption(Some(&image())).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::NetworkError);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_answers_use_the_fallback_caption() {
        let provider = ScriptedProvider::new([text(""), text("  \n "), Ok(None)]);
        let captioner = captioner(&provider);

        for _ in 0..3 {
            let caption = captioner.caption(Some(&image())).await.unwrap();
            assert_eq!(caption, FALLBACK_CAPTION);
        }
    }

    #[tokio::test]
    async fn captions_are_trimmed() {
        let provider = ScriptedProvider::new([text("\n  Beach day! #summer  \n")]);
        let caption = captioner(&provider).caption(Some(&image())).await.unwrap();
        assert_eq!(caption, "Beach day! #summer");
    }

    #[tokio::test]
    async fn same_image_yields_same_caption() {
        let provider = ScriptedProvider::new([text("Coffee first. #morning"), text("Coffee first. #morning")]);
        let captioner = captioner(&provider);

        let first = captioner.caption(Some(&image())).await.unwrap();
        let second = captioner.caption(Some(&image())).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_follows_policy() {
        let provider = ScriptedProvider::new([status(429), status(429)]);
        let captioner = captioner(&provider).with_retry(RetryPolicy {
            max_retries: 0,
            initial_backoff: Duration::from_secs(1),
        });

        let err = captioner.caption(Some(&image())).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::RateLimited);
        assert_eq!(provider.call_count(), 1);
    }
}
