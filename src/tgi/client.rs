use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{
    ApiErrorBody, DecodeConfig, GenerateOptions, GenerateParameters, GenerateReply,
    GenerateRequest,
};
use crate::text::truncate_at_boundary;

const API_BASE: &str = "https://api-inference.huggingface.co/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Warm-up waits for the model to load server-side, which can take minutes.
const WARMUP_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum TgiError {
    #[error("HUGGINGFACE_API_KEY not set. Get one at https://huggingface.co/settings/tokens")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("model {model} is still loading: {message}")]
    ModelLoading { model: String, message: String },

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for the external text-generation collaborator. Returns the
/// candidate replies for one prompt; callers consume the first.
/// Implemented by `TgiClient` for production; mock implementations used in tests.
pub trait Generator {
    async fn generate(
        &self,
        prompt: &str,
        overrides: &DecodeConfig,
    ) -> Result<Vec<String>, TgiError>;
}

impl<T: Generator> Generator for &T {
    async fn generate(
        &self,
        prompt: &str,
        overrides: &DecodeConfig,
    ) -> Result<Vec<String>, TgiError> {
        (**self).generate(prompt, overrides).await
    }
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for one model on the Hugging Face Inference API. Construct one
/// instance per pipeline stage; each carries its own decode defaults.
#[derive(Clone)]
pub struct TgiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    defaults: DecodeConfig,
    base_url: String,
}

impl TgiClient {
    pub fn from_env(
        http: Client,
        model: &str,
        defaults: DecodeConfig,
    ) -> Result<Self, TgiError> {
        let api_key = env::var("HUGGINGFACE_API_KEY").map_err(|_| TgiError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(TgiError::ApiKeyNotSet);
        }
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            model: model.to_string(),
            defaults,
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(
        http: Client,
        model: &str,
        defaults: DecodeConfig,
        base_url: &str,
    ) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: model.to_string(),
            defaults,
            base_url: base_url.to_string(),
        }
    }

    /// One-time model load. Must complete before the first `generate` call;
    /// the pipeline never re-initializes per request.
    pub async fn warm_up(&self) -> Result<(), TgiError> {
        let parameters = GenerateParameters {
            max_new_tokens: Some(1),
            temperature: None,
            top_p: None,
            return_full_text: false,
        };
        self.request(
            "warm up",
            parameters,
            Some(GenerateOptions {
                wait_for_model: true,
            }),
            WARMUP_TIMEOUT,
        )
        .await?;
        debug!(model = %self.model, "model warmed up");
        Ok(())
    }

    async fn request(
        &self,
        inputs: &str,
        parameters: GenerateParameters,
        options: Option<GenerateOptions>,
        timeout: Duration,
    ) -> Result<Vec<String>, TgiError> {
        let url = format!("{}/{}", self.base_url, self.model);
        let request = GenerateRequest {
            inputs,
            parameters,
            options,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(model = %self.model, "inference API rate limited");
            return Err(TgiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    format!("HTTP {status}: {}", truncate_at_boundary(&text, 200))
                });
            if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                warn!(model = %self.model, "model not loaded yet");
                return Err(TgiError::ModelLoading {
                    model: self.model.clone(),
                    message,
                });
            }
            warn!(status = %status, model = %self.model, "inference API error");
            return Err(TgiError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let replies: Vec<GenerateReply> = response.json().await?;
        debug!(model = %self.model, replies = replies.len(), "generation complete");
        Ok(replies.into_iter().map(|r| r.generated_text).collect())
    }
}

impl Generator for TgiClient {
    async fn generate(
        &self,
        prompt: &str,
        overrides: &DecodeConfig,
    ) -> Result<Vec<String>, TgiError> {
        let merged = overrides.merged_over(&self.defaults);
        let parameters = GenerateParameters {
            max_new_tokens: merged.max_new_tokens,
            // Temperature 0 selects greedy decoding; the API expects the
            // field omitted rather than set to zero.
            temperature: merged.temperature.filter(|t| *t > 0.0),
            top_p: merged.top_p,
            return_full_text: false,
        };
        self.request(prompt, parameters, None, REQUEST_TIMEOUT).await
    }
}
