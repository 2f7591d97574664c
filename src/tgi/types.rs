use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

/// Sampling and length options for one generation call. Unset fields fall
/// back to the owning client's defaults at request time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecodeConfig {
    pub max_new_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl DecodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = Some(max_new_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Merge request-scoped values over instance defaults; set fields win.
    pub fn merged_over(&self, defaults: &DecodeConfig) -> DecodeConfig {
        DecodeConfig {
            max_new_tokens: self.max_new_tokens.or(defaults.max_new_tokens),
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
        }
    }
}

impl From<&GenerationConfig> for DecodeConfig {
    fn from(generation: &GenerationConfig) -> Self {
        DecodeConfig {
            max_new_tokens: Some(generation.max_new_tokens),
            temperature: Some(generation.temperature),
            top_p: Some(generation.top_p),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub inputs: &'a str,
    pub parameters: GenerateParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    pub return_full_text: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateOptions {
    pub wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateReply {
    pub generated_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: Option<String>,
}
