//! Startup configuration, loaded once from a JSON file and immutable after.

use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config value {field} out of range: {detail}")]
    OutOfRange { field: &'static str, detail: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pubmed: PubMedConfig,
    pub models: ModelsConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PubMedConfig {
    /// Tool name reported to NCBI E-utilities.
    pub tool: String,
    /// Result cap per search term.
    pub max_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub keyword_generator: String,
    pub answer_generator: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks happen here, at load time, so a bad value kills the
    /// process before any request is served.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.pubmed.max_results) {
            return Err(out_of_range(
                "pubmed.max_results",
                self.pubmed.max_results,
                "expected 1..=100",
            ));
        }
        if !(1..=4096).contains(&self.generation.max_new_tokens) {
            return Err(out_of_range(
                "generation.max_new_tokens",
                self.generation.max_new_tokens,
                "expected 1..=4096",
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(out_of_range(
                "generation.temperature",
                self.generation.temperature,
                "expected 0.0..=2.0",
            ));
        }
        if !(self.generation.top_p > 0.0 && self.generation.top_p <= 1.0) {
            return Err(out_of_range(
                "generation.top_p",
                self.generation.top_p,
                "expected a value in (0.0, 1.0]",
            ));
        }
        Ok(())
    }
}

fn out_of_range(
    field: &'static str,
    value: impl std::fmt::Display,
    expected: &str,
) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        detail: format!("{value} ({expected})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> serde_json::Value {
        serde_json::json!({
            "pubmed": { "tool": "medq", "max_results": 3 },
            "models": {
                "keyword_generator": "keyword-model",
                "answer_generator": "answer-model"
            },
            "generation": { "max_new_tokens": 500, "temperature": 0.7, "top_p": 0.95 }
        })
    }

    #[test]
    fn valid_config_is_accepted() {
        let config = Config::from_json(&valid_json().to_string()).unwrap();
        assert_eq!(config.pubmed.tool, "medq");
        assert_eq!(config.pubmed.max_results, 3);
        assert_eq!(config.models.answer_generator, "answer-model");
        assert_eq!(config.generation.max_new_tokens, 500);
    }

    #[test]
    fn missing_field_is_parse_error() {
        let mut json = valid_json();
        json.as_object_mut().unwrap().remove("models");
        let err = Config::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_max_results_rejected() {
        let mut json = valid_json();
        json["pubmed"]["max_results"] = serde_json::json!(0);
        let err = Config::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("pubmed.max_results"));
    }

    #[test]
    fn oversized_max_new_tokens_rejected() {
        let mut json = valid_json();
        json["generation"]["max_new_tokens"] = serde_json::json!(100_000);
        let err = Config::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("generation.max_new_tokens"));
    }

    #[test]
    fn negative_temperature_rejected() {
        let mut json = valid_json();
        json["generation"]["temperature"] = serde_json::json!(-0.1);
        let err = Config::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("generation.temperature"));
    }

    #[test]
    fn zero_temperature_is_valid() {
        let mut json = valid_json();
        json["generation"]["temperature"] = serde_json::json!(0.0);
        assert!(Config::from_json(&json.to_string()).is_ok());
    }

    #[test]
    fn zero_top_p_rejected() {
        let mut json = valid_json();
        json["generation"]["top_p"] = serde_json::json!(0.0);
        let err = Config::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("generation.top_p"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
