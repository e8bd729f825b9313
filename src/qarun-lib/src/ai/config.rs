use crate::error::AiError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Settings for an OpenAI-compatible chat completion endpoint. Always passed
/// in explicitly; nothing is read from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    /// Base URL; `/chat/completions` is appended.
    pub endpoint: String,
    /// Sent as a Bearer token when non-empty. Local models often need none.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AiConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim().trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<(), AiError> {
        if self.endpoint.trim().is_empty() {
            return Err(AiError::NotConfigured("endpoint is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(AiError::NotConfigured("model is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let config = AiConfig {
            endpoint: "http://localhost:8000/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.completions_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_validate() {
        assert!(AiConfig::default().validate().is_ok());
        let config = AiConfig {
            model: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AiError::NotConfigured(_))));
    }
}
