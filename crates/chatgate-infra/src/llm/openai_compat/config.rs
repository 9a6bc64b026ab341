//! Configuration types and per-provider defaults for OpenAI-compatible providers.
//!
//! Each backend that speaks the OpenAI chat completions protocol gets a
//! factory function returning an [`OpenAiCompatConfig`] with its registry
//! name, base URL and built-in default model.

use secrecy::SecretString;

/// Registry name of the OpenAI backend.
pub const GPT_PROVIDER: &str = "gpt";
/// Registry name of the DeepSeek backend.
pub const DEEPSEEK_PROVIDER: &str = "deepseek";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

pub const GPT_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

/// Configuration for an OpenAI-compatible chat client.
///
/// Used to construct an [`super::OpenAiCompatibleClient`]. `Debug` output
/// redacts the API key.
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Registry name (e.g., "gpt", "deepseek").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: SecretString,
    /// Model used when neither the request nor the configuration names one.
    pub default_model: String,
}

impl OpenAiCompatConfig {
    /// Point the client at a different endpoint (proxy, gateway, self-hosted).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`, model `gpt-4o-mini`.
pub fn gpt_defaults(api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: GPT_PROVIDER.into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
        default_model: GPT_DEFAULT_MODEL.into(),
    }
}

/// DeepSeek default configuration.
///
/// Base URL: `https://api.deepseek.com/v1`, model `deepseek-chat`.
pub fn deepseek_defaults(api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: DEEPSEEK_PROVIDER.into(),
        base_url: DEEPSEEK_BASE_URL.into(),
        api_key,
        default_model: DEEPSEEK_DEFAULT_MODEL.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_gpt_defaults() {
        let config = gpt_defaults(SecretString::from("sk-test".to_string()));
        assert_eq!(config.provider_name, "gpt");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.api_key.expose_secret(), "sk-test");
    }

    #[test]
    fn test_deepseek_defaults_with_base_url() {
        let config = deepseek_defaults(SecretString::from("ds-key".to_string()))
            .with_base_url("http://localhost:8080/v1");
        assert_eq!(config.provider_name, "deepseek");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.default_model, "deepseek-chat");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = gpt_defaults(SecretString::from("sk-very-secret".to_string()));
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
