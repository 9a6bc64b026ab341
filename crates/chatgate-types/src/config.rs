//! Configuration value types shared between the loader and the services.
//!
//! The loader lives in `chatgate-infra::config`; these are the plain values
//! it produces that `chatgate-core` and `chatgate-api` consume.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Provider used when a chat request names none.
pub const DEFAULT_PROVIDER: &str = "gpt";

/// System-wide provider selection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider used when a request does not name one.
    pub default_provider: String,
    /// Configured default model per provider name. Overrides the client's
    /// own built-in default.
    #[serde(default)]
    pub default_models: HashMap<String, String>,
}

impl ProviderSettings {
    /// Configured default model for `provider`, if any.
    pub fn default_model_for(&self, provider: &str) -> Option<&str> {
        self.default_models
            .get(provider)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default_provider: DEFAULT_PROVIDER.to_string(),
            default_models: HashMap::new(),
        }
    }
}

/// Envelope `code` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeCodes {
    /// Code stamped on every success envelope.
    pub success_code: i64,
    /// Code stamped on error envelopes that carry no explicit code. When
    /// unset the HTTP status is used.
    pub error_code: Option<i64>,
}

impl Default for EnvelopeCodes {
    fn default() -> Self {
        Self {
            success_code: 0,
            error_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_settings_default() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.default_provider, "gpt");
        assert!(settings.default_model_for("gpt").is_none());
    }

    #[test]
    fn test_default_model_for_ignores_blank_entries() {
        let mut settings = ProviderSettings::default();
        settings
            .default_models
            .insert("deepseek".to_string(), "deepseek-reasoner".to_string());
        settings.default_models.insert("gpt".to_string(), String::new());

        assert_eq!(settings.default_model_for("deepseek"), Some("deepseek-reasoner"));
        assert_eq!(settings.default_model_for("gpt"), None);
    }

    #[test]
    fn test_envelope_codes_default() {
        let codes = EnvelopeCodes::default();
        assert_eq!(codes.success_code, 0);
        assert!(codes.error_code.is_none());
    }
}
