//! LLM provider implementations.
//!
//! Contains the concrete [`ChatClient`](chatgate_core::llm::client::ChatClient)
//! implementation for OpenAI-compatible backends and a registry factory
//! ([`build_registry`]) that wires the configured providers together.

pub mod openai_compat;

use chatgate_core::llm::box_client::BoxChatClient;
use chatgate_core::llm::registry::ProviderRegistry;
use chatgate_types::config::ProviderSettings;

use self::openai_compat::OpenAiCompatibleClient;
use self::openai_compat::config::OpenAiCompatConfig;

/// Build a [`ProviderRegistry`] holding one client per configured provider.
///
/// Providers are keyed by their configured name. A default provider with no
/// configured client is logged; requests for it will report the provider as
/// unavailable.
pub fn build_registry(providers: Vec<OpenAiCompatConfig>, settings: ProviderSettings) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new(settings);

    for config in providers {
        let name = config.provider_name.clone();
        tracing::info!(
            provider = %name,
            base_url = %config.base_url,
            default_model = %config.default_model,
            "Registered chat provider"
        );
        registry.register(name, BoxChatClient::new(OpenAiCompatibleClient::new(config)));
    }

    if registry.get(registry.default_provider()).is_none() {
        tracing::warn!(
            provider = registry.default_provider(),
            "Default chat provider is not configured"
        );
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_build_registry_registers_by_name() {
        let providers = vec![
            openai_compat::config::gpt_defaults(SecretString::from("sk".to_string())),
            openai_compat::config::deepseek_defaults(SecretString::from("ds".to_string())),
        ];
        let registry = build_registry(providers, ProviderSettings::default());

        assert_eq!(registry.list_names(), vec!["deepseek", "gpt"]);
        assert_eq!(registry.get("deepseek").unwrap().default_model(), "deepseek-chat");
    }

    #[test]
    fn test_build_registry_empty() {
        let registry = build_registry(Vec::new(), ProviderSettings::default());
        assert!(registry.list_names().is_empty());
        assert_eq!(registry.default_provider(), "gpt");
    }
}
