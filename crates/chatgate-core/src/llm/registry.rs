//! Provider registry for runtime provider lookup.
//!
//! A name-indexed registry of boxed chat clients plus the system-wide
//! selection settings (default provider, per-provider default models).
//! Resolution is a map lookup, never per-call-site branching.

use std::collections::HashMap;

use chatgate_types::config::ProviderSettings;

use super::box_client::BoxChatClient;

/// Registry of configured chat clients, indexed by provider name.
pub struct ProviderRegistry {
    providers: HashMap<String, BoxChatClient>,
    settings: ProviderSettings,
}

impl ProviderRegistry {
    /// Create an empty registry with the given selection settings.
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            providers: HashMap::new(),
            settings,
        }
    }

    /// Register a client under the given name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, client: BoxChatClient) {
        self.providers.insert(name.into(), client);
    }

    /// Look up a client by name.
    pub fn get(&self, name: &str) -> Option<&BoxChatClient> {
        self.providers.get(name)
    }

    /// All registered provider names, sorted.
    pub fn list_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn default_provider(&self) -> &str {
        &self.settings.default_provider
    }

    /// Resolve the provider name: the requested one when given and
    /// non-empty, otherwise the system default.
    pub fn resolve_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.settings.default_provider.as_str())
    }

    /// Resolve the model for a call to `provider` via `client`.
    ///
    /// Order: explicit request model, then the provider's configured
    /// default, then the client's built-in default.
    pub fn resolve_model(&self, provider: &str, client: &BoxChatClient, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .or_else(|| self.settings.default_model_for(provider))
            .unwrap_or_else(|| client.default_model())
            .to_string()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(ProviderSettings::default())
    }
}
