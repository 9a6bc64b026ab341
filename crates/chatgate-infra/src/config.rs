//! Environment configuration loader for Chatgate.
//!
//! Reads `MYSQL_*`, provider and response settings once at startup into a
//! [`GatewayConfig`] that is passed by reference to each component. Values
//! that are empty or unparsable fall back to their documented defaults.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;

use chatgate_types::config::{DEFAULT_PROVIDER, EnvelopeCodes, ProviderSettings};

use crate::llm::openai_compat::config::{
    DEEPSEEK_PROVIDER, GPT_PROVIDER, OpenAiCompatConfig, deepseek_defaults, gpt_defaults,
};
use crate::mysql::pool::{DEFAULT_CONNECTION_LIMIT, DEFAULT_PORT, DEFAULT_SHUTDOWN_TIMEOUT, DatabaseConfig};

pub const DEFAULT_CONVERSATION_PATH: &str = "/conversation";
pub const DEFAULT_CHAT_PATH: &str = "/chat";

/// Route paths for the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Base path for `create`, `list`, `detail` and `delete`.
    pub conversation_base: String,
    /// Path of the chat endpoint.
    pub chat_path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            conversation_base: DEFAULT_CONVERSATION_PATH.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
        }
    }
}

/// Everything the gateway reads from its environment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub database: DatabaseConfig,
    /// Providers whose API key is present.
    pub providers: Vec<OpenAiCompatConfig>,
    pub provider_settings: ProviderSettings,
    pub envelope: EnvelopeCodes,
    pub routes: RouteConfig,
}

impl GatewayConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database = DatabaseConfig {
            host: get("MYSQL_HOST"),
            port: parse_number(get("MYSQL_PORT"), DEFAULT_PORT),
            user: get("MYSQL_USER"),
            // Passwords are taken verbatim; an empty password is still a password.
            password: lookup("MYSQL_PASSWORD").map(SecretString::from),
            database: get("MYSQL_DATABASE"),
            connection_limit: parse_number(get("MYSQL_CONNECTION_LIMIT"), DEFAULT_CONNECTION_LIMIT).max(1),
            queue_limit: parse_number(get("MYSQL_QUEUE_LIMIT"), 0),
            wait_for_connections: parse_bool(get("MYSQL_WAIT_FOR_CONNECTIONS"), true),
            charset: get("MYSQL_CHARSET"),
            timezone: get("MYSQL_TIMEZONE"),
            skip_initial_query: parse_bool(get("MYSQL_SKIP_INITIAL_QUERY"), false),
            shutdown_timeout: get("MYSQL_SHUTDOWN_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(DEFAULT_SHUTDOWN_TIMEOUT, Duration::from_secs),
        };

        let mut providers = Vec::new();
        let mut default_models = HashMap::new();
        let backends: [(&str, &str, fn(SecretString) -> OpenAiCompatConfig); 2] = [
            (GPT_PROVIDER, "OPENAI", gpt_defaults),
            (DEEPSEEK_PROVIDER, "DEEPSEEK", deepseek_defaults),
        ];
        for (name, prefix, defaults) in backends {
            if let Some(model) = get(&format!("{prefix}_MODEL")) {
                default_models.insert(name.to_string(), model);
            }
            let Some(api_key) = get(&format!("{prefix}_API_KEY")) else {
                continue;
            };
            let mut config = defaults(SecretString::from(api_key));
            if let Some(base_url) = get(&format!("{prefix}_BASE_URL")) {
                config = config.with_base_url(base_url);
            }
            providers.push(config);
        }

        let provider_settings = ProviderSettings {
            default_provider: get("LLM_DEFAULT_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            default_models,
        };

        let envelope = EnvelopeCodes {
            success_code: parse_number(get("RESPONSE_SUCCESS_CODE"), 0),
            error_code: get("RESPONSE_ERROR_CODE").and_then(|v| v.parse().ok()),
        };

        let routes = RouteConfig {
            conversation_base: normalize_path(get("CONVERSATION_ROUTE_PATH"), DEFAULT_CONVERSATION_PATH),
            chat_path: normalize_path(get("CHAT_ROUTE_PATH"), DEFAULT_CHAT_PATH),
        };

        Self {
            database,
            providers,
            provider_settings,
            envelope,
            routes,
        }
    }
}

/// Parse a number, falling back when absent or unparsable.
pub fn parse_number<T: std::str::FromStr>(value: Option<String>, fallback: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(fallback)
}

/// Parse a lenient boolean (`true/1/yes/y`, `false/0/no/n`), falling back
/// when absent or unrecognised.
pub fn parse_bool(value: Option<String>, fallback: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1" | "yes" | "y") => true,
        Some("false" | "0" | "no" | "n") => false,
        _ => fallback,
    }
}

/// Ensure a leading slash and no trailing slash.
fn normalize_path(value: Option<String>, fallback: &str) -> String {
    let Some(raw) = value else {
        return fallback.to_string();
    };
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    format!("/{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn load(vars: &[(&str, &str)]) -> GatewayConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_empty_environment() {
        let config = load(&[]);
        assert!(!config.database.is_configured());
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.connection_limit, 10);
        assert_eq!(config.database.queue_limit, 0);
        assert!(config.database.wait_for_connections);
        assert!(config.providers.is_empty());
        assert_eq!(config.provider_settings.default_provider, "gpt");
        assert_eq!(config.envelope, EnvelopeCodes::default());
        assert_eq!(config.routes, RouteConfig::default());
    }

    #[test]
    fn test_database_settings() {
        let config = load(&[
            ("MYSQL_HOST", "db.internal"),
            ("MYSQL_PORT", "3307"),
            ("MYSQL_USER", "chat"),
            ("MYSQL_PASSWORD", "hunter2"),
            ("MYSQL_DATABASE", "chatgate"),
            ("MYSQL_CONNECTION_LIMIT", "4"),
            ("MYSQL_QUEUE_LIMIT", "20"),
            ("MYSQL_WAIT_FOR_CONNECTIONS", "No"),
            ("MYSQL_TIMEZONE", "Z"),
            ("MYSQL_SHUTDOWN_TIMEOUT_SECS", "3"),
        ]);
        let db = &config.database;
        assert!(db.is_configured());
        assert_eq!(db.port, 3307);
        assert_eq!(db.password.as_ref().unwrap().expose_secret(), "hunter2");
        assert_eq!(db.database.as_deref(), Some("chatgate"));
        assert_eq!(db.connection_limit, 4);
        assert_eq!(db.queue_limit, 20);
        assert!(!db.wait_for_connections);
        assert_eq!(db.timezone.as_deref(), Some("Z"));
        assert_eq!(db.shutdown_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = load(&[
            ("MYSQL_PORT", "not-a-port"),
            ("MYSQL_CONNECTION_LIMIT", ""),
            ("MYSQL_WAIT_FOR_CONNECTIONS", "maybe"),
            ("RESPONSE_ERROR_CODE", "x"),
        ]);
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.connection_limit, 10);
        assert!(config.database.wait_for_connections);
        assert!(config.envelope.error_code.is_none());
    }

    #[test]
    fn test_providers_require_api_key() {
        let config = load(&[
            ("DEEPSEEK_API_KEY", "ds-key"),
            ("DEEPSEEK_MODEL", "deepseek-reasoner"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("LLM_DEFAULT_PROVIDER", "deepseek"),
        ]);
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].provider_name, "deepseek");
        assert_eq!(config.providers[0].base_url, "https://api.deepseek.com/v1");
        assert_eq!(config.provider_settings.default_provider, "deepseek");
        assert_eq!(
            config.provider_settings.default_model_for("deepseek"),
            Some("deepseek-reasoner")
        );
        assert_eq!(config.provider_settings.default_model_for("gpt"), Some("gpt-4o"));
    }

    #[test]
    fn test_provider_base_url_override() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk"),
            ("OPENAI_BASE_URL", "http://proxy.local/v1"),
        ]);
        assert_eq!(config.providers[0].provider_name, "gpt");
        assert_eq!(config.providers[0].base_url, "http://proxy.local/v1");
    }

    #[test]
    fn test_envelope_and_routes() {
        let config = load(&[
            ("RESPONSE_SUCCESS_CODE", "200"),
            ("RESPONSE_ERROR_CODE", "-1"),
            ("CONVERSATION_ROUTE_PATH", "api/conversation/"),
            ("CHAT_ROUTE_PATH", "/message/send"),
        ]);
        assert_eq!(config.envelope.success_code, 200);
        assert_eq!(config.envelope.error_code, Some(-1));
        assert_eq!(config.routes.conversation_base, "/api/conversation");
        assert_eq!(config.routes.chat_path, "/message/send");
    }

    #[test]
    fn test_parse_bool_variants() {
        for truthy in ["true", "1", "YES", " y "] {
            assert!(parse_bool(Some(truthy.to_string()), false), "{truthy}");
        }
        for falsy in ["false", "0", "no", "N"] {
            assert!(!parse_bool(Some(falsy.to_string()), true), "{falsy}");
        }
        assert!(parse_bool(None, true));
    }
}
