//! Configuration for the image lookup relay
//!
//! Sources are layered in order: built-in defaults, an optional `relay.toml`,
//! `RELAY__SECTION__KEY` environment variables, then the legacy variable names
//! earlier deployments used (`PORT`, `SERPAPI_API_KEY`, `SERPAPI_KEY`,
//! `AUTOMATION_WEBHOOK_URL`).

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable names accepted for the provider credential, in priority order
pub const API_KEY_ENV_VARS: [&str; 2] = ["SERPAPI_API_KEY", "SERPAPI_KEY"];

/// Top-level configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub automation: AutomationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body, uploads included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Visual-search provider settings
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Provider credential; absence is reported per request, not at startup
    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "https://serpapi.com/search.json".to_string()
}

fn default_engine() -> String {
    "google_lens".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            engine: default_engine(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// True when a non-blank credential is present
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .map_or(false, |key| !key.expose_secret().trim().is_empty())
    }
}

/// Response shaping settings
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Number of visual matches kept by the projected response
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    5
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

/// Automation handoff settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutomationConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from `relay.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_file("relay")
    }

    /// Load configuration from the named file (optional) and the environment
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config.from_env())
    }

    /// Apply the legacy environment variable names
    pub fn from_env(self) -> Self {
        self.with_env_aliases(|name| std::env::var(name).ok())
    }

    /// Apply legacy variable names using the given lookup
    pub fn with_env_aliases<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PORT") {
            if let Ok(port) = val.trim().parse() {
                self.server.port = port;
            }
        }

        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|val| !val.trim().is_empty())
        {
            self.provider.api_key = Some(SecretString::new(key));
        }

        if let Some(val) = lookup("AUTOMATION_WEBHOOK_URL") {
            if !val.trim().is_empty() {
                self.automation.webhook_url = Some(val);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.provider.engine, "google_lens");
        assert_eq!(config.provider.endpoint, "https://serpapi.com/search.json");
        assert_eq!(config.relay.max_results, 5);
        assert!(!config.provider.has_api_key());
        assert!(config.automation.webhook_url.is_none());
    }

    #[test]
    fn test_port_alias() {
        let config = Config::default().with_env_aliases(lookup_from(&[("PORT", "8088")]));
        assert_eq!(config.server.port, 8088);
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let config = Config::default().with_env_aliases(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.server.port, 10000);
    }

    #[test]
    fn test_api_key_alias_priority() {
        let config = Config::default().with_env_aliases(lookup_from(&[
            ("SERPAPI_API_KEY", "primary"),
            ("SERPAPI_KEY", "secondary"),
        ]));
        assert_eq!(
            config.provider.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("primary")
        );

        let config =
            Config::default().with_env_aliases(lookup_from(&[("SERPAPI_KEY", "secondary")]));
        assert_eq!(
            config.provider.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("secondary")
        );
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let config = Config::default().with_env_aliases(lookup_from(&[("SERPAPI_API_KEY", "  ")]));
        assert!(!config.provider.has_api_key());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let config =
            Config::default().with_env_aliases(lookup_from(&[("SERPAPI_API_KEY", "sk-live-123")]));
        let rendered = format!("{:?}", config.provider);
        assert!(!rendered.contains("sk-live-123"));
    }

    #[test]
    fn test_file_then_environment_then_legacy_names() {
        let base = std::env::temp_dir().join(format!("relay-config-{}", uuid::Uuid::new_v4()));
        let file = base.with_extension("toml");
        std::fs::write(
            &file,
            r#"
[server]
port = 9000
max_body_bytes = 2048

[provider]
engine = "from_file"
timeout_ms = 5000

[relay]
max_results = 3
"#,
        )
        .unwrap();

        std::env::set_var("RELAY__PROVIDER__ENGINE", "from_env");
        std::env::set_var("RELAY__SERVER__PORT", "9100");
        std::env::set_var("PORT", "9200");

        let loaded = Config::from_file(base.to_str().unwrap());

        std::env::remove_var("RELAY__PROVIDER__ENGINE");
        std::env::remove_var("RELAY__SERVER__PORT");
        std::env::remove_var("PORT");
        std::fs::remove_file(&file).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.provider.engine, "from_env");
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.max_body_bytes, 2048);
        assert_eq!(config.provider.timeout_ms, 5000);
        assert_eq!(config.relay.max_results, 3);
        assert_eq!(config.provider.endpoint, "https://serpapi.com/search.json");
    }

    #[test]
    fn test_duration_conversion() {
        let config = ProviderConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(30_000));
    }
}
