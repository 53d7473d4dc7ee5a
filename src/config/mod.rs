use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::agents::config::AgentConfig;
use crate::cli::Cli;

/// Environment variable consulted for the Gemini key when none is configured
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Blended Gemini Flash price in USD per token (input and output averaged)
pub const DEFAULT_COST_PER_TOKEN: f64 = 0.000_000_7;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub usage: UsageConfig,
}

/// Connection to the Overseerr-compatible catalog (`[catalog]` section)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    /// Server root, e.g. "http://localhost:5055"
    #[serde(default)]
    pub url: String,
    /// Value of the `X-Api-Key` header
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_catalog_timeout")]
    pub timeout_seconds: u64,
}

fn default_catalog_timeout() -> u64 {
    15
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_seconds: default_catalog_timeout(),
        }
    }
}

/// Reasoning engine configuration (`[engine]` section)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    /// Model name/identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// API key given directly (takes precedence over `api_key_env`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Environment variable containing the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Custom base URL (for proxied endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Default temperature for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Default max tokens for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            api_key_env: None,
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl EngineConfig {
    /// Name of the environment variable holding the key
    pub fn api_key_env_name(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    /// Explicit key first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.clone());
        }
        std::env::var(self.api_key_env_name())
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Usage accounting (`[usage]` section)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UsageConfig {
    /// Estimated cost per token in USD
    #[serde(default = "default_cost_per_token")]
    pub cost_per_token: f64,
}

fn default_cost_per_token() -> f64 {
    DEFAULT_COST_PER_TOKEN
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            cost_per_token: default_cost_per_token(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file plus CLI/env overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.validate()?;

        Ok(settings)
    }

    /// Same sources as [`Settings::new_with_cli`], but only the catalog
    /// section has to be valid. Used by the connection probe.
    pub fn catalog_only_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;
        settings.apply_cli_overrides(cli);
        validator::ConfigValidator::validate_catalog_section(&settings).map_err(report)?;
        Ok(settings)
    }

    /// Load `<root>/marquee.{toml,yaml,json}` if present
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("marquee");
        let settings = Self::load(File::from(config_path).required(false))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load<S>(source: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder().add_source(source).build()?;
        Ok(s.try_deserialize()?)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(url) = &cli.catalog_url {
            self.catalog.url = url.clone();
        }
        if let Some(key) = &cli.catalog_api_key {
            self.catalog.api_key = key.clone();
        }
        if let Some(key) = &cli.gemini_api_key {
            self.engine.api_key = Some(key.clone());
        }
        if let Some(model) = &cli.model {
            self.engine.model = model.clone();
        }
        if let Some(max_rounds) = cli.max_rounds {
            self.agent.max_rounds = max_rounds;
        }
    }

    /// Presence and range checks; missing credentials block the chat entirely
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(report)
    }
}

fn report(errors: Vec<validator::ValidationError>) -> anyhow::Error {
    let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    anyhow::anyhow!(
        "Configuration validation failed:\n{}",
        error_messages.join("\n")
    )
}
