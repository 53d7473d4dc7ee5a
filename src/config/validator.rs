use thiserror::Error;

use crate::config::{CatalogConfig, EngineConfig, Settings, UsageConfig};
use crate::agents::config::AgentConfig;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        errors.extend(Self::validate_catalog(&settings.catalog));
        errors.extend(Self::validate_engine(&settings.engine));
        errors.extend(Self::validate_agent(&settings.agent));
        errors.extend(Self::validate_usage(&settings.usage));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Only the catalog section; enough for probing the server
    pub fn validate_catalog_section(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let errors = Self::validate_catalog(&settings.catalog);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_catalog(catalog: &CatalogConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let url = catalog.url.trim();
        if url.is_empty() {
            errors.push(ValidationError::MissingField("catalog.url".to_string()));
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ValidationError::InvalidValue {
                field: "catalog.url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }

        if catalog.api_key.trim().is_empty() {
            errors.push(ValidationError::MissingField("catalog.api_key".to_string()));
        }

        if catalog.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "catalog.timeout_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_engine(engine: &EngineConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if engine.model.trim().is_empty() {
            errors.push(ValidationError::MissingField("engine.model".to_string()));
        }

        if engine.resolve_api_key().is_none() {
            errors.push(ValidationError::MissingField(format!(
                "engine.api_key (or environment variable {})",
                engine.api_key_env_name()
            )));
        }

        errors
    }

    fn validate_agent(agent: &AgentConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if agent.max_rounds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "agent.max_rounds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if agent.round_timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "agent.round_timeout_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if agent.search_result_limit == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "agent.search_result_limit".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        errors
    }

    fn validate_usage(usage: &UsageConfig) -> Vec<ValidationError> {
        if !usage.cost_per_token.is_finite() || usage.cost_per_token < 0.0 {
            return vec![ValidationError::InvalidValue {
                field: "usage.cost_per_token".to_string(),
                reason: "must be a non-negative number".to_string(),
            }];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        Settings {
            catalog: CatalogConfig {
                url: "http://localhost:5055".to_string(),
                api_key: "catalog-key".to_string(),
                timeout_seconds: 15,
            },
            engine: EngineConfig {
                api_key: Some("gemini-key".to_string()),
                api_key_env: Some("MARQUEE_TEST_UNSET_KEY_VAR".to_string()),
                ..Default::default()
            },
            agent: AgentConfig::default(),
            usage: UsageConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(ConfigValidator::validate(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_credentials() {
        let mut settings = valid_settings();
        settings.catalog.api_key = String::new();
        settings.engine.api_key = None;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::MissingField(_))));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut settings = valid_settings();
        settings.catalog.url = "overseerr.local:5055".to_string();

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let mut settings = valid_settings();
        settings.agent.max_rounds = 0;
        settings.usage.cost_per_token = -1.0;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
