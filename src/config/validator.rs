use crate::config::{parse_duration, Config};
use crate::error::{ModlinkerError, Result, ValidationError};
use url::Url;

/// Upper bound accepted for `linker.max_results`
const MAX_RESULTS_LIMIT: usize = 30;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        // Validate schema version
        Self::validate_schema_version(config, &mut errors);

        // Validate recognition and reply settings
        Self::validate_linker(config, &mut errors);

        // Validate catalog settings
        Self::validate_catalog(config, &mut errors);

        // Validate run loop settings
        Self::validate_bot(config, &mut errors);

        // Validate storage settings
        Self::validate_storage(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ModlinkerError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_linker(config: &Config, errors: &mut Vec<ValidationError>) {
        let linker = &config.linker;

        if linker.current_version.trim().parse::<f64>().is_err() {
            errors.push(ValidationError::new(
                "linker.current_version",
                format!(
                    "Current version must be numeric (e.g. \"1.0\"), got '{}'",
                    linker.current_version
                ),
            ));
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&linker.max_results) {
            errors.push(ValidationError::new(
                "linker.max_results",
                format!(
                    "Max results must be between 1 and {}, got {}",
                    MAX_RESULTS_LIMIT, linker.max_results
                ),
            ));
        }

        // The footer goes on every message, so it must leave room for content
        let footer_len = linker.footer.chars().count();
        if footer_len >= linker.max_length {
            errors.push(ValidationError::new(
                "linker.footer",
                format!(
                    "Footer ({} chars) must be shorter than max_length ({})",
                    footer_len, linker.max_length
                ),
            ));
        }
    }

    fn validate_catalog(config: &Config, errors: &mut Vec<ValidationError>) {
        let catalog = &config.catalog;

        for (path, value) in [
            ("catalog.browse_url", &catalog.browse_url),
            ("catalog.item_url", &catalog.item_url),
            ("catalog.api_url", &catalog.api_url),
        ] {
            if Url::parse(value).is_err() {
                errors.push(ValidationError::new(path, format!("Invalid URL: {}", value)));
            }
        }

        if catalog.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "catalog.api_key_env",
                "API key environment variable name cannot be empty",
            ));
        }

        if catalog.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "catalog.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_bot(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.bot.username.trim().is_empty() {
            errors.push(ValidationError::new(
                "bot.username",
                "Username cannot be empty",
            ));
        }

        if parse_duration(&config.bot.ratelimit_backoff).is_none() {
            errors.push(ValidationError::new(
                "bot.ratelimit_backoff",
                format!("Invalid duration format: {}", config.bot.ratelimit_backoff),
            ));
        }

        if config.bot.max_post_attempts == 0 {
            errors.push(ValidationError::new(
                "bot.max_post_attempts",
                "Max post attempts must be greater than 0",
            ));
        }
    }

    fn validate_storage(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.storage.database.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.database",
                "Database path cannot be empty",
            ));
        }
    }
}
