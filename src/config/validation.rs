use crate::config::types::{CatalogConfig, Config, IngestConfig, OutputConfig, PacingConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_ingest_config(&config.ingest)?;
    validate_pacing_config(&config.pacing)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the catalog endpoint settings
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    validate_identifier("library", &config.library)?;
    validate_identifier("client-id", &config.client_id)?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the harvesting filters
fn validate_ingest_config(config: &IngestConfig) -> Result<(), ConfigError> {
    if config.languages.is_empty() {
        return Err(ConfigError::Validation(
            "at least one language is required".to_string(),
        ));
    }

    for language in &config.languages {
        validate_identifier("language", language)?;
    }

    validate_identifier("media-type", &config.media_type)?;

    Ok(())
}

/// Validates the delay settings
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min-delay-ms ({}) must not exceed max-delay-ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    if config.max_delay_ms > config.min_delay_ms && config.step_ms == 0 {
        return Err(ConfigError::Validation(
            "step-ms must be > 0 when max-delay-ms exceeds min-delay-ms".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("metadata-path", &config.metadata_path),
        ("debug-path", &config.debug_path),
        ("log-path", &config.log_path),
        ("database-path", &config.database_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Values that end up in the request path or query: alphanumeric, '-' and '_'
fn validate_identifier(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "{} must contain only alphanumeric characters, '-' or '_', got '{}'",
            name, value
        )));
    }

    Ok(())
}
