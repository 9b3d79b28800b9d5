use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Values supplied on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub languages: Option<Vec<String>>,
    pub media_type: Option<String>,
    pub metadata_path: Option<String>,
    pub debug: bool,
}

impl Config {
    /// Applies command-line overrides on top of file or default values
    ///
    /// `debug` can only be switched on from the command line, never off.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(languages) = overrides.languages {
            if !languages.is_empty() {
                self.ingest.languages = languages;
            }
        }
        if let Some(media_type) = overrides.media_type {
            self.ingest.media_type = media_type;
        }
        if let Some(path) = overrides.metadata_path {
            self.output.metadata_path = path;
        }
        if overrides.debug {
            self.ingest.debug = true;
        }
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use audioshelf::config::load_config;
///
/// let config = load_config(Path::new("audioshelf.toml")).unwrap();
/// println!("Languages: {:?}", config.ingest.languages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = parse_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run log can be matched to the file that drove it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Builds the effective configuration for a run
///
/// Starts from the file at `path` when one is given (defaults otherwise),
/// applies the command-line overrides, and validates the merged result.
/// The file alone is never validated, so an override can repair it.
///
/// # Returns
///
/// * `Ok((Config, Option<String>))` - Effective configuration and the file hash, if any
/// * `Err(ConfigError)` - The file could not be read or the merged values are invalid
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(Config, Option<String>), ConfigError> {
    let (mut config, hash) = match path {
        Some(path) => {
            let config = parse_config(path)?;
            (config, Some(compute_config_hash(path)?))
        }
        None => (Config::default(), None),
    };

    config.apply_overrides(overrides);
    validate(&config)?;

    Ok((config, hash))
}
