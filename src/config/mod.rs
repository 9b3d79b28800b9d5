//! Configuration module for Audioshelf
//!
//! This module handles loading, merging, and validating configuration. All
//! settings have defaults; an optional TOML file and command-line flags
//! (in that order) refine them.
//!
//! # Example
//!
//! ```no_run
//! use audioshelf::config::{resolve_config, ConfigOverrides};
//! use std::path::Path;
//!
//! let (config, _hash) =
//!     resolve_config(Some(Path::new("audioshelf.toml")), ConfigOverrides::default()).unwrap();
//! println!("Harvesting media type: {}", config.ingest.media_type);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CatalogConfig, Config, IngestConfig, OutputConfig, PacingConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, resolve_config, ConfigOverrides};
