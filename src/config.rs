//! Configuration module.
//!
//! Handles loading and validating `config.toml`. Every key is optional;
//! missing keys fall back to stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [extract]
//! exif = true               # Read EXIF fields as well as IPTC
//!
//! [upload]
//! folder = "original_images"  # Storage folder for originals
//! # date_path = "%Y/%m"       # strftime subfolder (omit for none)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Which metadata sources are read.
    pub extract: ExtractConfig,
    /// Where imported originals are stored.
    pub upload: UploadConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let folder = self.upload.folder.trim();
        if folder.is_empty() {
            return Err(ConfigError::Validation(
                "upload.folder must not be empty".into(),
            ));
        }
        if folder.starts_with('/') {
            return Err(ConfigError::Validation(
                "upload.folder must be a relative path".into(),
            ));
        }
        if let Some(date_path) = &self.upload.date_path {
            let invalid = StrftimeItems::new(date_path).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(ConfigError::Validation(format!(
                    "upload.date_path is not a valid strftime pattern: {date_path:?}"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Metadata extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Read EXIF fields and populate the camera/capture fields of new records.
    pub exif: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { exif: true }
    }
}

/// Upload path settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Folder that originals are stored under.
    pub folder: String,
    /// Optional strftime pattern for a date-based subfolder, e.g. `%Y/%m`.
    pub date_path: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: "original_images".to_string(),
            date_path: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel import workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a specific config file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load config from `config.toml` in the given directory.
///
/// Returns stock defaults when the directory has no `config.toml`.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(Config::default());
    }
    load_config_file(&config_path)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-captions configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Metadata extraction
# ---------------------------------------------------------------------------
[extract]
# Read EXIF fields (camera, lens, exposure, GPS) in addition to IPTC.
# When false, records are created without EXIF fields.
exif = true

# ---------------------------------------------------------------------------
# Upload paths
# ---------------------------------------------------------------------------
[upload]
# Folder that imported originals are stored under.
folder = "original_images"

# Optional date-based subfolder, as a strftime pattern evaluated at import
# time (UTC). Example: "%Y/%m" stores files under original_images/2024/03/.
# date_path = "%Y/%m"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch import. Omit for auto (= CPU cores).
# Values larger than the core count are clamped down.
# max_processes = 4
"##
}
