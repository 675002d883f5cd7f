//! Tool configuration.
//!
//! Handles loading, validating, and merging a `config.toml`. Stock defaults
//! are the base layer; a user file passed with `--config` is merged on top,
//! so it only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnail]
//! max_size = 400          # Bound on the longer side, in pixels
//! auto_orient = true      # Apply EXIF orientation before thumbnailing
//! filter = "lanczos3"     # triangle | catmull-rom | gaussian | lanczos3
//!
//! [output]
//! jpeg_quality = 75       # 1-100
//! # format = "png"        # Force an output format (default: keep the source's)
//!
//! [display]
//! temp_prefix = "simple_thumb_"
//! # temp_dir = "/tmp"     # Default: the system temp directory
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{DEFAULT_TEMP_PREFIX, Filter, FormatTag, Quality, RustBackend, TempFiles};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
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
pub struct ThumbConfig {
    pub thumbnail: ThumbnailConfig,
    pub output: OutputConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Bound on the longer side, in pixels.
    pub max_size: u32,
    /// Apply the source's EXIF orientation before resizing.
    pub auto_orient: bool,
    pub filter: Filter,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 400,
            auto_orient: true,
            filter: Filter::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100).
    pub jpeg_quality: u32,
    /// Output format name. When unset the source format is kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value(),
            format: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub temp_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            temp_dir: None,
        }
    }
}

impl ThumbConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail.max_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnail.max_size must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if let Some(name) = &self.output.format
            && name.parse::<FormatTag>().is_err()
        {
            return Err(ConfigError::Validation(format!(
                "output.format \"{name}\" is not one of bmp, gif, jpg, png, wbmp, webp"
            )));
        }
        if self.display.temp_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "display.temp_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The forced output format, if any.
    pub fn output_format(&self) -> Option<FormatTag> {
        self.output.format.as_deref().and_then(|name| name.parse().ok())
    }

    /// A backend configured with this file's filter and quality.
    pub fn backend(&self) -> RustBackend {
        RustBackend::new()
            .with_filter(self.thumbnail.filter)
            .with_quality(Quality::new(self.output.jpeg_quality))
    }

    /// Where `display` puts its scratch files.
    pub fn temp_files(&self) -> TempFiles {
        let defaults = TempFiles::default();
        TempFiles {
            dir: self.display.temp_dir.clone().unwrap_or(defaults.dir),
            prefix: self.display.temp_prefix.clone(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ThumbConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ThumbConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ThumbConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, or the stock defaults when no path is given.
///
/// A path that was asked for but cannot be read is an error.
pub fn load_config(path: Option<&Path>) -> Result<ThumbConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let value: toml::Value = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(value)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-thumb configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass the file with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Bound on the longer side, in pixels. Images already within the bound are
# copied unchanged; nothing is ever enlarged.
max_size = 400

# Rotate/mirror according to the source's EXIF Orientation tag before
# resizing, so phone photos come out upright.
auto_orient = true

# Resampling filter: "triangle", "catmull-rom", "gaussian" or "lanczos3".
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1-100). Other formats ignore it.
jpeg_quality = 75

# Force every output into one format: "bmp", "gif", "jpg", "png", "wbmp" or
# "webp". When unset, the source format is kept (PNG for new images).
# format = "png"

# ---------------------------------------------------------------------------
# Display (CGI-style output on stdout)
# ---------------------------------------------------------------------------
[display]
# Filename prefix for the scratch file written when an image has no file yet.
# The file is deleted as soon as it has been sent.
temp_prefix = "simple_thumb_"

# Directory for scratch files. Defaults to the system temp directory.
# temp_dir = "/tmp"
"##
}
