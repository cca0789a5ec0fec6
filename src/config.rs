//! Run configuration module.
//!
//! Handles loading, validating, and merging `downsample.toml`. Stock defaults
//! are the base layer; a user file overrides any subset of keys. The result
//! is validated once and passed by reference to every stage; nothing reads
//! configuration after startup.
//!
//! ## Config File Location
//!
//! `downsample.toml` in the working directory is picked up automatically and
//! may be absent. `--config PATH` points somewhere else, and then the file
//! must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! target_dpis = [72, 300, 600, 1200]
//!
//! [dimensions]
//! max_edge = 10000          # Longest edge ceiling in pixels
//! min_edge = 100            # Longest edge floor in pixels
//! enforce_max = true
//! enforce_min = true
//!
//! [source]
//! default_dpi = 1200        # Assumed when a file carries no resolution
//! max_pixels = 209715200    # Larger rasters are refused as decode errors
//!
//! [encoding]
//! filter = "lanczos3"       # nearest | triangle | catmullrom | gaussian | lanczos3
//! jpeg_quality = 95         # 1-100
//! apply_jpeg_quality = true # false = encoder default
//!
//! [byte_budget]
//! max_bytes = 10485760      # Per output file
//! policy = "warn"           # off | warn | block
//!
//! [processing]
//! parallel = false          # Process files on a worker pool
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [log]
//! file = "downsample.log"   # Truncated at the start of every run
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! target_dpis = [72, 150]
//!
//! [byte_budget]
//! policy = "block"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    BudgetPolicy, ByteBudget, EdgeBounds, Quality, ResampleFilter, VariantSettings,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "downsample.toml";

/// Largest target resolution every output format can embed.
pub const MAX_TARGET_DPI: u32 = u16::MAX as u32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run configuration loaded from `downsample.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownsampleConfig {
    /// Output resolutions, processed in this order for every file.
    pub target_dpis: Vec<u32>,
    /// Longest-edge clamp.
    pub dimensions: DimensionsConfig,
    /// Source resolution fallback and decode limits.
    pub source: SourceConfig,
    /// Resampling filter and JPEG quality.
    pub encoding: EncodingConfig,
    /// Per-output size ceiling.
    pub byte_budget: ByteBudgetConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Run log location.
    pub log: LogConfig,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            target_dpis: vec![72, 300, 600, 1200],
            dimensions: DimensionsConfig::default(),
            source: SourceConfig::default(),
            encoding: EncodingConfig::default(),
            byte_budget: ByteBudgetConfig::default(),
            processing: ProcessingConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl DownsampleConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_dpis.is_empty() {
            return Err(ConfigError::Validation(
                "target_dpis must not be empty".into(),
            ));
        }
        if self.target_dpis.contains(&0) {
            return Err(ConfigError::Validation(
                "target_dpis values must be non-zero".into(),
            ));
        }
        // JFIF stores density as a 16-bit value
        if let Some(dpi) = self.target_dpis.iter().find(|dpi| **dpi > MAX_TARGET_DPI) {
            return Err(ConfigError::Validation(format!(
                "target_dpis value {} exceeds the maximum of {}",
                dpi, MAX_TARGET_DPI
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.target_dpis.iter().find(|dpi| !seen.insert(**dpi)) {
            return Err(ConfigError::Validation(format!(
                "target_dpis contains {} more than once",
                dup
            )));
        }
        if self.dimensions.max_edge == 0 {
            return Err(ConfigError::Validation(
                "dimensions.max_edge must be non-zero".into(),
            ));
        }
        if self.dimensions.min_edge >= self.dimensions.max_edge {
            return Err(ConfigError::Validation(
                "dimensions.min_edge must be less than dimensions.max_edge".into(),
            ));
        }
        if self.source.default_dpi == 0 {
            return Err(ConfigError::Validation(
                "source.default_dpi must be non-zero".into(),
            ));
        }
        if self.source.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "source.max_pixels must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.log.file.as_os_str().is_empty() {
            return Err(ConfigError::Validation("log.file must not be empty".into()));
        }
        Ok(())
    }

    /// Longest-edge bounds with the enforce toggles applied.
    pub fn edge_bounds(&self) -> EdgeBounds {
        let dims = &self.dimensions;
        EdgeBounds {
            min: dims.enforce_min.then_some(dims.min_edge),
            max: dims.enforce_max.then_some(dims.max_edge),
        }
    }

    /// JPEG quality to pass to the encoder; `None` keeps the encoder default.
    pub fn jpeg_quality(&self) -> Option<Quality> {
        self.encoding
            .apply_jpeg_quality
            .then(|| Quality::new(self.encoding.jpeg_quality))
    }

    /// Everything the per-variant operations need, in one value.
    pub fn variant_settings(&self) -> VariantSettings {
        VariantSettings {
            bounds: self.edge_bounds(),
            filter: self.encoding.filter,
            jpeg_quality: self.jpeg_quality(),
            budget: ByteBudget {
                max_bytes: self.byte_budget.max_bytes,
                policy: self.byte_budget.policy,
            },
        }
    }
}

/// Longest-edge clamp settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DimensionsConfig {
    pub max_edge: u32,
    pub min_edge: u32,
    /// Cap the longest edge at `max_edge`.
    pub enforce_max: bool,
    /// Raise the longest edge to `min_edge`. This can upscale small images.
    pub enforce_min: bool,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        Self {
            max_edge: 10000,
            min_edge: 100,
            enforce_max: true,
            enforce_min: true,
        }
    }
}

/// Source image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Resolution assumed for files without usable embedded metadata.
    pub default_dpi: u32,
    /// Rasters with more pixels than this fail to decode.
    pub max_pixels: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            default_dpi: 1200,
            max_pixels: 209_715_200,
        }
    }
}

/// Resampling and encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    pub filter: ResampleFilter,
    pub jpeg_quality: u32,
    pub apply_jpeg_quality: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            filter: ResampleFilter::Lanczos3,
            jpeg_quality: 95,
            apply_jpeg_quality: true,
        }
    }
}

/// Per-output byte ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ByteBudgetConfig {
    pub max_bytes: u64,
    pub policy: BudgetPolicy,
}

impl Default for ByteBudgetConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            policy: BudgetPolicy::Warn,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Process files on a worker pool. Reports keep source order either way.
    pub parallel: bool,
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
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
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Run log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("downsample.log"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(DownsampleConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<DownsampleConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DownsampleConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the run configuration.
///
/// With `explicit = Some(path)` the file must exist. Without it,
/// [`DEFAULT_CONFIG_FILE`] is used if present and stock defaults otherwise.
/// User values are merged on top of stock defaults, unknown keys are
/// rejected, and the result is validated.
pub fn load_config(explicit: Option<&Path>) -> Result<DownsampleConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `downsample.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Downsampler Configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Output resolutions in dots per inch. One output directory per value,
# named <source>_images_<dpi>dpi. Targets above a file's own resolution
# are skipped for that file.
target_dpis = [72, 300, 600, 1200]

# ---------------------------------------------------------------------------
# Longest-edge clamp
# ---------------------------------------------------------------------------
[dimensions]
# Ceiling on the longest edge of every output, in pixels.
max_edge = 10000

# Floor on the longest edge of every output, in pixels.
# Must be less than max_edge. Note that the floor is applied after the
# resolution check, so a small image can be upscaled past its own size.
min_edge = 100

# Toggle each side of the clamp.
enforce_max = true
enforce_min = true

# ---------------------------------------------------------------------------
# Source images
# ---------------------------------------------------------------------------
[source]
# Resolution assumed when a file has no usable embedded resolution.
default_dpi = 1200

# Files with more pixels than this are refused (200 megapixels).
max_pixels = 209715200

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# Resampling filter: nearest, triangle, catmullrom, gaussian, lanczos3.
filter = "lanczos3"

# JPEG quality (1 = worst, 100 = best). Other formats are lossless.
jpeg_quality = 95

# Set to false to use the encoder's default JPEG quality instead.
apply_jpeg_quality = true

# ---------------------------------------------------------------------------
# Byte budget
# ---------------------------------------------------------------------------
[byte_budget]
# Maximum encoded size of a single output file, in bytes (10 MiB).
max_bytes = 10485760

# What happens when an output is over budget:
#   off   - no check
#   warn  - log a warning and write the file anyway
#   block - log a skip and do not write the file
policy = "warn"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Process files in parallel. Output and logs are identical to a
# sequential run; only the wall-clock time changes.
parallel = false

# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Run log
# ---------------------------------------------------------------------------
[log]
# Every run truncates this file and then appends one line per event.
file = "downsample.log"
"##
}
