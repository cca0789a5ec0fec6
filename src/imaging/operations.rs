//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.
//! The pipeline in [`crate::process`] strings them together per file:
//!
//! 1. [`load_source`] reads the file into memory once.
//! 2. [`source_resolution`] picks the embedded DPI or the configured default.
//! 3. [`plan_variant`] decides whether a target DPI is produced and at what size.
//! 4. [`render_variant`] resamples, encodes, and checks the byte budget.
//! 5. [`save_variant`] writes the encoded bytes.

use super::backend::{BackendError, ImageBackend, SourceFile};
use super::calculations::{EdgeBounds, ScalePlan, calculate_target_dimensions};
use super::params::{EncodeParams, MediaType, Quality, ResampleFilter, ResampleParams};
use super::resolution::read_dpi;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Read a source file into memory.
pub fn load_source(path: &Path, media: MediaType) -> Result<SourceFile> {
    let bytes = std::fs::read(path)?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        media,
        bytes,
    })
}

/// Where the effective source resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DpiOrigin {
    Embedded,
    Default,
}

/// Effective source resolution used for scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceResolution {
    pub dpi: u32,
    pub origin: DpiOrigin,
}

/// Prefer the resolution embedded in the file, else fall back to `default_dpi`.
///
/// The container is parsed as what the bytes are, not what the extension
/// claims, matching how the decoder picks its format.
pub fn source_resolution(source: &SourceFile, default_dpi: u32) -> SourceResolution {
    let media = MediaType::sniff(&source.bytes).unwrap_or(source.media);
    match read_dpi(&source.bytes, media) {
        Some(dpi) => SourceResolution {
            dpi,
            origin: DpiOrigin::Embedded,
        },
        None => SourceResolution {
            dpi: default_dpi,
            origin: DpiOrigin::Default,
        },
    }
}

/// What to do when an encoded variant is larger than the byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPolicy {
    /// No check.
    Off,
    /// Record a warning and write anyway.
    #[default]
    Warn,
    /// Record a skip and do not write.
    Block,
}

/// Per-output byte ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteBudget {
    pub max_bytes: u64,
    pub policy: BudgetPolicy,
}

/// Result of checking one encoded buffer against the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetVerdict {
    Within,
    /// Over budget under [`BudgetPolicy::Warn`].
    Warn,
    /// Over budget under [`BudgetPolicy::Block`].
    Block,
}

impl ByteBudget {
    pub fn check(&self, len: u64) -> BudgetVerdict {
        if len <= self.max_bytes {
            return BudgetVerdict::Within;
        }
        match self.policy {
            BudgetPolicy::Off => BudgetVerdict::Within,
            BudgetPolicy::Warn => BudgetVerdict::Warn,
            BudgetPolicy::Block => BudgetVerdict::Block,
        }
    }
}

/// Everything needed to turn a decoded raster into one output variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSettings {
    pub bounds: EdgeBounds,
    pub filter: ResampleFilter,
    /// JPEG quality; `None` leaves the encoder default.
    pub jpeg_quality: Option<Quality>,
    pub budget: ByteBudget,
}

/// Plan the output size of one (image, target DPI) pair.
pub fn plan_variant(
    dims: (u32, u32),
    source: SourceResolution,
    target_dpi: u32,
    settings: &VariantSettings,
) -> ScalePlan {
    calculate_target_dimensions(dims, source.dpi, target_dpi, settings.bounds)
}

/// An encoded variant, ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedVariant {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
    pub budget: BudgetVerdict,
}

/// Resample `image` to `(width, height)` and encode it for `target_dpi`.
///
/// The encoded buffer is both the budget measurement and the bytes that
/// get written, so the check and the file can never disagree.
pub fn render_variant(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    media: MediaType,
    target_dpi: u32,
    (width, height): (u32, u32),
    settings: &VariantSettings,
) -> Result<RenderedVariant> {
    let resampled = backend.resample(
        image,
        &ResampleParams {
            width,
            height,
            filter: settings.filter,
        },
    );

    let quality = match media {
        MediaType::Jpeg => settings.jpeg_quality,
        _ => None,
    };
    let bytes = backend.encode(
        &resampled,
        &EncodeParams {
            format: media,
            dpi: target_dpi,
            quality,
        },
    )?;

    let budget = settings.budget.check(bytes.len() as u64);
    Ok(RenderedVariant {
        width,
        height,
        bytes,
        budget,
    })
}

/// Write encoded bytes, creating the parent directory if needed.
/// An existing file at `path` is overwritten.
pub fn save_variant(bytes: &[u8], path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}
