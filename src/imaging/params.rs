//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which variants to produce) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`MediaType`]: The four accepted source types; also selects the output encoder.
//! - [`Quality`]: JPEG encoding quality (1–100, default 95). Clamped on construction.
//! - [`ResampleFilter`]: Resampling algorithm, configured by name.
//! - [`ResampleParams`]: Target dimensions plus filter.
//! - [`EncodeParams`]: Output format, embedded DPI, optional quality.

use image::ImageFormat;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declared media type of a source file, as sniffed from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Jpeg,
    Png,
    Tiff,
    Bmp,
}

/// Extension → media type table. Matching is case-insensitive.
const EXTENSIONS: &[(&str, MediaType)] = &[
    ("jpg", MediaType::Jpeg),
    ("jpeg", MediaType::Jpeg),
    ("jpe", MediaType::Jpeg),
    ("png", MediaType::Png),
    ("tif", MediaType::Tiff),
    ("tiff", MediaType::Tiff),
    ("bmp", MediaType::Bmp),
];

impl MediaType {
    /// Classify a path by its extension. `None` for anything outside the allow-list.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        EXTENSIONS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
            .map(|(_, media)| *media)
    }

    /// Classify bytes by their signature. `None` for anything that is not one
    /// of the four accepted types.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Jpeg => Some(MediaType::Jpeg),
            ImageFormat::Png => Some(MediaType::Png),
            ImageFormat::Tiff => Some(MediaType::Tiff),
            ImageFormat::Bmp => Some(MediaType::Bmp),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            MediaType::Jpeg => ImageFormat::Jpeg,
            MediaType::Png => ImageFormat::Png,
            MediaType::Tiff => ImageFormat::Tiff,
            MediaType::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Quality setting for lossy (JPEG) encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Resampling algorithm, named the way it appears in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parameters for a resample operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleParams {
    pub width: u32,
    pub height: u32,
    pub filter: ResampleFilter,
}

/// Parameters for encoding a derived raster.
///
/// `quality` is only honoured by the JPEG encoder; `None` means the
/// encoder's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: MediaType,
    pub dpi: u32,
    pub quality: Option<Quality>,
}
