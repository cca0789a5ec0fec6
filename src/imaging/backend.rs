//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, decode, resample, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust, built on the
//! `image` crate. Writing encoded bytes to disk is not a backend concern; see
//! [`operations::save_variant`](super::operations::save_variant).

use super::params::{EncodeParams, MediaType, ResampleParams};
use image::DynamicImage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A source file read into memory, ready for identify/decode.
///
/// The bytes are read once and shared by the resolution reader and the
/// decoder, so each file is opened exactly once per run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub media: MediaType,
    pub bytes: Vec<u8>,
}

/// Trait for image processing backends.
///
/// `resample` takes the source raster by shared reference: the same decoded
/// image is resampled once per target resolution and must stay intact.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode.
    fn identify(&self, source: &SourceFile) -> Result<Dimensions, BackendError>;

    /// Decode the full raster.
    fn decode(&self, source: &SourceFile) -> Result<DynamicImage, BackendError>;

    /// Produce a new raster at the requested dimensions.
    fn resample(&self, image: &DynamicImage, params: &ResampleParams) -> DynamicImage;

    /// Encode a raster into an in-memory file, embedding the target resolution.
    fn encode(
        &self,
        image: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, BackendError>;
}
