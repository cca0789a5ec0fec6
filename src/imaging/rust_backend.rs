//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, BMP) | `image` crate, format sniffed from content, extension as fallback |
//! | Resample | `image::DynamicImage::resize_exact` with the configured filter (Lanczos3 by default) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` + JFIF pixel density |
//! | Encode → PNG | `png::Encoder` + `pHYs` pixel dimensions |
//! | Encode → TIFF | `tiff::encoder::TiffEncoder` + `XResolution`/`YResolution` |
//! | Encode → BMP | `image::codecs::bmp::BmpEncoder`, pixels-per-meter patched into the header |
//!
//! Output is always 8 bits per channel. JPEG output drops any alpha channel.

use super::backend::{BackendError, Dimensions, ImageBackend, SourceFile};
use super::params::{EncodeParams, MediaType, ResampleParams};
use super::resolution::{BMP_X_PPM_OFFSET, dpi_to_pixels_per_meter};
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{
    DynamicImage, ExtendedColorType, GrayAlphaImage, GrayImage, ImageReader, RgbImage, RgbaImage,
};
use std::io::Cursor;

/// Default ceiling on decoded pixel count (200 megapixels).
pub const DEFAULT_MAX_PIXELS: u64 = 209_715_200;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    max_pixels: u64,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Refuse to decode rasters with more than `max_pixels` pixels.
    pub fn with_max_pixels(max_pixels: u64) -> Self {
        Self { max_pixels }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a reader over in-memory bytes.
///
/// The format is sniffed from the content first, like most image tools do;
/// the declared media type only fills in when sniffing finds nothing.
fn reader(source: &SourceFile) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    let mut reader = ImageReader::new(Cursor::new(source.bytes.as_slice())).with_guessed_format()?;
    if reader.format().is_none() {
        reader.set_format(source.media.image_format());
    }
    Ok(reader)
}

fn decode_error(source: &SourceFile, e: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to decode {}: {}", source.path.display(), e))
}

// ---------------------------------------------------------------------------
// 8-bit pixel buffers for the encoders
// ---------------------------------------------------------------------------

enum Pixels {
    Luma(GrayImage),
    LumaAlpha(GrayAlphaImage),
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Pixels {
    /// Convert to the closest 8-bit layout, keeping alpha and grayscale.
    fn from_image(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(img) => Pixels::Luma(img.clone()),
            DynamicImage::ImageLumaA8(img) => Pixels::LumaAlpha(img.clone()),
            DynamicImage::ImageLuma16(_) => Pixels::Luma(image.to_luma8()),
            DynamicImage::ImageLumaA16(_) => Pixels::LumaAlpha(image.to_luma_alpha8()),
            _ if image.color().has_alpha() => Pixels::Rgba(image.to_rgba8()),
            _ => Pixels::Rgb(image.to_rgb8()),
        }
    }

    /// Same, without an alpha channel (JPEG).
    fn opaque(image: &DynamicImage) -> Self {
        match Self::from_image(image) {
            Pixels::LumaAlpha(_) => Pixels::Luma(image.to_luma8()),
            Pixels::Rgba(_) => Pixels::Rgb(image.to_rgb8()),
            other => other,
        }
    }

    /// Same, with grayscale widened to RGB (BMP).
    fn color(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            Pixels::Rgba(image.to_rgba8())
        } else {
            Pixels::Rgb(image.to_rgb8())
        }
    }

    fn raw(&self) -> (&[u8], ExtendedColorType) {
        match self {
            Pixels::Luma(img) => (img.as_raw(), ExtendedColorType::L8),
            Pixels::LumaAlpha(img) => (img.as_raw(), ExtendedColorType::La8),
            Pixels::Rgb(img) => (img.as_raw(), ExtendedColorType::Rgb8),
            Pixels::Rgba(img) => (img.as_raw(), ExtendedColorType::Rgba8),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

fn encode_jpeg(image: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
    let pixels = Pixels::opaque(image);
    let (data, color) = pixels.raw();
    let density = u16::try_from(params.dpi).map_err(|_| {
        BackendError::ProcessingFailed(format!(
            "JPEG density {} dpi does not fit the JFIF header",
            params.dpi
        ))
    })?;

    let mut buf = Vec::new();
    {
        let mut encoder = match params.quality {
            Some(quality) => JpegEncoder::new_with_quality(&mut buf, quality.value()),
            None => JpegEncoder::new(&mut buf),
        };
        encoder.set_pixel_density(PixelDensity::dpi(density));
        encoder
            .encode(data, image.width(), image.height(), color)
            .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    }
    Ok(buf)
}

fn encode_png(image: &DynamicImage, dpi: u32) -> Result<Vec<u8>, BackendError> {
    let pixels = Pixels::from_image(image);
    let (data, _) = pixels.raw();
    let color = match pixels {
        Pixels::Luma(_) => png::ColorType::Grayscale,
        Pixels::LumaAlpha(_) => png::ColorType::GrayscaleAlpha,
        Pixels::Rgb(_) => png::ColorType::Rgb,
        Pixels::Rgba(_) => png::ColorType::Rgba,
    };
    let ppm = dpi_to_pixels_per_meter(dpi);
    let png_error = |e: png::EncodingError| {
        BackendError::ProcessingFailed(format!("PNG encode failed: {}", e))
    };

    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder.write_header().map_err(png_error)?;
    writer.write_image_data(data).map_err(png_error)?;
    writer.finish().map_err(png_error)?;
    Ok(buf)
}

fn encode_tiff(image: &DynamicImage, dpi: u32) -> Result<Vec<u8>, BackendError> {
    use tiff::encoder::{Rational, TiffEncoder, colortype};
    use tiff::tags::ResolutionUnit;

    let tiff_error =
        |e: tiff::TiffError| BackendError::ProcessingFailed(format!("TIFF encode failed: {}", e));
    let (width, height) = (image.width(), image.height());
    let resolution = Rational { n: dpi, d: 1 };

    let mut buf = Vec::new();
    {
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).map_err(tiff_error)?;
        match Pixels::from_image(image) {
            Pixels::Luma(img) => {
                let mut out = encoder
                    .new_image::<colortype::Gray8>(width, height)
                    .map_err(tiff_error)?;
                out.resolution(ResolutionUnit::Inch, resolution);
                out.write_data(img.as_raw()).map_err(tiff_error)?;
            }
            Pixels::Rgb(img) => {
                let mut out = encoder
                    .new_image::<colortype::RGB8>(width, height)
                    .map_err(tiff_error)?;
                out.resolution(ResolutionUnit::Inch, resolution);
                out.write_data(img.as_raw()).map_err(tiff_error)?;
            }
            // No gray+alpha color type in the TIFF encoder; widen to RGBA
            Pixels::LumaAlpha(_) | Pixels::Rgba(_) => {
                let img = image.to_rgba8();
                let mut out = encoder
                    .new_image::<colortype::RGBA8>(width, height)
                    .map_err(tiff_error)?;
                out.resolution(ResolutionUnit::Inch, resolution);
                out.write_data(img.as_raw()).map_err(tiff_error)?;
            }
        }
    }
    Ok(buf)
}

fn encode_bmp(image: &DynamicImage, dpi: u32) -> Result<Vec<u8>, BackendError> {
    let pixels = Pixels::color(image);
    let (data, color) = pixels.raw();

    let mut buf = Vec::new();
    BmpEncoder::new(&mut buf)
        .encode(data, image.width(), image.height(), color)
        .map_err(|e| BackendError::ProcessingFailed(format!("BMP encode failed: {}", e)))?;

    // The encoder leaves biXPelsPerMeter / biYPelsPerMeter at zero
    let ppm = (dpi_to_pixels_per_meter(dpi) as i32).to_le_bytes();
    if buf.len() < BMP_X_PPM_OFFSET + 8 {
        return Err(BackendError::ProcessingFailed(
            "BMP encoder produced a truncated header".into(),
        ));
    }
    buf[BMP_X_PPM_OFFSET..BMP_X_PPM_OFFSET + 4].copy_from_slice(&ppm);
    buf[BMP_X_PPM_OFFSET + 4..BMP_X_PPM_OFFSET + 8].copy_from_slice(&ppm);
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &SourceFile) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(source)?
            .into_dimensions()
            .map_err(|e| decode_error(source, e))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, source: &SourceFile) -> Result<DynamicImage, BackendError> {
        let dims = self.identify(source)?;
        let pixels = dims.width as u64 * dims.height as u64;
        if pixels > self.max_pixels {
            return Err(decode_error(
                source,
                format!(
                    "{}x{} exceeds the {} pixel limit",
                    dims.width, dims.height, self.max_pixels
                ),
            ));
        }

        let mut reader = reader(source)?;
        reader.no_limits();
        reader.decode().map_err(|e| decode_error(source, e))
    }

    fn resample(&self, image: &DynamicImage, params: &ResampleParams) -> DynamicImage {
        image.resize_exact(params.width, params.height, params.filter.filter_type())
    }

    fn encode(
        &self,
        image: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, BackendError> {
        match params.format {
            MediaType::Jpeg => encode_jpeg(image, params),
            MediaType::Png => encode_png(image, params.dpi),
            MediaType::Tiff => encode_tiff(image, params.dpi),
            MediaType::Bmp => encode_bmp(image, params.dpi),
        }
    }
}
