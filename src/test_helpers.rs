//! Shared test utilities.
//!
//! Synthesizes small JPEG, PNG, TIFF and BMP images in memory so tests never
//! depend on fixture files, and sets up isolated source directories.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let (tmp, src) = source_dir();
//! std::fs::write(src.join("photo.jpg"), jpeg_bytes(400, 300, Some(300))).unwrap();
//! // outputs land in tmp/source_images_<dpi>dpi/
//! ```

use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{DynamicImage, ExtendedColorType, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

/// Deterministic RGB gradient with some structure for the encoders to chew on.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x ^ y) & 0xFF) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

/// Encode a gradient as JPEG. `dpi = None` writes the encoder's default
/// aspect-ratio-only JFIF header, i.e. no usable resolution.
pub fn jpeg_bytes(width: u32, height: u32, dpi: Option<u16>) -> Vec<u8> {
    let img = gradient(width, height).to_rgb8();
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new(&mut buf);
        if let Some(dpi) = dpi {
            encoder.set_pixel_density(PixelDensity::dpi(dpi));
        }
        encoder
            .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
    }
    buf
}

/// Encode a gradient as PNG without a `pHYs` chunk.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    gradient(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Encode a gradient as 8-bit grayscale TIFF. `dpi = None` writes
/// `ResolutionUnit::None`, i.e. no physical resolution.
pub fn tiff_bytes(width: u32, height: u32, dpi: Option<u32>) -> Vec<u8> {
    use tiff::encoder::{Rational, TiffEncoder, colortype};
    use tiff::tags::ResolutionUnit;

    let img = gradient(width, height).to_luma8();
    let (unit, n) = match dpi {
        Some(dpi) => (ResolutionUnit::Inch, dpi),
        None => (ResolutionUnit::None, 1),
    };
    let mut buf = Vec::new();
    {
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
        let mut image = encoder
            .new_image::<colortype::Gray8>(width, height)
            .unwrap();
        image.resolution(unit, Rational { n, d: 1 });
        image.write_data(img.as_raw()).unwrap();
    }
    buf
}

/// Encode a gradient as BMP. `dpi = None` leaves the header's
/// pixels-per-meter fields at zero.
pub fn bmp_bytes(width: u32, height: u32, dpi: Option<u32>) -> Vec<u8> {
    use crate::imaging::resolution::{BMP_X_PPM_OFFSET, dpi_to_pixels_per_meter};

    let mut buf = Vec::new();
    gradient(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Bmp)
        .unwrap();
    if let Some(dpi) = dpi {
        let ppm = (dpi_to_pixels_per_meter(dpi) as i32).to_le_bytes();
        buf[BMP_X_PPM_OFFSET..BMP_X_PPM_OFFSET + 4].copy_from_slice(&ppm);
        buf[BMP_X_PPM_OFFSET + 4..BMP_X_PPM_OFFSET + 8].copy_from_slice(&ppm);
    }
    buf
}

/// Temp dir containing an empty `source/` directory.
///
/// Output directories are created as siblings (`source_images_72dpi/`, ...)
/// inside the same temp dir, so everything is cleaned up together.
pub fn source_dir() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("source");
    std::fs::create_dir(&src).unwrap();
    (tmp, src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_has_requested_size() {
        let img = gradient(7, 3);
        assert_eq!((img.width(), img.height()), (7, 3));
    }

    #[test]
    fn jpeg_bytes_start_with_soi() {
        assert_eq!(&jpeg_bytes(8, 8, None)[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn png_bytes_have_signature() {
        assert_eq!(&png_bytes(4, 4)[1..4], b"PNG");
    }

    #[test]
    fn tiff_bytes_have_byte_order_mark() {
        let data = tiff_bytes(4, 4, Some(300));
        assert!(data.starts_with(b"II") || data.starts_with(b"MM"));
    }

    #[test]
    fn bmp_bytes_have_signature() {
        assert_eq!(&bmp_bytes(4, 4, Some(72))[..2], b"BM");
    }

    #[test]
    fn source_dir_exists_inside_temp() {
        let (tmp, src) = source_dir();
        assert!(src.is_dir());
        assert_eq!(src.parent(), Some(tmp.path()));
    }
}
