//! Embedded-resolution reader for JPEG, PNG, TIFF and BMP files.
//!
//! Extracts the horizontal resolution and normalizes it to dots per inch:
//! - JPEG: JFIF APP0 density (units 1 = dpi, 2 = dots/cm), falling back to
//!   EXIF `XResolution` / `ResolutionUnit` via `kamadak-exif`.
//! - PNG: `pHYs` pixel dimensions as reported by `png::Decoder` (only the
//!   meter unit carries a physical resolution).
//! - TIFF: first-IFD `XResolution` / `ResolutionUnit` via `tiff::decoder`.
//! - BMP: `biXPelsPerMeter` from the info header.
//!
//! Works on the bytes already read for decoding; never touches the filesystem.
//! Anything malformed, zero, or unit-less reads as "no embedded resolution".

use super::params::MediaType;
use std::io::Cursor;

const METERS_PER_INCH: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

/// Read the embedded horizontal resolution, in whole dots per inch.
///
/// `media` selects the container parser and must describe the bytes, not the
/// file name; see [`MediaType::sniff`].
pub fn read_dpi(data: &[u8], media: MediaType) -> Option<u32> {
    let dpi = match media {
        MediaType::Jpeg => read_dpi_from_jpeg(data),
        MediaType::Png => read_dpi_from_png(data),
        MediaType::Tiff => read_dpi_from_tiff(data),
        MediaType::Bmp => read_dpi_from_bmp(data),
    }?;
    let rounded = dpi.round();
    if rounded >= 1.0 && rounded <= u32::MAX as f64 {
        Some(rounded as u32)
    } else {
        None
    }
}

/// Dots per inch → pixels per meter, as stored by PNG `pHYs` and BMP headers.
pub(crate) fn dpi_to_pixels_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / METERS_PER_INCH).round() as u32
}

fn pixels_per_meter_to_dpi(ppm: f64) -> f64 {
    ppm * METERS_PER_INCH
}

/// TIFF/EXIF `ResolutionUnit`: 2 = inch (also the default), 3 = centimeter.
fn apply_resolution_unit(x_resolution: f64, unit: Option<u32>) -> Option<f64> {
    match unit.unwrap_or(2) {
        2 => Some(x_resolution),
        3 => Some(x_resolution * CM_PER_INCH),
        // 1 = no absolute unit
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JPEG: JFIF density, then EXIF
// ---------------------------------------------------------------------------

const JFIF_HEADER: &[u8] = b"JFIF\0";

fn read_dpi_from_jpeg(data: &[u8]) -> Option<f64> {
    jfif_density(data).or_else(|| read_dpi_from_exif(data))
}

/// Density from the first JFIF APP0 segment, if it declares a physical unit.
fn jfif_density(data: &[u8]) -> Option<f64> {
    jpeg_segments(data)
        .into_iter()
        .find(|(marker, segment)| *marker == 0xE0 && segment.starts_with(JFIF_HEADER))
        .and_then(|(_, segment)| jfif_payload_density(segment))
}

/// JFIF APP0 payload: "JFIF\0", version (2), units (1), Xdensity (2), Ydensity (2).
fn jfif_payload_density(segment: &[u8]) -> Option<f64> {
    if segment.len() < 12 {
        return None;
    }
    let units = segment[7];
    let x_density = u16::from_be_bytes([segment[8], segment[9]]) as f64;
    match units {
        1 => Some(x_density),
        2 => Some(x_density * CM_PER_INCH),
        // 0 = aspect ratio only
        _ => None,
    }
}

/// Collect `(marker, payload)` pairs for every header segment before SOS.
fn jpeg_segments(data: &[u8]) -> Vec<(u8, &[u8])> {
    let mut segments = Vec::new();
    if !data.starts_with(&[0xFF, 0xD8]) {
        return segments;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS (0xDA) means image data starts; stop scanning
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Markers without length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if len < 2 {
            break;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + len).min(data.len());
        segments.push((marker, &data[seg_start..seg_end]));
        pos += 2 + len;
    }
    segments
}

fn read_dpi_from_exif(data: &[u8]) -> Option<f64> {
    let fields = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;
    let x_resolution = match &fields
        .get_field(exif::Tag::XResolution, exif::In::PRIMARY)?
        .value
    {
        exif::Value::Rational(values) => values.first()?.to_f64(),
        _ => return None,
    };
    let unit = fields
        .get_field(exif::Tag::ResolutionUnit, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));
    apply_resolution_unit(x_resolution, unit)
}

// ---------------------------------------------------------------------------
// TIFF: first-IFD resolution tags
// ---------------------------------------------------------------------------

fn read_dpi_from_tiff(data: &[u8]) -> Option<f64> {
    use tiff::decoder::Decoder;
    use tiff::decoder::ifd::Value;
    use tiff::tags::Tag;

    let mut decoder = Decoder::new(Cursor::new(data)).ok()?;
    let x_resolution = match decoder.find_tag(Tag::XResolution).ok()?? {
        Value::Rational(n, d) if d != 0 => n as f64 / d as f64,
        _ => return None,
    };
    let unit = match decoder.find_tag(Tag::ResolutionUnit).ok()? {
        Some(value) => Some(value.into_u16().ok()? as u32),
        None => None,
    };
    apply_resolution_unit(x_resolution, unit)
}

// ---------------------------------------------------------------------------
// PNG: pHYs chunk
// ---------------------------------------------------------------------------

fn read_dpi_from_png(data: &[u8]) -> Option<f64> {
    let reader = png::Decoder::new(Cursor::new(data)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    // Unspecified = aspect ratio only
    matches!(dims.unit, png::Unit::Meter).then(|| pixels_per_meter_to_dpi(dims.xppu as f64))
}

// ---------------------------------------------------------------------------
// BMP: info header pixels-per-meter
// ---------------------------------------------------------------------------

/// Offset of `biXPelsPerMeter`: 14-byte file header + 24 bytes into the info header.
pub(crate) const BMP_X_PPM_OFFSET: usize = 38;

fn read_dpi_from_bmp(data: &[u8]) -> Option<f64> {
    if !data.starts_with(b"BM") || data.len() < BMP_X_PPM_OFFSET + 8 {
        return None;
    }
    let header_size = u32::from_le_bytes(data[14..18].try_into().ok()?);
    // BITMAPCOREHEADER (12 bytes) has no resolution fields
    if header_size < 40 {
        return None;
    }
    let x_ppm = i32::from_le_bytes(
        data[BMP_X_PPM_OFFSET..BMP_X_PPM_OFFSET + 4]
            .try_into()
            .ok()?,
    );
    (x_ppm > 0).then(|| pixels_per_meter_to_dpi(x_ppm as f64))
}
