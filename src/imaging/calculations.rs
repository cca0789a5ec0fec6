//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Rounding
//!
//! Every pixel length is truncated toward zero, and the final dimensions are
//! always derived from the *original* pixel size in a single step: the long
//! edge is scaled (or clamped) first, then the short edge is computed from the
//! new long edge and the original ratio. Nothing is ever rescaled from an
//! already-truncated intermediate, so there is exactly one truncation per edge.
//! Integer arithmetic (`u64`) is used throughout so no float error creeps in.

/// Bounds on the longest edge of a derived image. `None` disables that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeBounds {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// Outcome of planning one (image, target DPI) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePlan {
    /// Target DPI is above the source DPI; nothing is produced.
    ExceedsSource,
    /// Resample to these dimensions.
    Resize { width: u32, height: u32 },
}

/// Compute the output dimensions for one target resolution.
///
/// # Arguments
/// * `original` - Source pixel dimensions (width, height)
/// * `source_dpi` - Embedded or assumed source resolution (values below 1 are treated as 1)
/// * `target_dpi` - Requested output resolution
/// * `bounds` - Longest-edge clamp
///
/// The minimum clamp runs after the resolution check, so it can push the
/// longest edge above the source's own longest edge. See
/// `min_clamp_upscales_past_source_pixels` in the tests.
///
/// # Examples
/// ```
/// # use image_downsampler::imaging::calculations::{calculate_target_dimensions, EdgeBounds, ScalePlan};
/// let plan = calculate_target_dimensions((4000, 3000), 300, 72, EdgeBounds::default());
/// assert_eq!(plan, ScalePlan::Resize { width: 960, height: 720 });
/// ```
pub fn calculate_target_dimensions(
    original: (u32, u32),
    source_dpi: u32,
    target_dpi: u32,
    bounds: EdgeBounds,
) -> ScalePlan {
    let source_dpi = source_dpi.max(1);
    if target_dpi > source_dpi {
        return ScalePlan::ExceedsSource;
    }

    let (orig_w, orig_h) = original;
    let landscape = orig_w >= orig_h;
    let long = longest_edge(original);
    let short = orig_w.min(orig_h);

    let mut new_long = scale_edge(long, target_dpi, source_dpi);
    if let Some(max) = bounds.max {
        new_long = new_long.min(max);
    }
    if let Some(min) = bounds.min {
        new_long = new_long.max(min);
    }
    let new_long = new_long.max(1);
    let new_short = derive_short_edge(new_long, long, short).max(1);

    let (width, height) = if landscape {
        (new_long, new_short)
    } else {
        (new_short, new_long)
    };
    ScalePlan::Resize { width, height }
}

/// `edge * numerator / denominator`, truncated.
fn scale_edge(edge: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = edge as u64 * numerator as u64 / denominator as u64;
    scaled.min(u32::MAX as u64) as u32
}

/// Short edge for a new long edge, preserving the original ratio exactly.
fn derive_short_edge(new_long: u32, long: u32, short: u32) -> u32 {
    if long == 0 {
        return 0;
    }
    scale_edge(short, new_long, long)
}

/// Longest edge of a `(width, height)` pair.
pub fn longest_edge(dims: (u32, u32)) -> u32 {
    dims.0.max(dims.1)
}
