//! # Image Downsampler
//!
//! Batch-converts a directory of raster images into a family of downsampled
//! variants, one per target resolution. Each variant lands in a sibling
//! directory named after its resolution and keeps the original file name
//! with a resolution suffix:
//!
//! ```text
//! tmp/source/photo.jpg          (4000x3000, 300 dpi)
//!   → tmp/source_images_72dpi/photo_72dpi.jpg     (960x720, 72 dpi)
//!   → tmp/source_images_300dpi/photo_300dpi.jpg   (4000x3000, 300 dpi)
//!     (600 and 1200 dpi are skipped: above the source resolution)
//! ```
//!
//! It is a one-shot job: walk the directory once, process every image, log
//! every outcome, exit.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lazy, sorted, non-recursive walk of the source directory; media type by extension |
//! | [`process`] | The pipeline: one decode per file, one output per target resolution, outcome per pair |
//! | [`imaging`] | Dimension math, embedded resolution reader, backend trait, `image`-based backend |
//! | [`naming`] | `<source>_images_<dpi>dpi/<stem>_<dpi>dpi<.ext>` |
//! | [`types`] | Per-file and per-variant outcomes, run summary, JSON report |
//! | [`config`] | `downsample.toml` loading, stock defaults, validation |
//! | [`output`] | Log line formatting and the run log sink |
//!
//! # Design Decisions
//!
//! ## Effective Source Resolution
//!
//! The resolution a file declares (JFIF or EXIF for JPEG, `pHYs` for PNG, the
//! TIFF resolution tags, the BMP header) is used when present. Otherwise the
//! configured default applies. A target above the effective resolution is
//! never produced for that file.
//!
//! ## One Truncation Per Edge
//!
//! Output dimensions are computed from the original pixel size in a single
//! step: scale the long edge, clamp it, then derive the short edge from the
//! clamped long edge. See [`imaging::calculations`].
//!
//! ## The Minimum Clamp Can Upscale
//!
//! The minimum longest-edge clamp runs after the resolution check. A small
//! image at its own resolution is therefore raised to the minimum, past its
//! own pixel size. This is kept deliberately and covered by tests; disable it
//! with `dimensions.enforce_min = false`.
//!
//! ## Failures Are Values
//!
//! A file that fails to decode, or a variant that fails to encode or write,
//! becomes an outcome in the run report and a line in the log. Only a missing
//! or unreadable source directory stops the run.
//!
//! ## Encode Once
//!
//! Each variant is encoded into memory exactly once. The byte-budget check
//! measures that buffer and the same bytes are written, so output is
//! byte-identical across runs.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
