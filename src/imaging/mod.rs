//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Embedded resolution** | custom reader (JFIF, EXIF IFD0, TIFF IFD0, PNG `pHYs`, BMP header) |
//! | **Resample** | `resize_exact` with Lanczos3 (configurable) |
//! | **Encode** | `image` JPEG/BMP encoders, `png` and `tiff` crates for density tags |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Resolution**: Reading the DPI embedded in source bytes
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod resolution;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceFile};
pub use calculations::{EdgeBounds, ScalePlan};
pub use operations::{
    BudgetPolicy, BudgetVerdict, ByteBudget, DpiOrigin, SourceResolution, VariantSettings,
};
pub use params::{EncodeParams, MediaType, Quality, ResampleFilter, ResampleParams};
pub use rust_backend::RustBackend;
