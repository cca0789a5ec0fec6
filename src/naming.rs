//! Output naming.
//!
//! Every target resolution gets a sibling directory of the source directory,
//! and every output file keeps its source stem and extension:
//!
//! ```text
//! tmp/source/photo.JPG
//!   → tmp/source_images_72dpi/photo_72dpi.JPG
//!   → tmp/source_images_300dpi/photo_300dpi.JPG
//! ```
//!
//! The extension keeps its original case, so outputs sort next to the inputs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Normalize the source directory path before deriving output names.
///
/// Trailing separators are dropped (`tmp/source/` names the same outputs as
/// `tmp/source`). A path with no final name component (`.`, `..`, `dir/..`)
/// is canonicalized so the output directories land next to the real
/// directory instead of being named `._images_72dpi`.
pub fn normalize_source(source: &Path) -> PathBuf {
    let trimmed: PathBuf = source.components().collect();
    if trimmed.file_name().is_some() {
        trimmed
    } else {
        std::fs::canonicalize(&trimmed).unwrap_or(trimmed)
    }
}

/// `<source>_images_<dpi>dpi`
pub fn output_dir(source: &Path, dpi: u32) -> PathBuf {
    let mut dir = source.as_os_str().to_os_string();
    dir.push(format!("_images_{}dpi", dpi));
    PathBuf::from(dir)
}

/// `<stem>_<dpi>dpi<.ext>`
pub fn output_file_name(source_file: &Path, dpi: u32) -> OsString {
    let mut name = source_file.file_stem().unwrap_or_default().to_os_string();
    name.push(format!("_{}dpi", dpi));
    if let Some(ext) = source_file.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Full output path for one (source file, target DPI) pair.
pub fn output_path(source_dir: &Path, source_file: &Path, dpi: u32) -> PathBuf {
    output_dir(source_dir, dpi).join(output_file_name(source_file, dpi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_dir_appends_suffix() {
        assert_eq!(
            output_dir(Path::new("tmp/source"), 72),
            PathBuf::from("tmp/source_images_72dpi")
        );
    }

    #[test]
    fn file_name_keeps_stem_and_extension() {
        assert_eq!(output_file_name(Path::new("photo.jpg"), 300), "photo_300dpi.jpg");
    }

    #[test]
    fn file_name_preserves_extension_case() {
        assert_eq!(output_file_name(Path::new("IMG_01.JPG"), 72), "IMG_01_72dpi.JPG");
    }

    #[test]
    fn file_name_with_dots_in_stem() {
        assert_eq!(
            output_file_name(Path::new("scan.2024.01.tiff"), 600),
            "scan.2024.01_600dpi.tiff"
        );
    }

    #[test]
    fn output_path_combines_dir_and_name() {
        assert_eq!(
            output_path(Path::new("/data/in"), Path::new("/data/in/photo.png"), 1200),
            PathBuf::from("/data/in_images_1200dpi/photo_1200dpi.png")
        );
    }

    #[test]
    fn normalize_drops_trailing_separator() {
        assert_eq!(
            normalize_source(Path::new("tmp/source/")),
            PathBuf::from("tmp/source")
        );
    }

    #[test]
    fn normalize_keeps_named_path_untouched() {
        assert_eq!(
            normalize_source(Path::new("does/not/exist")),
            PathBuf::from("does/not/exist")
        );
    }

    #[test]
    fn normalize_canonicalizes_parent_reference() {
        let tmp = TempDir::new().unwrap();
        let inner = tmp.path().join("inner");
        std::fs::create_dir(&inner).unwrap();

        let normalized = normalize_source(&inner.join(".."));
        assert_eq!(normalized, std::fs::canonicalize(tmp.path()).unwrap());
        assert!(normalized.file_name().is_some());
    }
}
