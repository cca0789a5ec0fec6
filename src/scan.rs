//! Source directory walking.
//!
//! Enumerates the direct children of the source directory in file-name order
//! and classifies each one by extension:
//!
//! ```text
//! tmp/source/
//! ├── photo.jpg        → Candidate (image/jpeg)
//! ├── scan.TIF         → Candidate (image/tiff)
//! ├── notes.txt        → Unsupported
//! └── old/             → Directory (not descended into)
//! ```
//!
//! The walk is lazy: entries are produced one at a time as the pipeline
//! consumes them. Only a missing or unreadable source directory is an error;
//! a single unreadable entry is reported as [`WalkEntry::Unreadable`] and the
//! walk goes on.

use crate::imaging::MediaType;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    SourceMissing(PathBuf),
    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry of the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A file with an allow-listed extension.
    Candidate { path: PathBuf, media: MediaType },
    /// A file whose extension is not JPEG, PNG, TIFF or BMP.
    Unsupported { path: PathBuf },
    /// A subdirectory. Only the top level is processed.
    Directory { path: PathBuf },
    /// An entry whose metadata could not be read.
    Unreadable { path: PathBuf, error: String },
}

impl WalkEntry {
    pub fn path(&self) -> &Path {
        match self {
            WalkEntry::Candidate { path, .. }
            | WalkEntry::Unsupported { path }
            | WalkEntry::Directory { path }
            | WalkEntry::Unreadable { path, .. } => path,
        }
    }
}

/// Walk `source` lazily in sorted order.
///
/// Fails up front if the directory is missing, is not a directory, or cannot
/// be listed. Everything after that is reported per entry.
pub fn walk(source: &Path) -> Result<impl Iterator<Item = WalkEntry> + use<>, ScanError> {
    if !source.exists() {
        return Err(ScanError::SourceMissing(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(ScanError::NotADirectory(source.to_path_buf()));
    }
    // Probe readability so permission errors are fatal rather than per-entry
    std::fs::read_dir(source)?;

    let fallback = source.to_path_buf();
    Ok(WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| classify(entry, &fallback)))
}

fn classify(entry: walkdir::Result<walkdir::DirEntry>, source: &Path) -> WalkEntry {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            return WalkEntry::Unreadable {
                path: e.path().map_or_else(|| source.to_path_buf(), Path::to_path_buf),
                error: e.to_string(),
            };
        }
    };

    let path = entry.into_path();
    // Follows symlinks, unlike DirEntry::file_type
    if path.is_dir() {
        return WalkEntry::Directory { path };
    }
    match MediaType::from_path(&path) {
        Some(media) => WalkEntry::Candidate { path, media },
        None => WalkEntry::Unsupported { path },
    }
}
