//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Source: tmp/source
//! Targets: 72, 300 dpi
//! photo.jpg
//!     4000x3000 at 300 dpi (embedded)
//!     72 dpi: saved 960x720, 412345 bytes → tmp/source_images_72dpi/photo_72dpi.jpg
//!     300 dpi: saved 4000x3000, 3456789 bytes → tmp/source_images_300dpi/photo_300dpi.jpg
//! broken.png
//!     decode failed: Processing failed: Failed to decode ...
//! notes.txt: skipped, unsupported type
//! 3 files: 2 saved, 1 skipped, 1 failed
//! ```
//!
//! ## Check
//!
//! ```text
//! photo.jpg (4000x3000 at 300 dpi, embedded)
//!     72 dpi: 960x720 → tmp/source_images_72dpi/photo_72dpi.jpg
//!     600 dpi: skip, exceeds source resolution
//! notes.txt: skipped, unsupported type
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability. Format functions are pure: no I/O, no side effects.
//! [`RunLog`] is the one sink for run output: every line goes to stdout and
//! to the run log file.

use crate::imaging::{DpiOrigin, ScalePlan, SourceResolution};
use crate::process::{PlannedFile, PlannedOutcome, ProcessEvent};
use crate::types::{FileOutcome, FileSkipReason, VariantOutcome, VariantSkipReason};
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn origin_label(origin: DpiOrigin) -> &'static str {
    match origin {
        DpiOrigin::Embedded => "embedded",
        DpiOrigin::Default => "default",
    }
}

fn skip_label(reason: FileSkipReason) -> &'static str {
    match reason {
        FileSkipReason::UnsupportedType => "unsupported type",
        FileSkipReason::Directory => "directory",
    }
}

fn resolution_line(width: u32, height: u32, resolution: &SourceResolution) -> String {
    format!(
        "{}x{} at {} dpi ({})",
        width,
        height,
        resolution.dpi,
        origin_label(resolution.origin)
    )
}

// ============================================================================
// Run output
// ============================================================================

/// Format a single process event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::RunStarted {
            source,
            target_dpis,
        } => {
            let dpis: Vec<String> = target_dpis.iter().map(u32::to_string).collect();
            vec![
                format!("Source: {}", source.display()),
                format!("Targets: {} dpi", dpis.join(", ")),
            ]
        }
        ProcessEvent::FileStarted { path } => vec![file_name(path)],
        ProcessEvent::FileDecoded {
            width,
            height,
            resolution,
            ..
        } => vec![format!("    {}", resolution_line(*width, *height, resolution))],
        ProcessEvent::VariantFinished { report, .. } => {
            let dpi = report.dpi;
            match &report.outcome {
                VariantOutcome::Saved {
                    width,
                    height,
                    bytes,
                    over_budget,
                } => {
                    let mut lines = vec![format!(
                        "    {} dpi: saved {}x{}, {} bytes → {}",
                        dpi,
                        width,
                        height,
                        bytes,
                        report.output.display()
                    )];
                    if let Some(max) = over_budget {
                        lines.push(format!(
                            "    {} dpi: warning: {} bytes exceeds budget of {} bytes",
                            dpi, bytes, max
                        ));
                    }
                    lines
                }
                VariantOutcome::Skipped {
                    reason: VariantSkipReason::ExceedsSource { source_dpi },
                } => vec![format!(
                    "    {} dpi: skipped, exceeds source resolution ({} dpi)",
                    dpi, source_dpi
                )],
                VariantOutcome::Skipped {
                    reason: VariantSkipReason::OverBudget { bytes, max_bytes },
                } => vec![format!(
                    "    {} dpi: skipped, {} bytes exceeds budget of {} bytes",
                    dpi, bytes, max_bytes
                )],
                VariantOutcome::Failed {
                    width,
                    height,
                    error,
                } => vec![format!(
                    "    {} dpi: failed to save {}x{} → {}: {}",
                    dpi,
                    width,
                    height,
                    report.output.display(),
                    error
                )],
            }
        }
        ProcessEvent::FileFinished { report } => match &report.outcome {
            FileOutcome::Skipped { reason } => vec![format!(
                "{}: skipped, {}",
                file_name(&report.source),
                skip_label(*reason)
            )],
            FileOutcome::DecodeFailed { error } => {
                vec![format!("    decode failed: {}", error)]
            }
            FileOutcome::Processed { .. } => Vec::new(),
        },
        ProcessEvent::RunFinished { summary } => vec![summary.to_string()],
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the dry-run plan.
pub fn format_plan(planned: &[PlannedFile]) -> Vec<String> {
    let mut lines = Vec::new();
    for file in planned {
        let name = file_name(&file.source);
        match &file.outcome {
            PlannedOutcome::Skipped(reason) => {
                lines.push(format!("{}: skipped, {}", name, skip_label(*reason)));
            }
            PlannedOutcome::Unreadable(error) => {
                lines.push(format!("{}: unreadable, {}", name, error));
            }
            PlannedOutcome::Planned {
                width,
                height,
                resolution,
                variants,
            } => {
                lines.push(format!(
                    "{} ({}x{} at {} dpi, {})",
                    name,
                    width,
                    height,
                    resolution.dpi,
                    origin_label(resolution.origin)
                ));
                for variant in variants {
                    lines.push(match variant.plan {
                        ScalePlan::Resize { width, height } => format!(
                            "    {} dpi: {}x{} → {}",
                            variant.dpi,
                            width,
                            height,
                            variant.output.display()
                        ),
                        ScalePlan::ExceedsSource => {
                            format!("    {} dpi: skip, exceeds source resolution", variant.dpi)
                        }
                    });
                }
            }
        }
    }
    lines
}

/// Print the dry-run plan to stdout.
pub fn print_plan(planned: &[PlannedFile]) {
    for line in format_plan(planned) {
        println!("{}", line);
    }
}

// ============================================================================
// Run log sink
// ============================================================================

/// Writes run output to stdout and, optionally, to a log file.
///
/// The file is truncated when the log is created, so each run starts with a
/// clean log. Lines are flushed as they are written.
pub struct RunLog {
    file: Option<LineWriter<File>>,
}

impl RunLog {
    /// Log to stdout and to `path`, truncating it.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file: Some(LineWriter::new(file)),
        })
    }

    /// Log to stdout only.
    pub fn stdout_only() -> Self {
        Self { file: None }
    }

    pub fn write_line(&mut self, line: &str) {
        println!("{}", line);
        let failed = match &mut self.file {
            Some(file) => writeln!(file, "{}", line).err(),
            None => None,
        };
        if let Some(e) = failed {
            eprintln!("warning: run log write failed, continuing without it: {}", e);
            self.file = None;
        }
    }

    pub fn write_event(&mut self, event: &ProcessEvent) {
        for line in format_process_event(event) {
            self.write_line(&line);
        }
    }
}
