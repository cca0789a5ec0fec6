//! Resize-and-save pipeline.
//!
//! Drives the whole batch: walk the source directory, and for every image
//! decode it once, then produce one output per configured target resolution.
//!
//! ## Per-file flow
//!
//! ```text
//! walk entry
//!   ├── unsupported / directory  → FileOutcome::Skipped
//!   └── candidate
//!         ├── read + decode fails → FileOutcome::DecodeFailed
//!         └── decoded once
//!               └── for each target DPI
//!                     ├── above source DPI → Skipped(ExceedsSource)
//!                     ├── encode fails     → Failed
//!                     ├── over budget (block policy) → Skipped(OverBudget)
//!                     ├── write fails      → Failed
//!                     └── written          → Saved
//! ```
//!
//! No per-file or per-variant failure ends the run. Only a missing or
//! unlistable source directory is returned as an error.
//!
//! ## Parallel Processing
//!
//! With `processing.parallel` set, files are spread over the rayon pool. Each
//! worker buffers its own events and the buffers are flushed in walk order,
//! so logs and reports are identical to a sequential run.

use crate::config::DownsampleConfig;
use crate::imaging::operations::{
    load_source, plan_variant, render_variant, save_variant, source_resolution,
};
use crate::imaging::{
    BudgetVerdict, ImageBackend, MediaType, RustBackend, ScalePlan, SourceResolution,
    VariantSettings,
};
use crate::naming;
use crate::scan::{self, ScanError, WalkEntry};
use crate::types::{
    FileOutcome, FileReport, FileSkipReason, RunReport, RunSummary, VariantOutcome,
    VariantReport, VariantSkipReason,
};
use image::DynamicImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Progress events, in the order a sequential run produces them.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    RunStarted {
        source: PathBuf,
        target_dpis: Vec<u32>,
    },
    FileStarted {
        path: PathBuf,
    },
    FileDecoded {
        path: PathBuf,
        width: u32,
        height: u32,
        resolution: SourceResolution,
    },
    VariantFinished {
        path: PathBuf,
        report: VariantReport,
    },
    FileFinished {
        report: FileReport,
    },
    RunFinished {
        summary: RunSummary,
    },
}

/// Run-wide inputs shared by every file.
struct RunContext<'a> {
    source_dir: &'a Path,
    target_dpis: &'a [u32],
    default_dpi: u32,
    settings: VariantSettings,
}

fn send(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // Printer thread gone means nobody is listening; keep processing
        tx.send(event).ok();
    }
}

/// Run the batch with the production backend.
pub fn process(
    source: &Path,
    config: &DownsampleConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    let backend = RustBackend::with_max_pixels(config.source.max_pixels);
    process_with_backend(&backend, source, config, events)
}

/// Run the batch with a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    config: &DownsampleConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunReport, ProcessError> {
    let source_dir = naming::normalize_source(source);
    let entries = scan::walk(&source_dir)?;
    let ctx = RunContext {
        source_dir: &source_dir,
        target_dpis: &config.target_dpis,
        default_dpi: config.source.default_dpi,
        settings: config.variant_settings(),
    };

    send(
        &events,
        ProcessEvent::RunStarted {
            source: source_dir.clone(),
            target_dpis: config.target_dpis.clone(),
        },
    );

    let files: Vec<FileReport> = if config.processing.parallel {
        let entries: Vec<WalkEntry> = entries.collect();
        let results: Vec<(Vec<ProcessEvent>, FileReport)> = entries
            .par_iter()
            .map(|entry| {
                let mut buffered = Vec::new();
                let report = process_entry(backend, entry, &ctx, &mut |e| buffered.push(e));
                (buffered, report)
            })
            .collect();
        results
            .into_iter()
            .map(|(buffered, report)| {
                for event in buffered {
                    send(&events, event);
                }
                report
            })
            .collect()
    } else {
        entries
            .map(|entry| process_entry(backend, &entry, &ctx, &mut |e| send(&events, e)))
            .collect()
    };

    let summary = RunSummary::from_reports(&files);
    send(&events, ProcessEvent::RunFinished { summary });

    Ok(RunReport {
        source: source_dir.clone(),
        target_dpis: config.target_dpis.clone(),
        files,
        summary,
    })
}

fn process_entry(
    backend: &impl ImageBackend,
    entry: &WalkEntry,
    ctx: &RunContext,
    emit: &mut dyn FnMut(ProcessEvent),
) -> FileReport {
    let outcome = match entry {
        WalkEntry::Candidate { path, media } => process_file(backend, path, *media, ctx, emit),
        WalkEntry::Unsupported { .. } => FileOutcome::Skipped {
            reason: FileSkipReason::UnsupportedType,
        },
        WalkEntry::Directory { .. } => FileOutcome::Skipped {
            reason: FileSkipReason::Directory,
        },
        WalkEntry::Unreadable { error, .. } => FileOutcome::DecodeFailed {
            error: error.clone(),
        },
    };
    let report = FileReport {
        source: entry.path().to_path_buf(),
        outcome,
    };
    emit(ProcessEvent::FileFinished {
        report: report.clone(),
    });
    report
}

/// Decode once, then produce every target resolution from the same raster.
/// The raster is dropped when this returns, on every path.
fn process_file(
    backend: &impl ImageBackend,
    path: &Path,
    media: MediaType,
    ctx: &RunContext,
    emit: &mut dyn FnMut(ProcessEvent),
) -> FileOutcome {
    emit(ProcessEvent::FileStarted {
        path: path.to_path_buf(),
    });

    let decoded = load_source(path, media).and_then(|source| {
        let image = backend.decode(&source)?;
        Ok((source_resolution(&source, ctx.default_dpi), image))
    });
    let (resolution, image) = match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            return FileOutcome::DecodeFailed {
                error: e.to_string(),
            };
        }
    };

    let (width, height) = (image.width(), image.height());
    emit(ProcessEvent::FileDecoded {
        path: path.to_path_buf(),
        width,
        height,
        resolution,
    });

    let variants = ctx
        .target_dpis
        .iter()
        .map(|&dpi| {
            let report = process_variant(backend, path, media, &image, resolution, dpi, ctx);
            emit(ProcessEvent::VariantFinished {
                path: path.to_path_buf(),
                report: report.clone(),
            });
            report
        })
        .collect();

    FileOutcome::Processed {
        media,
        width,
        height,
        source_dpi: resolution.dpi,
        dpi_origin: resolution.origin,
        variants,
    }
}

fn process_variant(
    backend: &impl ImageBackend,
    path: &Path,
    media: MediaType,
    image: &DynamicImage,
    resolution: SourceResolution,
    dpi: u32,
    ctx: &RunContext,
) -> VariantReport {
    let output = naming::output_path(ctx.source_dir, path, dpi);
    let dims = (image.width(), image.height());

    let outcome = match plan_variant(dims, resolution, dpi, &ctx.settings) {
        ScalePlan::ExceedsSource => VariantOutcome::Skipped {
            reason: VariantSkipReason::ExceedsSource {
                source_dpi: resolution.dpi,
            },
        },
        ScalePlan::Resize { width, height } => {
            match render_variant(backend, image, media, dpi, (width, height), &ctx.settings) {
                Err(e) => VariantOutcome::Failed {
                    width,
                    height,
                    error: e.to_string(),
                },
                Ok(rendered) if rendered.budget == BudgetVerdict::Block => {
                    VariantOutcome::Skipped {
                        reason: VariantSkipReason::OverBudget {
                            bytes: rendered.bytes.len() as u64,
                            max_bytes: ctx.settings.budget.max_bytes,
                        },
                    }
                }
                Ok(rendered) => match save_variant(&rendered.bytes, &output) {
                    Ok(()) => VariantOutcome::Saved {
                        width,
                        height,
                        bytes: rendered.bytes.len() as u64,
                        over_budget: (rendered.budget == BudgetVerdict::Warn)
                            .then_some(ctx.settings.budget.max_bytes),
                    },
                    Err(e) => VariantOutcome::Failed {
                        width,
                        height,
                        error: e.to_string(),
                    },
                },
            }
        }
    };

    VariantReport {
        dpi,
        output,
        outcome,
    }
}

// ============================================================================
// Dry run
// ============================================================================

/// What a run would do with one walk entry, computed without decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFile {
    pub source: PathBuf,
    pub outcome: PlannedOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannedOutcome {
    Skipped(FileSkipReason),
    Unreadable(String),
    Planned {
        width: u32,
        height: u32,
        resolution: SourceResolution,
        variants: Vec<PlannedVariant>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedVariant {
    pub dpi: u32,
    pub output: PathBuf,
    pub plan: ScalePlan,
}

/// Plan the batch with the production backend. Writes nothing.
pub fn plan(source: &Path, config: &DownsampleConfig) -> Result<Vec<PlannedFile>, ProcessError> {
    let backend = RustBackend::with_max_pixels(config.source.max_pixels);
    plan_with_backend(&backend, source, config)
}

/// Plan the batch: walk, read headers and embedded resolution, compute sizes.
pub fn plan_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    config: &DownsampleConfig,
) -> Result<Vec<PlannedFile>, ProcessError> {
    let source_dir = naming::normalize_source(source);
    let settings = config.variant_settings();

    let planned = scan::walk(&source_dir)?
        .map(|entry| {
            let outcome = match &entry {
                WalkEntry::Candidate { path, media } => {
                    let identified = load_source(path, *media).and_then(|source| {
                        let dims = backend.identify(&source)?;
                        Ok((dims, source_resolution(&source, config.source.default_dpi)))
                    });
                    match identified {
                        Ok((dims, resolution)) => PlannedOutcome::Planned {
                            width: dims.width,
                            height: dims.height,
                            resolution,
                            variants: config
                                .target_dpis
                                .iter()
                                .map(|&dpi| PlannedVariant {
                                    dpi,
                                    output: naming::output_path(&source_dir, path, dpi),
                                    plan: plan_variant(
                                        (dims.width, dims.height),
                                        resolution,
                                        dpi,
                                        &settings,
                                    ),
                                })
                                .collect(),
                        },
                        Err(e) => PlannedOutcome::Unreadable(e.to_string()),
                    }
                }
                WalkEntry::Unsupported { .. } => {
                    PlannedOutcome::Skipped(FileSkipReason::UnsupportedType)
                }
                WalkEntry::Directory { .. } => PlannedOutcome::Skipped(FileSkipReason::Directory),
                WalkEntry::Unreadable { error, .. } => PlannedOutcome::Unreadable(error.clone()),
            };
            PlannedFile {
                source: entry.path().to_path_buf(),
                outcome,
            }
        })
        .collect();
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::DpiOrigin;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::BudgetPolicy;
    use crate::test_helpers::{jpeg_bytes, source_dir};
    use std::fs;
    use tempfile::TempDir;

    fn config(target_dpis: &[u32]) -> DownsampleConfig {
        DownsampleConfig {
            target_dpis: target_dpis.to_vec(),
            ..DownsampleConfig::default()
        }
    }

    /// Write a file whose only meaningful content is its embedded resolution.
    /// The mock backend supplies the pixel dimensions.
    fn write_jpeg_with_dpi(dir: &Path, name: &str, dpi: Option<u16>) {
        fs::write(dir.join(name), jpeg_bytes(4, 4, dpi)).unwrap();
    }

    fn variants(report: &FileReport) -> &[VariantReport] {
        match &report.outcome {
            FileOutcome::Processed { variants, .. } => variants,
            other => panic!("expected processed, got {other:?}"),
        }
    }

    // =========================================================================
    // Scenario
    // =========================================================================

    #[test]
    fn scenario_photo_at_300_dpi() {
        let (tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]);

        let report = process_with_backend(&backend, &src, &config(&[72, 300]), None).unwrap();

        let v = variants(&report.files[0]);
        assert_eq!(v.len(), 2);
        assert_eq!(
            v[0].output,
            tmp.path().join("source_images_72dpi/photo_72dpi.jpg")
        );
        assert!(matches!(
            v[0].outcome,
            VariantOutcome::Saved {
                width: 960,
                height: 720,
                ..
            }
        ));
        assert!(matches!(
            v[1].outcome,
            VariantOutcome::Saved {
                width: 4000,
                height: 3000,
                ..
            }
        ));
        assert!(v[0].output.exists());
        assert!(v[1].output.exists());
        assert!(matches!(
            report.files[0].outcome,
            FileOutcome::Processed {
                source_dpi: 300,
                dpi_origin: DpiOrigin::Embedded,
                ..
            }
        ));
    }

    #[test]
    fn scenario_records_one_decode_and_ordered_operations() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]);

        process_with_backend(&backend, &src, &config(&[72, 300]), None).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Decode("photo.jpg".into()),
                RecordedOp::Resample {
                    width: 960,
                    height: 720
                },
                RecordedOp::Encode {
                    format: MediaType::Jpeg,
                    dpi: 72,
                    quality: Some(95)
                },
                RecordedOp::Resample {
                    width: 4000,
                    height: 3000
                },
                RecordedOp::Encode {
                    format: MediaType::Jpeg,
                    dpi: 300,
                    quality: Some(95)
                },
            ]
        );
    }

    #[test]
    fn max_clamp_applies_at_source_resolution() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "huge.jpg", Some(300));
        let backend = MockBackend::with_files(&[("huge.jpg", 20000, 15000)]);

        let report = process_with_backend(&backend, &src, &config(&[300]), None).unwrap();

        assert!(matches!(
            variants(&report.files[0])[0].outcome,
            VariantOutcome::Saved {
                width: 10000,
                height: 7500,
                ..
            }
        ));
    }

    // =========================================================================
    // Skips
    // =========================================================================

    #[test]
    fn target_above_source_produces_nothing() {
        let (tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]);

        let report = process_with_backend(&backend, &src, &config(&[600]), None).unwrap();

        assert_eq!(
            variants(&report.files[0])[0].outcome,
            VariantOutcome::Skipped {
                reason: VariantSkipReason::ExceedsSource { source_dpi: 300 }
            }
        );
        assert!(!tmp.path().join("source_images_600dpi").exists());
        assert_eq!(report.summary.skipped, 1);
    }

    #[test]
    fn missing_resolution_uses_default() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "plain.jpg", None);
        let backend = MockBackend::with_files(&[("plain.jpg", 4000, 3000)]);

        let report =
            process_with_backend(&backend, &src, &config(&[72, 300, 600, 1200]), None).unwrap();

        assert!(matches!(
            report.files[0].outcome,
            FileOutcome::Processed {
                source_dpi: 1200,
                dpi_origin: DpiOrigin::Default,
                ..
            }
        ));
        assert_eq!(report.summary.saved, 4);
    }

    #[test]
    fn non_image_file_is_skipped() {
        let (tmp, src) = source_dir();
        fs::write(src.join("notes.txt"), "hello").unwrap();
        let backend = MockBackend::new();

        let report = process_with_backend(&backend, &src, &config(&[72, 300]), None).unwrap();

        assert_eq!(
            report.files[0].outcome,
            FileOutcome::Skipped {
                reason: FileSkipReason::UnsupportedType
            }
        );
        assert!(backend.get_operations().is_empty());
        assert!(!tmp.path().join("source_images_72dpi").exists());
        assert!(!tmp.path().join("source_images_300dpi").exists());
    }

    #[test]
    fn subdirectory_is_skipped() {
        let (_tmp, src) = source_dir();
        fs::create_dir(src.join("nested")).unwrap();
        let report =
            process_with_backend(&MockBackend::new(), &src, &config(&[72]), None).unwrap();
        assert_eq!(
            report.files[0].outcome,
            FileOutcome::Skipped {
                reason: FileSkipReason::Directory
            }
        );
    }

    // =========================================================================
    // Failures are contained
    // =========================================================================

    #[test]
    fn decode_failure_skips_file_and_continues() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "a_broken.jpg", Some(300));
        write_jpeg_with_dpi(&src, "b_good.jpg", Some(300));
        // Only b_good.jpg is known to the mock
        let backend = MockBackend::with_files(&[("b_good.jpg", 400, 300)]);

        let report = process_with_backend(&backend, &src, &config(&[72]), None).unwrap();

        assert!(matches!(
            report.files[0].outcome,
            FileOutcome::DecodeFailed { .. }
        ));
        assert!(matches!(
            variants(&report.files[1])[0].outcome,
            VariantOutcome::Saved { .. }
        ));
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.saved, 1);
    }

    #[test]
    fn save_failure_skips_only_that_resolution() {
        let (tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        // A file where the 72 dpi output directory should go
        fs::write(tmp.path().join("source_images_72dpi"), b"in the way").unwrap();
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]);

        let report = process_with_backend(&backend, &src, &config(&[72, 300]), None).unwrap();

        let v = variants(&report.files[0]);
        assert!(matches!(v[0].outcome, VariantOutcome::Failed { .. }));
        assert!(matches!(v[1].outcome, VariantOutcome::Saved { .. }));
        assert_eq!(report.summary.to_string(), "1 files: 1 saved, 0 skipped, 1 failed");
    }

    #[test]
    fn missing_source_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = process_with_backend(
            &MockBackend::new(),
            &tmp.path().join("absent"),
            &config(&[72]),
            None,
        );
        assert!(matches!(
            result,
            Err(ProcessError::Scan(ScanError::SourceMissing(_)))
        ));
    }

    // =========================================================================
    // Byte budget
    // =========================================================================

    fn budget_config(policy: BudgetPolicy) -> DownsampleConfig {
        let mut config = config(&[72]);
        config.byte_budget.max_bytes = 100;
        config.byte_budget.policy = policy;
        config
    }

    #[test]
    fn budget_warn_still_writes() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]).with_encoded_len(500);

        let report =
            process_with_backend(&backend, &src, &budget_config(BudgetPolicy::Warn), None).unwrap();

        let v = &variants(&report.files[0])[0];
        assert!(matches!(
            v.outcome,
            VariantOutcome::Saved {
                bytes: 500,
                over_budget: Some(100),
                ..
            }
        ));
        assert_eq!(fs::read(&v.output).unwrap().len(), 500);
        assert_eq!(report.summary.over_budget, 1);
    }

    #[test]
    fn budget_block_skips_write() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]).with_encoded_len(500);

        let report = process_with_backend(&backend, &src, &budget_config(BudgetPolicy::Block), None)
            .unwrap();

        let v = &variants(&report.files[0])[0];
        assert_eq!(
            v.outcome,
            VariantOutcome::Skipped {
                reason: VariantSkipReason::OverBudget {
                    bytes: 500,
                    max_bytes: 100
                }
            }
        );
        assert!(!v.output.exists());
    }

    #[test]
    fn budget_off_ignores_size() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]).with_encoded_len(500);

        let report =
            process_with_backend(&backend, &src, &budget_config(BudgetPolicy::Off), None).unwrap();

        assert!(matches!(
            variants(&report.files[0])[0].outcome,
            VariantOutcome::Saved {
                over_budget: None,
                ..
            }
        ));
    }

    // =========================================================================
    // Events and parallelism
    // =========================================================================

    #[test]
    fn events_follow_processing_order() {
        let (_tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        fs::write(src.join("zz.txt"), "x").unwrap();
        let backend = MockBackend::with_files(&[("photo.jpg", 400, 300)]);
        let (tx, rx) = std::sync::mpsc::channel();

        process_with_backend(&backend, &src, &config(&[72, 600]), Some(tx)).unwrap();

        let kinds: Vec<&str> = rx
            .iter()
            .map(|event| match event {
                ProcessEvent::RunStarted { .. } => "run_started",
                ProcessEvent::FileStarted { .. } => "file_started",
                ProcessEvent::FileDecoded { .. } => "file_decoded",
                ProcessEvent::VariantFinished { .. } => "variant",
                ProcessEvent::FileFinished { .. } => "file_finished",
                ProcessEvent::RunFinished { .. } => "run_finished",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "run_started",
                "file_started",
                "file_decoded",
                "variant",
                "variant",
                "file_finished",
                "file_finished",
                "run_finished",
            ]
        );
    }

    #[test]
    fn parallel_matches_sequential() {
        let (_tmp, src) = source_dir();
        let mut files = Vec::new();
        for i in 0..8 {
            let name = format!("img_{i}.jpg");
            write_jpeg_with_dpi(&src, &name, Some(300));
            files.push((name, 1000 + i * 100, 800));
        }
        fs::write(src.join("readme.txt"), "x").unwrap();
        let dims: Vec<(&str, u32, u32)> =
            files.iter().map(|(n, w, h)| (n.as_str(), *w, *h)).collect();

        let mut cfg = config(&[72, 300, 600]);
        let (tx_seq, rx_seq) = std::sync::mpsc::channel();
        let sequential =
            process_with_backend(&MockBackend::with_files(&dims), &src, &cfg, Some(tx_seq))
                .unwrap();

        cfg.processing.parallel = true;
        let (tx_par, rx_par) = std::sync::mpsc::channel();
        let parallel =
            process_with_backend(&MockBackend::with_files(&dims), &src, &cfg, Some(tx_par))
                .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(
            rx_seq.iter().collect::<Vec<_>>(),
            rx_par.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn trailing_slash_names_same_outputs() {
        let (tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        let backend = MockBackend::with_files(&[("photo.jpg", 400, 300)]);

        let mut with_slash = src.clone().into_os_string();
        with_slash.push("/");
        let report =
            process_with_backend(&backend, Path::new(&with_slash), &config(&[72]), None).unwrap();

        assert_eq!(
            variants(&report.files[0])[0].output,
            tmp.path().join("source_images_72dpi/photo_72dpi.jpg")
        );
    }

    // =========================================================================
    // Dry run
    // =========================================================================

    #[test]
    fn plan_identifies_without_decoding_or_writing() {
        let (tmp, src) = source_dir();
        write_jpeg_with_dpi(&src, "photo.jpg", Some(300));
        fs::write(src.join("notes.txt"), "x").unwrap();
        let backend = MockBackend::with_files(&[("photo.jpg", 4000, 3000)]);

        let planned = plan_with_backend(&backend, &src, &config(&[72, 600])).unwrap();

        assert_eq!(planned.len(), 2);
        assert_eq!(
            planned[0].outcome,
            PlannedOutcome::Skipped(FileSkipReason::UnsupportedType)
        );
        let PlannedOutcome::Planned { variants, .. } = &planned[1].outcome else {
            panic!("expected a plan");
        };
        assert_eq!(
            variants[0].plan,
            ScalePlan::Resize {
                width: 960,
                height: 720
            }
        );
        assert_eq!(variants[1].plan, ScalePlan::ExceedsSource);
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Identify("photo.jpg".into())]
        );
        assert!(!tmp.path().join("source_images_72dpi").exists());
    }
}
