//! Outcome types shared by the pipeline, the log formatter, and the JSON report.
//!
//! Every (file, resolution) pair ends as exactly one [`VariantOutcome`]:
//! saved, skipped with a reason, or failed with a reason. Every walk entry
//! ends as one [`FileOutcome`]. Nothing is propagated as an error past the
//! file that caused it; failures are values, counted in the [`RunSummary`].

use crate::imaging::{DpiOrigin, MediaType};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of one walk entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Never opened.
    Skipped { reason: FileSkipReason },
    /// Opened but not decodable; no variant was attempted.
    DecodeFailed { error: String },
    /// Decoded once; one report per configured target resolution.
    Processed {
        media: MediaType,
        width: u32,
        height: u32,
        source_dpi: u32,
        dpi_origin: DpiOrigin,
        variants: Vec<VariantReport>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSkipReason {
    UnsupportedType,
    Directory,
}

/// Outcome of one (file, target resolution) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantReport {
    pub dpi: u32,
    pub output: PathBuf,
    #[serde(flatten)]
    pub outcome: VariantOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VariantOutcome {
    Saved {
        width: u32,
        height: u32,
        bytes: u64,
        /// The budget this file exceeded, when written under the warn policy.
        #[serde(skip_serializing_if = "Option::is_none")]
        over_budget: Option<u64>,
    },
    Skipped { reason: VariantSkipReason },
    Failed {
        width: u32,
        height: u32,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantSkipReason {
    /// Target resolution is above the effective source resolution.
    ExceedsSource { source_dpi: u32 },
    /// Encoded size is above the budget under the block policy.
    OverBudget { bytes: u64, max_bytes: u64 },
}

/// Counts over a whole run.
///
/// `saved`, `skipped`, and `failed` count outputs *and* whole-file outcomes:
/// an unsupported file adds one skip, an undecodable file adds one failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub over_budget: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = RunSummary {
            files: reports.len(),
            ..Default::default()
        };
        for report in reports {
            match &report.outcome {
                FileOutcome::Skipped { .. } => summary.skipped += 1,
                FileOutcome::DecodeFailed { .. } => summary.failed += 1,
                FileOutcome::Processed { variants, .. } => {
                    for variant in variants {
                        match &variant.outcome {
                            VariantOutcome::Saved { over_budget, .. } => {
                                summary.saved += 1;
                                if over_budget.is_some() {
                                    summary.over_budget += 1;
                                }
                            }
                            VariantOutcome::Skipped { reason } => {
                                summary.skipped += 1;
                                if matches!(reason, VariantSkipReason::OverBudget { .. }) {
                                    summary.over_budget += 1;
                                }
                            }
                            VariantOutcome::Failed { .. } => summary.failed += 1,
                        }
                    }
                }
            }
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} saved, {} skipped, {} failed",
            self.files, self.saved, self.skipped, self.failed
        )
    }
}

/// Everything a run produced, in walk order. Serialized by `run --report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub target_dpis: Vec<u32>,
    pub files: Vec<FileReport>,
    pub summary: RunSummary,
}
