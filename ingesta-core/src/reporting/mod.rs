// ============================================================================
// ingesta-core/src/reporting/mod.rs
// ============================================================================
//
// REPORTING: Per-File Entries, Counters and Report Tables
//
// Every discovered file ends up as exactly one entry: copied, omitted or
// failed. The aggregator only ever appends; `flush` orders each list by
// discovery sequence and writes the three tables once, at the end of the run.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::CoreResult;
use crate::processing::metadata::VideoMetadata;

mod sink;
mod summary;

pub use sink::{CsvReportSink, FanOutSink, MemoryReportSink, ReportCell, ReportSink, XlsxReportSink};
pub use summary::RunSummary;

/// Header of the copied-files table.
pub const COPIED_HEADER: [&str; 6] = [
    "Filename",
    "Duration (s)",
    "Frame Rate (fps)",
    "Width",
    "Height",
    "Aspect Ratio",
];

/// Header of the omitted-files table.
pub const OMITTED_HEADER: [&str; 2] = ["Filename", "Extension"];

/// Header of the failed-files table.
pub const FAILED_HEADER: [&str; 3] = ["Filename", "Stage", "Reason"];

// ============================================================================
// ENTRIES
// ============================================================================

/// Result of the optional proxy step for a copied file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyStatus {
    NotRequested,
    Created(PathBuf),
    Failed(String),
}

/// A file that matched the filter and was copied.
#[derive(Debug, Clone, PartialEq)]
pub struct CopiedEntry {
    /// Position in the discovery order
    pub sequence: usize,
    pub filename: String,
    pub relative_path: PathBuf,
    pub destination: PathBuf,
    pub size_bytes: u64,
    pub metadata: VideoMetadata,
    pub proxy: ProxyStatus,
}

/// A file that did not match the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmittedEntry {
    pub sequence: usize,
    pub filename: String,
    pub relative_path: PathBuf,
    /// Lowercase extension with a leading dot, or `""`
    pub extension: String,
}

/// Step at which a matched file could not be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// The destination path could not be derived.
    Path,
    /// The copy itself failed.
    Copy,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Path => write!(f, "path"),
            FailureStage::Copy => write!(f, "copy"),
        }
    }
}

/// A file that matched the filter but could not be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEntry {
    pub sequence: usize,
    pub filename: String,
    pub relative_path: PathBuf,
    pub stage: FailureStage,
    pub reason: String,
}

// ============================================================================
// COUNTERS
// ============================================================================

/// Running totals for one run. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub copied: usize,
    pub omitted: usize,
    pub failed: usize,
    pub proxies_created: usize,
    pub proxies_failed: usize,
    /// Copied files with at least one metadata field in error
    pub degraded_metadata: usize,
    pub bytes_copied: u64,
}

impl RunCounters {
    /// Files finished so far, whatever their outcome.
    pub fn processed(&self) -> usize {
        self.copied + self.omitted + self.failed
    }

    pub fn count_copied(&mut self, entry: &CopiedEntry) {
        self.copied += 1;
        self.bytes_copied += entry.size_bytes;
        if entry.metadata.is_degraded() {
            self.degraded_metadata += 1;
        }
        match entry.proxy {
            ProxyStatus::Created(_) => self.proxies_created += 1,
            ProxyStatus::Failed(_) => self.proxies_failed += 1,
            ProxyStatus::NotRequested => {}
        }
    }
}

// ============================================================================
// AGGREGATOR
// ============================================================================

/// Append-only collection of per-file entries.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    copied: Vec<CopiedEntry>,
    omitted: Vec<OmittedEntry>,
    failed: Vec<FailedEntry>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_copied(&mut self, entry: CopiedEntry) {
        self.copied.push(entry);
    }

    pub fn record_omitted(&mut self, entry: OmittedEntry) {
        self.omitted.push(entry);
    }

    pub fn record_failed(&mut self, entry: FailedEntry) {
        self.failed.push(entry);
    }

    pub fn copied(&self) -> &[CopiedEntry] {
        &self.copied
    }

    pub fn omitted(&self) -> &[OmittedEntry] {
        &self.omitted
    }

    pub fn failed(&self) -> &[FailedEntry] {
        &self.failed
    }

    /// Orders every list by discovery sequence.
    pub fn sort(&mut self) {
        self.copied.sort_by_key(|e| e.sequence);
        self.omitted.sort_by_key(|e| e.sequence);
        self.failed.sort_by_key(|e| e.sequence);
    }

    pub fn copied_rows(&self) -> Vec<Vec<ReportCell>> {
        self.copied
            .iter()
            .map(|entry| {
                let mut row = vec![ReportCell::from(entry.filename.as_str())];
                row.extend(entry.metadata.report_cells());
                row
            })
            .collect()
    }

    pub fn omitted_rows(&self) -> Vec<Vec<ReportCell>> {
        self.omitted
            .iter()
            .map(|entry| {
                vec![
                    ReportCell::from(entry.filename.as_str()),
                    ReportCell::from(entry.extension.as_str()),
                ]
            })
            .collect()
    }

    pub fn failed_rows(&self) -> Vec<Vec<ReportCell>> {
        self.failed
            .iter()
            .map(|entry| {
                vec![
                    ReportCell::from(entry.filename.as_str()),
                    ReportCell::from(entry.stage.to_string()),
                    ReportCell::from(entry.reason.as_str()),
                ]
            })
            .collect()
    }

    /// Sorts the entries and writes the three tables. Empty tables are
    /// still written, header only. Every table is attempted even when an
    /// earlier one fails; the first error is returned.
    pub fn flush(
        &mut self,
        copied: &mut dyn ReportSink,
        omitted: &mut dyn ReportSink,
        failed: &mut dyn ReportSink,
    ) -> CoreResult<()> {
        self.sort();
        let results = [
            copied.write_table(&COPIED_HEADER, &self.copied_rows()),
            omitted.write_table(&OMITTED_HEADER, &self.omitted_rows()),
            failed.write_table(&FAILED_HEADER, &self.failed_rows()),
        ];
        results.into_iter().collect()
    }
}
