//! Summary reporting module
//!
//! The end-of-run totals returned by the pipeline, serializable so front
//! ends can print them either as text or as JSON.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::RunCounters;
use crate::error::{CoreError, CoreResult};
use crate::utils::{format_bytes, format_duration};

/// Totals and report locations for one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Wall-clock time the run started
    pub started_at: DateTime<Local>,

    /// Run duration in seconds
    pub elapsed_secs: f64,

    pub source_root: PathBuf,
    pub destination_root: PathBuf,

    /// Normalized extension filter
    pub extension: String,

    /// Files found by the pre-walk count
    pub total_discovered: usize,

    #[serde(flatten)]
    pub counters: RunCounters,

    pub copied_report: PathBuf,
    pub omitted_report: PathBuf,
    pub failed_report: PathBuf,

    /// `.xlsx` copies of the three reports, when enabled
    pub workbooks: Vec<PathBuf>,
}

impl RunSummary {
    /// Files that reached a terminal entry.
    pub fn processed(&self) -> usize {
        self.counters.processed()
    }

    /// Elapsed time as HH:MM:SS.
    pub fn elapsed_display(&self) -> String {
        format_duration(self.elapsed_secs)
    }

    /// Bytes copied, with binary units.
    pub fn bytes_display(&self) -> String {
        format_bytes(self.counters.bytes_copied)
    }

    /// Pretty-printed JSON with the counters flattened into the top level.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::OperationFailed(format!("Could not serialize run summary: {}", e)))
    }
}
