// ============================================================================
// ingesta-core/src/processing/pipeline.rs
// ============================================================================
//
// PIPELINE ORCHESTRATION: Per-File State Machine and Run Scheduling
//
// Each discovered file walks through a fixed sequence of stages and always
// ends up as exactly one report entry. No per-file failure escapes this
// module as an error: copy failures become failed entries, probe failures
// become field errors and proxy failures become a proxy status.
//
// KEY COMPONENTS:
// - FileStage: the per-file state machine
// - Pipeline: drives files through the stages, sequentially or on a pool
// - Ledger: the single lock every append and progress tick goes through
//
// With more than one worker, files are handed to a bounded rayon pool in
// discovery order. Entries carry their discovery sequence, so reports are
// sorted back into enumeration order when flushed.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use chrono::Local;
use rayon::prelude::*;

use super::copy::{copy_file, destination_for};
use super::proxy::proxy_path;
use crate::config::{
    COPIED_SHEET_NAME, COPIED_WORKBOOK_NAME, FAILED_SHEET_NAME, FAILED_WORKBOOK_NAME,
    OMITTED_SHEET_NAME, OMITTED_WORKBOOK_NAME, PipelineConfig,
};
use crate::discovery::{DiscoveredFile, SourceWalker, count_files};
use crate::error::{CoreError, CoreResult};
use crate::external::{MetadataProbe, ProxyTranscoder, ToolRunner};
use crate::progress::ProgressTracker;
use crate::reporting::{
    CopiedEntry, CsvReportSink, FailedEntry, FailureStage, FanOutSink, OmittedEntry,
    ProxyStatus, ReportAggregator, RunCounters, RunSummary, XlsxReportSink,
};

// ============================================================================
// FILE STATE MACHINE
// ============================================================================

/// Stages a single file passes through.
///
/// `Discovered -> Matched | Omitted`, then
/// `Matched -> Copied -> MetadataExtracted -> ProxyAttempted`. Every stage
/// may move straight to `Logged`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    Discovered,
    Matched,
    Omitted,
    Copied,
    MetadataExtracted,
    ProxyAttempted,
    Logged,
}

impl FileStage {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: FileStage) -> bool {
        use FileStage::*;
        matches!(
            (self, next),
            (Discovered, Matched)
                | (Discovered, Omitted)
                | (Matched, Copied)
                | (Copied, MetadataExtracted)
                | (MetadataExtracted, ProxyAttempted)
        ) || (self != Logged && next == Logged)
    }
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStage::Discovered => "discovered",
            FileStage::Matched => "matched",
            FileStage::Omitted => "omitted",
            FileStage::Copied => "copied",
            FileStage::MetadataExtracted => "metadata extracted",
            FileStage::ProxyAttempted => "proxy attempted",
            FileStage::Logged => "logged",
        };
        f.write_str(name)
    }
}

/// Tracks the stage of the file currently being processed.
struct FileRun<'f> {
    file: &'f DiscoveredFile,
    stage: FileStage,
}

impl<'f> FileRun<'f> {
    fn new(file: &'f DiscoveredFile) -> Self {
        Self {
            file,
            stage: FileStage::Discovered,
        }
    }

    fn advance(&mut self, next: FileStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        log::debug!(
            "{}: {} -> {}",
            self.file.relative_path.display(),
            self.stage,
            next
        );
        self.stage = next;
    }

    fn finish(mut self, outcome: FileOutcome) -> FileOutcome {
        self.advance(FileStage::Logged);
        outcome
    }
}

/// Terminal result for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Copied(CopiedEntry),
    Omitted(OmittedEntry),
    Failed(FailedEntry),
}

// ============================================================================
// RUN STATE
// ============================================================================

/// Entries and counters for a finished run, before reports are written.
#[derive(Debug, Default)]
pub struct RunReport {
    pub aggregator: ReportAggregator,
    pub counters: RunCounters,
    /// Files found by the pre-walk count
    pub total: usize,
}

/// The single synchronization point for appends and progress ticks.
struct Ledger {
    state: Mutex<RunReport>,
}

impl Ledger {
    fn new(total: usize) -> Self {
        Self {
            state: Mutex::new(RunReport {
                total,
                ..RunReport::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunReport> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Appends the outcome and ticks progress while holding the lock, so
    /// ticks are delivered in strictly increasing order.
    fn record(&self, outcome: FileOutcome, progress: &dyn ProgressTracker) {
        let mut state = self.lock();
        match outcome {
            FileOutcome::Copied(entry) => {
                state.counters.count_copied(&entry);
                state.aggregator.record_copied(entry);
            }
            FileOutcome::Omitted(entry) => {
                state.counters.omitted += 1;
                state.aggregator.record_omitted(entry);
            }
            FileOutcome::Failed(entry) => {
                state.counters.failed += 1;
                state.aggregator.record_failed(entry);
            }
        }
        let done = state.counters.processed();
        let total = state.total.max(done);
        progress.tick(done, total);
    }

    fn into_report(self) -> RunReport {
        match self.state.into_inner() {
            Ok(report) => report,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Runs one ingestion over a validated [`PipelineConfig`].
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    progress: &'a dyn ProgressTracker,
    probe: MetadataProbe<'a>,
    transcoder: ProxyTranscoder<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        runner: &'a dyn ToolRunner,
        progress: &'a dyn ProgressTracker,
    ) -> Self {
        let probe = MetadataProbe::new(runner, config.tools.ffprobe.clone(), config.probe_timeout);
        let transcoder = ProxyTranscoder::new(
            runner,
            config.tools.ffmpeg.clone(),
            &config.proxy,
            config.transcode_timeout,
        );
        Self {
            config,
            progress,
            probe,
            transcoder,
        }
    }

    /// Runs the whole pipeline and writes the three reports to the
    /// destination root. Only configuration-level and report-writing
    /// failures are returned as errors.
    pub fn run(&self) -> CoreResult<RunSummary> {
        let started_at = Local::now();
        let timer = Instant::now();

        let mut report = self.process_files()?;

        let config = self.config;
        let (mut copied, mut omitted, mut failed) = report_sinks(config);
        report.aggregator.flush(&mut copied, &mut omitted, &mut failed)?;

        let summary = RunSummary {
            started_at,
            elapsed_secs: timer.elapsed().as_secs_f64(),
            source_root: config.source_root.clone(),
            destination_root: config.destination_root.clone(),
            extension: config.extension.clone(),
            total_discovered: report.total,
            counters: report.counters,
            copied_report: config.copied_report_path(),
            omitted_report: config.omitted_report_path(),
            failed_report: config.failed_report_path(),
            workbooks: config.workbook_paths(),
        };

        log::info!(
            "Ingest complete: {} copied, {} omitted, {} failed in {}",
            summary.counters.copied,
            summary.counters.omitted,
            summary.counters.failed,
            summary.elapsed_display()
        );
        Ok(summary)
    }

    /// Processes every file under the source root and returns the entries
    /// without writing any report.
    pub fn process_files(&self) -> CoreResult<RunReport> {
        let config = self.config;
        std::fs::create_dir_all(&config.destination_root)?;

        let total = count_files(&config.source_root, Some(&config.destination_root));
        log::info!(
            "Found {} files under {}, filtering on '{}'",
            total,
            config.source_root.display(),
            config.extension
        );
        self.progress.start(total);

        let ledger = Ledger::new(total);
        let files = SourceWalker::for_config(config).enumerate();

        if config.workers <= 1 {
            for (sequence, file) in files {
                let outcome = self.process_file(sequence, &file);
                ledger.record(outcome, self.progress);
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.workers)
                .build()
                .map_err(|e| {
                    CoreError::OperationFailed(format!("Failed to build worker pool: {e}"))
                })?;
            log::debug!("Processing with {} workers", config.workers);
            pool.install(|| {
                files.par_bridge().for_each(|(sequence, file)| {
                    let outcome = self.process_file(sequence, &file);
                    ledger.record(outcome, self.progress);
                });
            });
        }

        self.progress.finish();
        Ok(ledger.into_report())
    }

    /// Drives one file through the state machine to its terminal entry.
    pub fn process_file(&self, sequence: usize, file: &DiscoveredFile) -> FileOutcome {
        let config = self.config;
        let mut run = FileRun::new(file);
        let filename = file.file_name();

        if !config.matches(&file.extension) {
            run.advance(FileStage::Omitted);
            return run.finish(FileOutcome::Omitted(OmittedEntry {
                sequence,
                filename,
                relative_path: file.relative_path.clone(),
                extension: file.extension.clone(),
            }));
        }
        run.advance(FileStage::Matched);

        let failed = |stage: FailureStage, error: CoreError| {
            log::error!("Failed to ingest {}: {}", file.path.display(), error);
            FileOutcome::Failed(FailedEntry {
                sequence,
                filename: filename.clone(),
                relative_path: file.relative_path.clone(),
                stage,
                reason: error.to_string(),
            })
        };

        let destination = match destination_for(config, file) {
            Ok(path) => path,
            Err(e) => {
                let outcome = failed(FailureStage::Path, e);
                return run.finish(outcome);
            }
        };
        let size_bytes = match copy_file(&file.path, &destination) {
            Ok(bytes) => bytes,
            Err(e) => {
                let outcome = failed(FailureStage::Copy, e);
                return run.finish(outcome);
            }
        };
        log::info!("Copied: {}", file.path.display());
        run.advance(FileStage::Copied);

        let metadata = self.probe.probe(&file.path);
        run.advance(FileStage::MetadataExtracted);

        let proxy = if config.generate_proxies {
            let status = self.make_proxy(file, &destination);
            run.advance(FileStage::ProxyAttempted);
            status
        } else {
            ProxyStatus::NotRequested
        };

        run.finish(FileOutcome::Copied(CopiedEntry {
            sequence,
            filename,
            relative_path: file.relative_path.clone(),
            destination,
            size_bytes,
            metadata,
            proxy,
        }))
    }

    fn make_proxy(&self, file: &DiscoveredFile, copied: &std::path::Path) -> ProxyStatus {
        let output = proxy_path(self.config, file);
        match self.transcoder.transcode(copied, &output) {
            Ok(()) => {
                log::info!("Proxy created: {}", output.display());
                ProxyStatus::Created(output)
            }
            Err(e) => {
                log::error!("Proxy generation failed for {}: {}", copied.display(), e);
                ProxyStatus::Failed(e.to_string())
            }
        }
    }
}

/// Sinks for the copied, omitted and failed tables: always a CSV file,
/// plus a workbook when enabled.
fn report_sinks(config: &PipelineConfig) -> (FanOutSink, FanOutSink, FanOutSink) {
    let mut copied = FanOutSink::new().with(CsvReportSink::new(config.copied_report_path()));
    let mut omitted = FanOutSink::new().with(CsvReportSink::new(config.omitted_report_path()));
    let mut failed = FanOutSink::new().with(CsvReportSink::new(config.failed_report_path()));

    if config.write_workbooks {
        let root = &config.destination_root;
        copied = copied.with(XlsxReportSink::new(
            root.join(COPIED_WORKBOOK_NAME),
            COPIED_SHEET_NAME,
        ));
        omitted = omitted.with(XlsxReportSink::new(
            root.join(OMITTED_WORKBOOK_NAME),
            OMITTED_SHEET_NAME,
        ));
        failed = failed.with(XlsxReportSink::new(
            root.join(FAILED_WORKBOOK_NAME),
            FAILED_SHEET_NAME,
        ));
    }
    (copied, omitted, failed)
}

/// Runs a full ingestion with the given runner and progress tracker.
pub fn ingest(
    config: &PipelineConfig,
    runner: &dyn ToolRunner,
    progress: &dyn ProgressTracker,
) -> CoreResult<RunSummary> {
    Pipeline::new(config, runner, progress).run()
}
