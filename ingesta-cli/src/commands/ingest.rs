// ============================================================================
// ingesta-cli/src/commands/ingest.rs
// ============================================================================
//
// INGEST COMMAND: Copy, Probe, Proxy and Report
//
// Resolves the pipeline configuration from flags, environment and an
// optional TOML file, installs logging, runs the core pipeline with a
// progress bar and prints the run summary.

use std::path::PathBuf;

use ingesta_core::config::{FileSettings, PipelineConfig, PipelineConfigBuilder, timeout_from_secs};
use ingesta_core::{RunSummary, SystemRunner};
use log::info;

use crate::cli::IngestArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::logging::{ConsoleStream, RUN_LOG_TARGET, init_logging, run_log_path};
use crate::progress::CliProgress;
use crate::terminal::{print_processing, print_section, print_status, print_success, print_warning};

/// Builds the pipeline configuration.
///
/// Precedence, highest first: flags (and the environment variables clap
/// maps onto them), the `--config` file, built-in defaults.
pub fn build_config(args: &IngestArgs) -> CliResult<PipelineConfig> {
    let mut builder = PipelineConfigBuilder::new()
        .source_root(args.source.clone())
        .destination_root(args.destination.clone())
        .extension(&args.extension)
        .preserve_hierarchy(!args.flatten)
        .generate_proxies(args.proxies);

    if let Some(path) = &args.config {
        let settings = FileSettings::load(path)?;
        builder = builder.apply_file_settings(&settings);
    }

    if args.xlsx {
        builder = builder.write_workbooks(true);
    }
    if let Some(width) = args.proxy_width {
        builder = builder.proxy_width(width);
    }
    if let Some(workers) = args.workers {
        builder = builder.workers(workers);
    }
    if let Some(path) = &args.ffprobe {
        builder = builder.ffprobe_path(path.clone());
    }
    if let Some(path) = &args.ffmpeg {
        builder = builder.ffmpeg_path(path.clone());
    }
    if let Some(secs) = args.probe_timeout {
        builder = builder.probe_timeout(timeout_from_secs(secs));
    }
    if let Some(secs) = args.transcode_timeout {
        builder = builder.transcode_timeout(timeout_from_secs(secs));
    }

    builder.build()
}

/// Log directory for a run: the explicit one, or `<destination>/logs`.
pub fn log_dir_for(args: &IngestArgs, config: &PipelineConfig) -> PathBuf {
    args.log_dir
        .clone()
        .unwrap_or_else(|| config.destination_root.join("logs"))
}

/// Runs the `ingest` command.
pub fn run_ingest(args: IngestArgs, verbose: bool) -> CliResult<RunSummary> {
    let mut config = build_config(&args)?;
    config.validate()?;

    let log_path = run_log_path(&log_dir_for(&args, &config));
    let console = if args.json {
        ConsoleStream::Stderr
    } else {
        ConsoleStream::Stdout
    };
    init_logging(verbose, console, Some(&log_path))?;

    if !args.json {
        print_run_header(&config, &log_path);
        print_processing("Ingesting files");
    }
    info!(target: RUN_LOG_TARGET, "Run log: {}", log_path.display());

    let progress = CliProgress::new(!args.json && !verbose);
    let summary = ingesta_core::ingest(&config, &SystemRunner::new(), &progress)
        .cli_context("Ingest failed")?;

    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        print_summary(&summary, config.generate_proxies);
    }

    Ok(summary)
}

fn print_run_header(config: &PipelineConfig, log_path: &std::path::Path) {
    print_section("Ingest");
    print_status("Source", &config.source_root.display().to_string(), false);
    print_status("Destination", &config.destination_root.display().to_string(), false);
    print_status("Extension", &config.extension, true);
    print_status(
        "Hierarchy",
        if config.preserve_hierarchy {
            "preserved"
        } else {
            "flattened"
        },
        false,
    );
    let proxies = if config.generate_proxies {
        format!("{}px wide", config.proxy.width)
    } else {
        "off".to_string()
    };
    print_status("Proxies", &proxies, false);
    print_status("Workers", &config.workers.to_string(), false);
    print_status("Log file", &log_path.display().to_string(), false);
}

/// Prints the human-readable end-of-run block.
pub fn print_summary(summary: &RunSummary, proxies_enabled: bool) {
    let counters = &summary.counters;

    print_section("Summary");
    print_status("Discovered", &summary.total_discovered.to_string(), false);
    print_status("Copied", &counters.copied.to_string(), true);
    print_status("Omitted", &counters.omitted.to_string(), false);
    print_status("Failed", &counters.failed.to_string(), counters.failed > 0);
    if proxies_enabled {
        print_status("Proxies", &counters.proxies_created.to_string(), false);
        print_status("Proxy failures", &counters.proxies_failed.to_string(), false);
    }
    print_status("Degraded", &counters.degraded_metadata.to_string(), false);
    print_status("Data copied", &summary.bytes_display(), false);
    print_status("Elapsed", &summary.elapsed_display(), false);
    print_status("Copied report", &summary.copied_report.display().to_string(), false);
    print_status("Omitted report", &summary.omitted_report.display().to_string(), false);
    print_status("Failed report", &summary.failed_report.display().to_string(), false);
    for workbook in &summary.workbooks {
        print_status("Workbook", &workbook.display().to_string(), false);
    }

    if counters.failed > 0 {
        print_warning(&format!(
            "{} file(s) could not be copied; see {}",
            counters.failed,
            summary.failed_report.display()
        ));
    }
    if counters.proxies_failed > 0 {
        print_warning(&format!("{} proxy encode(s) failed", counters.proxies_failed));
    }
    if counters.degraded_metadata > 0 {
        print_warning(&format!(
            "{} file(s) have incomplete metadata (marked Error in the report)",
            counters.degraded_metadata
        ));
    }
    print_success("Ingest complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use ingesta_core::CoreError;
    use std::time::Duration;

    fn ingest_args(extra: &[&str]) -> IngestArgs {
        let mut argv = vec!["ingesta", "ingest", "-s", "/card", "-d", "/ingest", "-e", "MP4"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Ingest(args) => args,
            other => panic!("expected ingest, got {:?}", other),
        }
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&ingest_args(&[])).unwrap();
        assert_eq!(config.extension, ".mp4");
        assert!(config.preserve_hierarchy);
        assert!(!config.generate_proxies);
        assert!(!config.write_workbooks);
        assert_eq!(config.source_root, PathBuf::from("/card"));
    }

    #[test]
    fn test_build_config_applies_flags() {
        let config = build_config(&ingest_args(&[
            "--flatten",
            "--proxies",
            "--xlsx",
            "--proxy-width",
            "480",
            "-j",
            "3",
            "--ffmpeg",
            "/opt/ffmpeg",
            "--probe-timeout",
            "0",
            "--transcode-timeout",
            "90",
        ]))
        .unwrap();
        assert!(!config.preserve_hierarchy);
        assert!(config.generate_proxies);
        assert!(config.write_workbooks);
        assert_eq!(config.proxy.width, 480);
        assert_eq!(config.workers, 3);
        assert_eq!(config.tools.ffmpeg, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.probe_timeout, None);
        assert_eq!(config.transcode_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_flags_win_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ingesta.toml");
        std::fs::write(&file, "workers = 6\n[proxy]\nwidth = 320\ncrf = 30\n").unwrap();

        let file_arg = file.to_string_lossy().into_owned();
        let config = build_config(&ingest_args(&["--config", &file_arg, "--proxy-width", "800"]))
            .unwrap();
        assert_eq!(config.workers, 6);
        assert_eq!(config.proxy.width, 800);
        assert_eq!(config.proxy.crf, 30);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let result = build_config(&ingest_args(&["-j", "0"]));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_default_log_dir_is_under_destination() {
        let args = ingest_args(&[]);
        let config = build_config(&args).unwrap();
        assert_eq!(log_dir_for(&args, &config), PathBuf::from("/ingest/logs"));

        let args = ingest_args(&["--log-dir", "/var/log/ingesta"]);
        assert_eq!(log_dir_for(&args, &config), PathBuf::from("/var/log/ingesta"));
    }
}
