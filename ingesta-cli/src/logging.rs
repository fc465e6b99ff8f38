// ============================================================================
// ingesta-cli/src/logging.rs
// ============================================================================
//
// LOGGING: Console and Run Log Dispatch
//
// Installs a `fern` dispatch with two outputs:
// - the console, which shows CLI output and core warnings (core info and
//   debug lines only with --verbose)
// - an optional plain-text run log that receives everything, with ANSI
//   styling stripped and each line timestamped
//
// Messages sent to `RUN_LOG_TARGET` go to the run log only.

use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;

use crate::error::{CliErrorContext, CliResult};

/// Log target whose records are written to the run log but not the console.
pub const RUN_LOG_TARGET: &str = "ingesta::run_log";

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("ingesta_run_{}.log", ingesta_cli::logging::get_timestamp());
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the run log for a run starting now.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("ingesta_run_{}.log", get_timestamp()))
}

/// Where console records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    /// Used when stdout carries machine-readable output.
    Stderr,
}

/// Installs the global logger.
///
/// Can only succeed once per process.
pub fn init_logging(
    verbose: bool,
    console_stream: ConsoleStream,
    run_log: Option<&Path>,
) -> CliResult<()> {
    let core_console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let console = fern::Dispatch::new()
        .level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .level_for("ingesta_core", core_console_level)
        .filter(|metadata| metadata.target() != RUN_LOG_TARGET)
        .format(|out, message, record| match record.level() {
            log::Level::Info => out.finish(format_args!("{}", message)),
            level => out.finish(format_args!("[{}] {}", level, message)),
        });
    let console = match console_stream {
        ConsoleStream::Stdout => console.chain(std::io::stdout()),
        ConsoleStream::Stderr => console.chain(std::io::stderr()),
    };

    let mut dispatch = fern::Dispatch::new().chain(console);

    if let Some(path) = run_log {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .cli_with_context(|| format!("Creating log directory {}", parent.display()))?;
        }
        let file = fern::log_file(path)
            .cli_with_context(|| format!("Opening run log {}", path.display()))?;
        let file_dispatch = fern::Dispatch::new()
            .level(if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            })
            .format(|out, message, record| {
                let plain = strip_ansi_escapes::strip_str(message.to_string());
                out.finish(format_args!(
                    "{} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    plain
                ))
            })
            .chain(file);
        dispatch = dispatch.chain(file_dispatch);
    }

    dispatch
        .apply()
        .map_err(|e| ingesta_core::CoreError::OperationFailed(format!("Logger setup failed: {}", e)))
}
