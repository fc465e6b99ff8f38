// ingesta-cli/src/commands/probe.rs
//
// Prints the five metadata fields ffprobe reports for a single file, using
// the same queries and rendering as the ingest reports.

use std::path::PathBuf;

use ingesta_core::config::{DEFAULT_PROBE_TIMEOUT, timeout_from_secs};
use ingesta_core::external::{MetadataProbe, check_dependency};
use ingesta_core::{CoreError, SystemRunner, VideoMetadata};

use crate::cli::ProbeArgs;
use crate::error::CliResult;
use crate::logging::{ConsoleStream, init_logging};
use crate::terminal::{print_section, print_status, print_warning};

/// Runs the `probe` command.
pub fn run_probe(args: ProbeArgs, verbose: bool) -> CliResult<VideoMetadata> {
    init_logging(verbose, ConsoleStream::Stdout, None)?;

    if !args.file.is_file() {
        return Err(CoreError::PathError(format!(
            "'{}' is not a file",
            args.file.display()
        )));
    }

    let ffprobe = args.ffprobe.unwrap_or_else(|| PathBuf::from("ffprobe"));
    check_dependency(&ffprobe)?;

    let timeout = args
        .timeout
        .map_or(Some(DEFAULT_PROBE_TIMEOUT), timeout_from_secs);
    let runner = SystemRunner::new();
    let metadata = MetadataProbe::new(&runner, ffprobe, timeout).probe(&args.file);

    print_metadata(&args.file, &metadata);
    Ok(metadata)
}

fn print_metadata(file: &std::path::Path, metadata: &VideoMetadata) {
    let [duration, frame_rate, width, height, aspect] =
        metadata.report_cells().map(|cell| cell.to_string());

    print_section("Probe");
    print_status("File", &file.display().to_string(), true);
    print_status("Duration", &duration, false);
    print_status("Frame rate", &frame_rate, false);
    print_status("Width", &width, false);
    print_status("Height", &height, false);
    print_status("Aspect ratio", &aspect, false);

    for (field, error) in metadata.degraded_fields() {
        print_warning(&format!("{}: {}", field, error));
    }
}
