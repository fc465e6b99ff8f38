// ingesta-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Ingesta: media ingestion tool",
    long_about = "Copies media files matching an extension from a source tree into a \
                  destination tree, extracts metadata with ffprobe, optionally encodes \
                  proxies with ffmpeg, and writes CSV (optionally .xlsx) reports of what was copied."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug output on the console
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copies matching files from a source tree into a destination tree
    Ingest(IngestArgs),
    /// Prints the metadata ffprobe reports for a single file
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory tree to ingest from
    #[arg(short, long = "source", required = true, value_name = "SOURCE_DIR")]
    pub source: PathBuf,

    /// Directory that receives the copies, proxies and reports
    #[arg(short, long = "destination", required = true, value_name = "DEST_DIR")]
    pub destination: PathBuf,

    /// Extension to ingest, with or without the dot (e.g. mp4, .MOV)
    #[arg(short, long, required = true, value_name = "EXT")]
    pub extension: String,

    /// Copy every match directly into DEST_DIR instead of mirroring subdirectories
    #[arg(long, default_value_t = false)]
    pub flatten: bool,

    /// Encode a downscaled H.264 proxy for every copied file
    #[arg(long, default_value_t = false)]
    pub proxies: bool,

    /// Also write the reports as .xlsx workbooks next to the CSV files
    #[arg(long, default_value_t = false)]
    pub xlsx: bool,

    /// Optional: Override the proxy width in pixels (height keeps aspect)
    #[arg(long, value_name = "PIXELS")]
    pub proxy_width: Option<u32>,

    /// Number of files processed concurrently (1 = sequential)
    #[arg(short = 'j', long, value_name = "N", env = "INGESTA_WORKERS")]
    pub workers: Option<usize>,

    /// Path to the ffprobe executable
    #[arg(long, value_name = "PATH", env = "INGESTA_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long, value_name = "PATH", env = "INGESTA_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Optional: TOML file with tool paths, timeouts and proxy settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Optional: Seconds before an ffprobe call is killed (0 disables the limit)
    #[arg(long, value_name = "SECONDS")]
    pub probe_timeout: Option<u64>,

    /// Optional: Seconds before an ffmpeg proxy encode is killed (0 disables the limit)
    #[arg(long, value_name = "SECONDS")]
    pub transcode_timeout: Option<u64>,

    /// Optional: Directory for log files (defaults to DEST_DIR/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print the run summary as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    /// Path to the ffprobe executable
    #[arg(long, value_name = "PATH", env = "INGESTA_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Optional: Seconds before ffprobe is killed (0 disables the limit)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}
